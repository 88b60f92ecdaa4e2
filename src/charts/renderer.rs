//! Static Map Renderer
//! Draws state accident maps into a PNG with plotters.
//!
//! Layout:
//! 1. Optional caption centered on top
//! 2. Longitude/latitude graticule scoped to the points' bounding box
//! 3. One filled marker per accident

use crate::charts::plotter::{BoundingBox, GeoPoint, MapCanvas, PlotError};
use crate::config::PlotConfig;
use image::RgbImage;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

// Colors
const MARKER: RGBColor = RGBColor(192, 57, 43);
const GRID: RGBColor = RGBColor(200, 200, 200);

/// Extra margin around the points, as a fraction of the span.
const PAD_FRACTION: f64 = 0.05;
/// Minimum margin in degrees, so a single accident still gets a map.
const PAD_MIN_DEGREES: f64 = 0.5;

const CHART_MARGIN: u32 = 20;
const X_LABEL_AREA: u32 = 40;
const Y_LABEL_AREA: u32 = 60;

type MapChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// [`MapCanvas`] backed by an in-memory RGB buffer, saved as PNG by [`finish`](Self::finish).
pub struct PngMapCanvas {
    path: PathBuf,
    width: u32,
    height: u32,
    point_radius: u32,
    caption: Option<String>,
    buffer: Vec<u8>,
    bounds: Option<BoundingBox>,
}

impl PngMapCanvas {
    pub fn new(path: impl AsRef<Path>, config: &PlotConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            width: config.width,
            height: config.height,
            point_radius: config.point_radius,
            caption: None,
            buffer: vec![255; (config.width as usize) * (config.height as usize) * 3],
            bounds: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Chart bounds of the drawn map, padded around the points.
    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    /// Write the PNG. Returns the output path.
    pub fn finish(self) -> Result<PathBuf, PlotError> {
        let img = RgbImage::from_raw(self.width, self.height, self.buffer)
            .ok_or_else(|| PlotError::Render("image buffer has the wrong size".to_string()))?;
        img.save(&self.path).map_err(render_error)?;
        Ok(self.path)
    }
}

impl MapCanvas for PngMapCanvas {
    fn draw_map(&mut self, bounds: &BoundingBox) -> Result<(), PlotError> {
        let bounds = bounds.padded(PAD_FRACTION, PAD_MIN_DEGREES);
        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = build_chart(&root, self.caption.as_deref(), &bounds)?;
        chart
            .configure_mesh()
            .x_desc("Longitude")
            .y_desc("Latitude")
            .light_line_style(GRID.mix(0.3))
            .bold_line_style(GRID)
            .draw()
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
        self.bounds = Some(bounds);
        Ok(())
    }

    fn draw_points(&mut self, points: &[GeoPoint]) -> Result<(), PlotError> {
        let bounds = self
            .bounds
            .ok_or_else(|| PlotError::Render("points drawn before the map".to_string()))?;
        let radius = self.point_radius;
        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();

        // Same builder settings as draw_map so the coordinates line up.
        let mut chart = build_chart(&root, self.caption.as_deref(), &bounds)?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p.longitude, p.latitude), radius, MARKER.filled())),
            )
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
        Ok(())
    }
}

fn build_chart<'a, 'b>(
    root: &'a DrawingArea<BitMapBackend<'b>, Shift>,
    caption: Option<&str>,
    bounds: &BoundingBox,
) -> Result<MapChart<'a, 'b>, PlotError> {
    let mut builder = ChartBuilder::on(root);
    builder
        .margin(CHART_MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA);
    if let Some(caption) = caption {
        builder.caption(caption, ("sans-serif", 24));
    }
    builder
        .build_cartesian_2d(
            bounds.min_longitude..bounds.max_longitude,
            bounds.min_latitude..bounds.max_latitude,
        )
        .map_err(render_error)
}

fn render_error(err: impl std::fmt::Display) -> PlotError {
    PlotError::Render(err.to_string())
}
