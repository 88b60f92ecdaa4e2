//! State Map Plotter Module
//! Filters one year's accidents to a state and hands the locations to a map canvas.

use crate::data::{unique_codes, FileLoader, LoaderError};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

pub const STATE_COL: &str = "STATE";
pub const LATITUDE_COL: &str = "LATITUDE";
pub const LONGITUDE_COL: &str = "LONGITUD";

/// Latitudes above this mean "unknown".
pub const LATITUDE_SENTINEL: f64 = 90.0;
/// Longitudes above this mean "unknown".
pub const LONGITUDE_SENTINEL: f64 = 900.0;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("invalid STATE number: {state} (not present in {year} data)")]
    InvalidState { state: i64, year: i32 },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to render map: {0}")]
    Render(String),
}

/// An accident location in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Longitude/latitude extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl BoundingBox {
    /// Extent of `points`, `None` when there are none.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_longitude: first.longitude,
            max_longitude: first.longitude,
            min_latitude: first.latitude,
            max_latitude: first.latitude,
        };
        Some(points.iter().fold(init, |b, p| Self {
            min_longitude: b.min_longitude.min(p.longitude),
            max_longitude: b.max_longitude.max(p.longitude),
            min_latitude: b.min_latitude.min(p.latitude),
            max_latitude: b.max_latitude.max(p.latitude),
        }))
    }

    /// Grow each side by `fraction` of the span, at least `min_pad` degrees.
    pub fn padded(&self, fraction: f64, min_pad: f64) -> Self {
        let lon_pad = ((self.max_longitude - self.min_longitude) * fraction).max(min_pad);
        let lat_pad = ((self.max_latitude - self.min_latitude) * fraction).max(min_pad);
        Self {
            min_longitude: self.min_longitude - lon_pad,
            max_longitude: self.max_longitude + lon_pad,
            min_latitude: self.min_latitude - lat_pad,
            max_latitude: self.max_latitude + lat_pad,
        }
    }
}

/// Drawing surface for a state map.
///
/// `draw_map` is called once with the extent of the points, then
/// `draw_points` with every plottable location.
pub trait MapCanvas {
    fn draw_map(&mut self, bounds: &BoundingBox) -> Result<(), PlotError>;
    fn draw_points(&mut self, points: &[GeoPoint]) -> Result<(), PlotError>;
}

/// What a plot call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotOutcome {
    /// Map drawn; `missing` records had a sentinel coordinate and were left out.
    Rendered { points: usize, missing: usize },
    /// The state had no accidents that year.
    NoAccidents,
    /// The state had accidents, none with a usable location.
    NoLocations { missing: usize },
}

/// Plots accident locations for one state and year.
pub struct StateMapPlotter<'a> {
    loader: &'a FileLoader,
}

impl<'a> StateMapPlotter<'a> {
    pub fn new(loader: &'a FileLoader) -> Self {
        Self { loader }
    }

    /// Draw the accidents of `state` in `year` onto `canvas`.
    ///
    /// A missing year file and an unknown state are errors; a state with
    /// nothing to draw is reported through the returned outcome.
    pub fn plot_state<C: MapCanvas + ?Sized>(
        &self,
        state: i64,
        year: i32,
        canvas: &mut C,
    ) -> Result<PlotOutcome, PlotError> {
        let locations = self.state_locations(state, year)?;
        let outcome = plot_locations(&locations, canvas)?;

        match outcome {
            PlotOutcome::Rendered { points, missing } => {
                info!(state, year, points, missing, "plotted state map")
            }
            PlotOutcome::NoAccidents => info!(state, year, "no accidents to plot"),
            PlotOutcome::NoLocations { missing } => {
                info!(state, year, missing, "no accident locations to plot")
            }
        }
        Ok(outcome)
    }

    /// One entry per accident of `state` in `year`; `None` where either
    /// coordinate is a sentinel.
    pub fn state_locations(
        &self,
        state: i64,
        year: i32,
    ) -> Result<Vec<Option<GeoPoint>>, PlotError> {
        let df = self.loader.load(year)?;

        if !unique_codes(&df, STATE_COL)?.contains(&state) {
            return Err(PlotError::InvalidState { state, year });
        }

        let filtered = df
            .lazy()
            .filter(col(STATE_COL).cast(DataType::Int64).eq(lit(state)))
            .select([
                col(LONGITUDE_COL).cast(DataType::Float64),
                col(LATITUDE_COL).cast(DataType::Float64),
            ])
            .collect()?;
        debug!(state, year, rows = filtered.height(), "filtered to state");

        let longitudes = filtered.column(LONGITUDE_COL)?.f64()?;
        let latitudes = filtered.column(LATITUDE_COL)?.f64()?;

        Ok(longitudes
            .into_iter()
            .zip(latitudes.into_iter())
            .map(|(lon, lat)| {
                let longitude = known(lon, LONGITUDE_SENTINEL)?;
                let latitude = known(lat, LATITUDE_SENTINEL)?;
                Some(GeoPoint {
                    longitude,
                    latitude,
                })
            })
            .collect())
    }
}

/// Draw the known locations, skipping the canvas entirely when there are none.
pub fn plot_locations<C: MapCanvas + ?Sized>(
    locations: &[Option<GeoPoint>],
    canvas: &mut C,
) -> Result<PlotOutcome, PlotError> {
    if locations.is_empty() {
        return Ok(PlotOutcome::NoAccidents);
    }

    let points: Vec<GeoPoint> = locations.iter().flatten().copied().collect();
    let missing = locations.len() - points.len();

    let Some(bounds) = BoundingBox::from_points(&points) else {
        return Ok(PlotOutcome::NoLocations { missing });
    };

    canvas.draw_map(&bounds)?;
    canvas.draw_points(&points)?;

    Ok(PlotOutcome::Rendered {
        points: points.len(),
        missing,
    })
}

/// Drop nulls and values above the sentinel threshold.
fn known(value: Option<f64>, sentinel: f64) -> Option<f64> {
    value.filter(|v| *v <= sentinel)
}
