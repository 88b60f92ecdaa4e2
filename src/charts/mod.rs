//! Charts module - State accident maps

mod plotter;
mod renderer;

pub use plotter::{
    plot_locations, BoundingBox, GeoPoint, MapCanvas, PlotError, PlotOutcome, StateMapPlotter,
    LATITUDE_SENTINEL, LONGITUDE_SENTINEL,
};
pub use renderer::PngMapCanvas;
