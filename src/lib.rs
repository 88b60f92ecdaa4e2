//! FARS Reporter - Accident Data Loader, Monthly Summaries & State Maps
//!
//! Reads the yearly FARS accident files, counts accidents per month across
//! years and plots one state's accident locations for a year.

pub mod charts;
pub mod config;
pub mod data;
pub mod stats;

pub use charts::{PlotError, PlotOutcome, StateMapPlotter};
pub use config::FarsConfig;
pub use data::{FileLoader, LoaderError, YearBatchReader};
pub use stats::{SummaryTable, YearMonthSummarizer};
