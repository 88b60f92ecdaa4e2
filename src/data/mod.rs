//! Data module - year file loading and batching

mod batch;
mod loader;

#[cfg(test)]
pub(crate) mod fixtures;

pub use batch::{BatchReport, SkippedYear, YearBatchReader, MONTH_COL, YEAR_COL};
pub use loader::{column_names, unique_codes, FileLoader, LoaderError};
