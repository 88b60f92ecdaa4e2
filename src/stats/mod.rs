//! Stats module - monthly accident counts

mod summary;

pub use summary::{Summary, SummaryError, SummaryTable, YearMonthSummarizer};
