//! Year Batch Reader Module
//! Loads several years at once, keeping only `MONTH` and `year`.
//! A bad year is skipped with a warning instead of failing the batch.

use crate::data::loader::{FileLoader, LoaderError};
use polars::prelude::*;
use std::fmt;
use tracing::warn;

pub const MONTH_COL: &str = "MONTH";
pub const YEAR_COL: &str = "year";

/// A year that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedYear {
    pub year: i32,
    pub file_name: String,
    pub reason: String,
}

impl fmt::Display for SkippedYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid year: {} ({})", self.year, self.reason)
    }
}

/// One slot per requested year, in request order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub slots: Vec<Option<DataFrame>>,
    pub skipped: Vec<SkippedYear>,
}

impl BatchReport {
    /// Tables of the years that loaded, in request order.
    pub fn tables(&self) -> impl Iterator<Item = &DataFrame> {
        self.slots.iter().flatten()
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Reads a batch of years through a [`FileLoader`].
pub struct YearBatchReader<'a> {
    loader: &'a FileLoader,
}

impl<'a> YearBatchReader<'a> {
    pub fn new(loader: &'a FileLoader) -> Self {
        Self { loader }
    }

    /// Load every year, tag rows with the year and project to `{MONTH, year}`.
    pub fn load_years(&self, years: &[i32]) -> BatchReport {
        let mut report = BatchReport {
            slots: Vec::with_capacity(years.len()),
            skipped: Vec::new(),
        };

        for &year in years {
            match self.load_year(year) {
                Ok(df) => report.slots.push(Some(df)),
                Err(err) => {
                    warn!(year, error = %err, "invalid year: {}", year);
                    report.skipped.push(SkippedYear {
                        year,
                        file_name: self.loader.file_name(year),
                        reason: err.to_string(),
                    });
                    report.slots.push(None);
                }
            }
        }

        report
    }

    fn load_year(&self, year: i32) -> Result<DataFrame, LoaderError> {
        let df = self
            .loader
            .load(year)?
            .lazy()
            .with_column(lit(year).alias(YEAR_COL))
            .select([col(MONTH_COL), col(YEAR_COL)])
            .collect()?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{loader_in, write_year_file, AccidentRow};
    use crate::data::loader::column_names;
    use tempfile::tempdir;

    #[test]
    fn one_slot_per_year_in_request_order() {
        let tmp = tempdir().unwrap();
        write_year_file(tmp.path(), 2013, &[AccidentRow::new(1, 1, 33.0, -86.0)]);
        write_year_file(
            tmp.path(),
            2015,
            &[
                AccidentRow::new(2, 1, 33.0, -86.0),
                AccidentRow::new(3, 1, 33.0, -86.0),
            ],
        );
        let loader = loader_in(tmp.path());

        let report = YearBatchReader::new(&loader).load_years(&[2015, 9999, 2013]);

        assert_eq!(report.slots.len(), 3);
        assert!(report.slots[1].is_none());
        assert_eq!(report.loaded_count(), 2);

        let first = report.slots[0].as_ref().unwrap();
        assert_eq!(column_names(first), vec!["MONTH", "year"]);
        assert_eq!(first.height(), 2);
        let years: Vec<i32> = first
            .column(YEAR_COL)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(years, vec![2015, 2015]);

        let last = report.slots[2].as_ref().unwrap();
        assert_eq!(column_names(last), vec!["MONTH", "year"]);
        assert_eq!(last.height(), 1);
    }

    #[test]
    fn invalid_years_are_collected_not_raised() {
        let tmp = tempdir().unwrap();
        let loader = loader_in(tmp.path());

        let report = YearBatchReader::new(&loader).load_years(&[9999, 1066]);

        assert!(report.slots.iter().all(Option::is_none));
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].year, 9999);
        assert_eq!(report.skipped[0].file_name, "accident_9999.csv");
        assert!(report.skipped[1].to_string().starts_with("invalid year: 1066"));
    }

    #[test]
    fn file_without_month_column_is_skipped() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join("accident_2012.csv"),
            "STATE,LATITUDE,LONGITUD\n1,33.0,-86.0\n",
        )
        .unwrap();
        let loader = loader_in(tmp.path());

        let report = YearBatchReader::new(&loader).load_years(&[2012]);

        assert!(report.slots[0].is_none());
        assert_eq!(report.skipped[0].year, 2012);
    }

    #[test]
    fn empty_request_gives_empty_report() {
        let loader = FileLoader::default();
        let report = YearBatchReader::new(&loader).load_years(&[]);
        assert!(report.slots.is_empty());
        assert!(report.skipped.is_empty());
    }
}
