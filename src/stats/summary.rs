//! Monthly Summary Module
//! Counts accidents per (year, month) and pivots them into a month × year table.

use crate::data::{FileLoader, SkippedYear, YearBatchReader, MONTH_COL, YEAR_COL};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const COUNT_COL: &str = "n";

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to write summary: {0}")]
    Io(#[from] std::io::Error),
}

/// Sparse month × year count table.
///
/// A missing cell means the year had no records that month, which is not the
/// same as a stored zero. Months and years iterate in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryTable {
    cells: BTreeMap<u32, BTreeMap<i32, u32>>,
    years: BTreeSet<i32>,
}

impl SummaryTable {
    /// Build from long-format counts with columns `year`, `MONTH`, `n`.
    fn from_counts(counts: &DataFrame) -> Result<Self, SummaryError> {
        let years = counts.column(YEAR_COL)?.cast(&DataType::Int32)?;
        let months = counts.column(MONTH_COL)?.cast(&DataType::Int64)?;
        let ns = counts.column(COUNT_COL)?.cast(&DataType::UInt32)?;

        let mut table = Self::default();
        for ((year, month), n) in years
            .i32()?
            .into_iter()
            .zip(months.i64()?.into_iter())
            .zip(ns.u32()?.into_iter())
        {
            let (Some(year), Some(month), Some(n)) = (year, month, n) else {
                continue;
            };
            let Ok(month) = u32::try_from(month) else {
                continue;
            };
            table.insert(month, year, n);
        }
        Ok(table)
    }

    fn insert(&mut self, month: u32, year: i32, count: u32) {
        self.cells.entry(month).or_default().insert(year, count);
        self.years.insert(year);
    }

    /// Count for a cell, `None` when that year had no records that month.
    pub fn get(&self, month: u32, year: i32) -> Option<u32> {
        self.cells.get(&month)?.get(&year).copied()
    }

    /// Months present, ascending.
    pub fn months(&self) -> Vec<u32> {
        self.cells.keys().copied().collect()
    }

    /// Year columns, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.years.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total records counted for one year.
    pub fn year_total(&self, year: i32) -> u32 {
        self.cells.values().filter_map(|row| row.get(&year)).sum()
    }

    /// Wide DataFrame: `MONTH` plus one nullable count column per year.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let months = self.months();
        let mut columns = vec![Column::new(MONTH_COL.into(), months.clone())];
        for year in &self.years {
            let counts: Vec<Option<u32>> = months.iter().map(|&m| self.get(m, *year)).collect();
            columns.push(Column::new(year.to_string().into(), counts));
        }
        DataFrame::new(columns)
    }

    /// Export the wide table as CSV. Missing cells are left empty.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), SummaryError> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path.as_ref())?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        Ok(())
    }
}

/// Summary plus the years that were skipped while building it.
#[derive(Debug, Default)]
pub struct Summary {
    pub table: SummaryTable,
    pub skipped: Vec<SkippedYear>,
}

/// Builds monthly accident counts for a set of years.
pub struct YearMonthSummarizer<'a> {
    loader: &'a FileLoader,
}

impl<'a> YearMonthSummarizer<'a> {
    pub fn new(loader: &'a FileLoader) -> Self {
        Self { loader }
    }

    /// Month × year counts. Years that fail to load are dropped.
    pub fn summarize(&self, years: &[i32]) -> Result<SummaryTable, SummaryError> {
        Ok(self.summarize_with_skipped(years)?.table)
    }

    /// Like [`summarize`](Self::summarize), also returning the skipped years.
    pub fn summarize_with_skipped(&self, years: &[i32]) -> Result<Summary, SummaryError> {
        let report = YearBatchReader::new(self.loader).load_years(years);

        let frames: Vec<LazyFrame> = report
            .tables()
            .map(|df| {
                df.clone().lazy().select([
                    col(MONTH_COL).cast(DataType::Int64),
                    col(YEAR_COL).cast(DataType::Int32),
                ])
            })
            .collect();

        if frames.is_empty() {
            return Ok(Summary {
                table: SummaryTable::default(),
                skipped: report.skipped,
            });
        }

        let counts = concat(frames, UnionArgs::default())?
            .group_by([col(YEAR_COL), col(MONTH_COL)])
            .agg([len().alias(COUNT_COL)])
            .collect()?;

        let table = SummaryTable::from_counts(&counts)?;
        info!(
            requested = years.len(),
            loaded = report.loaded_count(),
            months = table.months().len(),
            "summarized years"
        );

        Ok(Summary {
            table,
            skipped: report.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{loader_in, write_year_file, AccidentRow};
    use tempfile::{tempdir, TempDir};

    fn rows(months: &[u32]) -> Vec<AccidentRow> {
        months
            .iter()
            .map(|&m| AccidentRow::new(m, 1, 33.5, -86.8))
            .collect()
    }

    fn two_year_dir() -> TempDir {
        let tmp = tempdir().unwrap();
        write_year_file(tmp.path(), 2013, &rows(&[1, 1, 2, 5]));
        write_year_file(tmp.path(), 2014, &rows(&[2, 2, 2, 7]));
        tmp
    }

    #[test]
    fn single_month_file_round_trips_to_one_cell() {
        let tmp = tempdir().unwrap();
        write_year_file(tmp.path(), 2016, &rows(&[3; 7]));
        let loader = loader_in(tmp.path());

        let table = YearMonthSummarizer::new(&loader).summarize(&[2016]).unwrap();

        assert_eq!(table.months(), vec![3]);
        assert_eq!(table.years(), vec![2016]);
        assert_eq!(table.get(3, 2016), Some(7));
    }

    #[test]
    fn counts_per_month_and_year_are_sparse() {
        let tmp = two_year_dir();
        let loader = loader_in(tmp.path());

        let table = YearMonthSummarizer::new(&loader)
            .summarize(&[2013, 2014])
            .unwrap();

        assert_eq!(table.months(), vec![1, 2, 5, 7]);
        assert_eq!(table.get(1, 2013), Some(2));
        assert_eq!(table.get(2, 2013), Some(1));
        assert_eq!(table.get(2, 2014), Some(3));
        assert_eq!(table.get(1, 2014), None);
        assert_eq!(table.get(7, 2013), None);
        assert_eq!(table.year_total(2013), 4);
        assert_eq!(table.year_total(2014), 4);
    }

    #[test]
    fn invalid_years_are_dropped_not_zero_filled() {
        let tmp = two_year_dir();
        let loader = loader_in(tmp.path());
        let summarizer = YearMonthSummarizer::new(&loader);

        let clean = summarizer.summarize(&[2013]).unwrap();
        let with_bad = summarizer
            .summarize_with_skipped(&[2013, 9999])
            .unwrap();

        assert_eq!(with_bad.table, clean);
        assert_eq!(with_bad.table.years(), vec![2013]);
        assert_eq!(with_bad.skipped.len(), 1);
        assert_eq!(with_bad.skipped[0].year, 9999);
    }

    #[test]
    fn only_invalid_years_give_empty_table() {
        let tmp = tempdir().unwrap();
        let loader = loader_in(tmp.path());

        let summary = YearMonthSummarizer::new(&loader)
            .summarize_with_skipped(&[9999])
            .unwrap();

        assert!(summary.table.is_empty());
        assert!(summary.table.years().is_empty());
        assert_eq!(summary.skipped.len(), 1);
    }

    #[test]
    fn year_columns_are_ascending_regardless_of_request_order() {
        let tmp = two_year_dir();
        let loader = loader_in(tmp.path());

        let table = YearMonthSummarizer::new(&loader)
            .summarize(&[2014, 2013, 2014])
            .unwrap();

        assert_eq!(table.years(), vec![2013, 2014]);
        // 2014 requested twice, its rows are counted twice
        assert_eq!(table.get(2, 2014), Some(6));
    }

    #[test]
    fn wide_dataframe_keeps_missing_cells_null() {
        let tmp = two_year_dir();
        let loader = loader_in(tmp.path());
        let table = YearMonthSummarizer::new(&loader)
            .summarize(&[2013, 2014])
            .unwrap();

        let df = table.to_dataframe().unwrap();

        assert_eq!(
            crate::data::column_names(&df),
            vec!["MONTH", "2013", "2014"]
        );
        assert_eq!(df.height(), 4);
        let y2014: Vec<Option<u32>> = df
            .column("2014")
            .unwrap()
            .u32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(y2014, vec![None, Some(3), None, Some(1)]);
    }

    #[test]
    fn csv_export_leaves_missing_cells_empty() {
        let tmp = two_year_dir();
        let loader = loader_in(tmp.path());
        let table = YearMonthSummarizer::new(&loader)
            .summarize(&[2013, 2014])
            .unwrap();

        let out = tmp.path().join("summary.csv");
        table.write_csv(&out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "MONTH,2013,2014");
        assert_eq!(lines[1], "1,2,");
        assert_eq!(lines[2], "2,1,3");
        assert_eq!(lines[4], "7,,1");
    }
}
