//! Year File Loader Module
//! Resolves a year to its accident file and loads it using Polars.

use crate::config::FarsConfig;
use polars::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("file '{file_name}' does not exist (year {year})")]
    NotFound { year: i32, file_name: String },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Loads one year's accident records into a DataFrame.
#[derive(Debug, Clone)]
pub struct FileLoader {
    config: FarsConfig,
}

impl Default for FileLoader {
    fn default() -> Self {
        Self::new(FarsConfig::default())
    }
}

impl FileLoader {
    pub fn new(config: FarsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FarsConfig {
        &self.config
    }

    /// Name of the file backing `year`.
    pub fn file_name(&self, year: i32) -> String {
        self.config.file_name(year)
    }

    /// Full path of the file backing `year`.
    pub fn file_path(&self, year: i32) -> PathBuf {
        self.config.year_path(year)
    }

    /// Load the year file with header-derived column names.
    ///
    /// Column types are whatever the CSV reader infers. gzip and zstd
    /// compressed files are decompressed on the fly. Unparseable cells are
    /// read as nulls rather than failing the load.
    pub fn load(&self, year: i32) -> Result<DataFrame, LoaderError> {
        let path = self.file_path(year);
        if !path.is_file() {
            return Err(LoaderError::NotFound {
                year,
                file_name: self.file_name(year),
            });
        }

        debug!(year, path = %path.display(), "reading year file");
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;
        debug!(year, rows = df.height(), cols = df.width(), "loaded year file");

        Ok(df)
    }
}

/// Get list of column names of a DataFrame.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Distinct non-null integer values of a column, sorted ascending.
pub fn unique_codes(df: &DataFrame, column: &str) -> PolarsResult<Vec<i64>> {
    let values = df.column(column)?.cast(&DataType::Int64)?;
    let mut codes: Vec<i64> = values.i64()?.into_iter().flatten().collect();
    codes.sort_unstable();
    codes.dedup();
    Ok(codes)
}
