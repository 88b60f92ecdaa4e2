//! Synthetic year files for tests.

use crate::config::FarsConfig;
use crate::data::FileLoader;
use std::fs;
use std::path::{Path, PathBuf};

pub struct AccidentRow {
    pub month: u32,
    pub state: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl AccidentRow {
    pub fn new(month: u32, state: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            month,
            state,
            latitude,
            longitude,
        }
    }
}

/// Write `accident_<year>.csv` into `dir` with a FARS-like header.
pub fn write_year_file(dir: &Path, year: i32, rows: &[AccidentRow]) -> PathBuf {
    let mut text = String::from("STATE,ST_CASE,MONTH,YEAR,LATITUDE,LONGITUD\n");
    for (i, row) in rows.iter().enumerate() {
        text.push_str(&format!(
            "{},{},{},{},{:.4},{:.4}\n",
            row.state,
            row.state * 10000 + i as i64,
            row.month,
            year,
            row.latitude,
            row.longitude
        ));
    }
    let path = dir.join(format!("accident_{year}.csv"));
    fs::write(&path, text).unwrap();
    path
}

/// Loader reading year files from `dir`.
pub fn loader_in(dir: &Path) -> FileLoader {
    FileLoader::new(FarsConfig {
        data_dir: dir.to_path_buf(),
        ..FarsConfig::default()
    })
}
