//! Configuration Module
//! Data directory, year file naming and plot output settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the yearly accident files live and how they are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarsConfig {
    pub data_dir: PathBuf,
    pub file_prefix: String,
    pub file_extension: String,
    pub plot: PlotConfig,
}

/// Output settings for rendered state maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub point_radius: u32,
}

impl Default for FarsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            file_prefix: "accident_".to_string(),
            file_extension: ".csv".to_string(),
            plot: PlotConfig::default(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            point_radius: 2,
        }
    }
}

impl FarsConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// File name for a year, e.g. `accident_2013.csv`.
    pub fn file_name(&self, year: i32) -> String {
        format!("{}{}{}", self.file_prefix, year, self.file_extension)
    }

    pub fn year_path(&self, year: i32) -> PathBuf {
        self.data_dir.join(self.file_name(year))
    }
}
