//! Cross-platform application paths

use std::fs;
use std::path::PathBuf;

use crate::error::PlayerError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self, PlayerError> {
        let base = dirs::data_dir().ok_or(PlayerError::NoDataDir)?;
        Self::at(base.join("pahviz"))
    }

    /// Uses `data_dir` as-is, creating it if needed.
    pub fn at(data_dir: PathBuf) -> Result<Self, PlayerError> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Optional [`pahviz::SessionConfig`] as JSON.
    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Default target of `ExportSvg` when no path is given.
    pub fn svg_file(&self) -> PathBuf {
        self.data_dir.join("pahviz.svg")
    }
}
