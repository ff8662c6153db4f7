use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::{Result, TrackerError};
use crate::process::COUNT_COLUMNS;

/// Run settings. Every field has a default, so an absent config file
/// reproduces the fixed notebook behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Delimited input table.
    pub input: PathBuf,
    /// Directory the chart files are written to.
    pub output_dir: PathBuf,
    pub top_n: usize,
    /// Integer column used to rank locations at the latest date.
    pub ranking_column: String,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("covid_data_with_population.csv"),
            output_dir: PathBuf::from("charts"),
            top_n: 5,
            ranking_column: "total_cases".to_string(),
            chart_width: 1200,
            chart_height: 600,
        }
    }
}

impl Config {
    /// Parse and validate a YAML config file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| TrackerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
            .map_err(|e| TrackerError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Config =
            serde_yaml::from_str(text).map_err(|e| TrackerError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(TrackerError::Config("top_n must be at least 1".into()));
        }
        if !COUNT_COLUMNS.contains(&self.ranking_column.as_str()) {
            return Err(TrackerError::Config(format!(
                "ranking_column `{}` is not one of {}",
                self.ranking_column,
                COUNT_COLUMNS.join(", ")
            )));
        }
        if self.chart_width < 200 || self.chart_height < 150 {
            return Err(TrackerError::Config(format!(
                "chart size {}x{} is too small",
                self.chart_width, self.chart_height
            )));
        }
        Ok(())
    }
}
