//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! symbol = "SPY"
//! data_path = "data/spy.csv"
//!
//! [simulation]
//! starting_cash = 10000.0
//! vwap_period = 14
//!
//! [simulation.policy]
//! kind = "distance_threshold"
//! buy_threshold = 0.05
//! sell_threshold = 0.04
//! fixed_notional = 5000.0
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vwaplab_core::SimulationConfig;

/// Errors from reading or validating a backtest config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid simulation settings: {0}")]
    Simulation(#[from] vwaplab_core::ConfigError),
    #[error("no bar source: set [backtest] data_path or synthetic = true")]
    NoDataSource,
    #[error("synthetic data needs start_date <= end_date, got {start} > {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Top-level config file: where the bars come from, and how to simulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    /// Label used in reports and artifact directory names.
    pub symbol: String,
    /// Normalized CSV with `date,open,high,low,close,volume` columns.
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    /// Generate a seeded random walk instead of reading a file.
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub seed: u64,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default()
}

impl BacktestConfig {
    /// Synthetic-data config around a core preset.
    pub fn synthetic(symbol: &str, simulation: SimulationConfig) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.to_string(),
                data_path: None,
                synthetic: true,
                start_date: default_start_date(),
                end_date: default_end_date(),
                seed: 0,
            },
            simulation,
        }
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        let b = &self.backtest;
        if b.data_path.is_none() && !b.synthetic {
            return Err(ConfigError::NoDataSource);
        }
        if b.synthetic && b.start_date > b.end_date {
            return Err(ConfigError::InvalidDateRange {
                start: b.start_date,
                end: b.end_date,
            });
        }
        Ok(())
    }
}
