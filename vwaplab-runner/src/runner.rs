//! Backtest runner — wires together data loading, the simulation loop, and metrics.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads bars per the config, then runs. Used by CLI.
//! - `run_backtest_from_series()`: takes a pre-loaded series. Used by sweeps.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use vwaplab_core::domain::BarSeries;
use vwaplab_core::{run_simulation, RunResult, SimulationConfig, SimulationError};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_bars, LoadError, LoadedData};
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub config: SimulationConfig,
    /// BLAKE3 of the simulation config.
    pub config_hash: String,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub start_date: String,
    pub end_date: String,
    pub metrics: PerformanceMetrics,
    pub run: RunResult,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn total_return(&self) -> f64 {
        self.metrics.total_return
    }
}

/// Load bars as configured, then run.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let loaded = load_bars(&config.backtest)?;
    run_loaded(config, &loaded)
}

/// Run against data already in memory.
pub fn run_loaded(config: &BacktestConfig, loaded: &LoadedData) -> Result<BacktestResult, RunError> {
    run_backtest_from_series(
        &config.backtest.symbol,
        &config.simulation,
        &loaded.series,
        &loaded.dataset_hash,
        loaded.is_synthetic(),
    )
}

/// Run a simulation with a pre-loaded series — no I/O.
pub fn run_backtest_from_series(
    symbol: &str,
    config: &SimulationConfig,
    series: &BarSeries,
    dataset_hash: &str,
    has_synthetic: bool,
) -> Result<BacktestResult, RunError> {
    let config_hash = config.full_hash()?;
    let run = run_simulation(series, config)?;
    let metrics = PerformanceMetrics::from_run(&run);

    info!(
        symbol,
        policy = config.policy.name(),
        total_return = metrics.total_return,
        trades = metrics.trade_count,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        config: config.clone(),
        config_hash,
        dataset_hash: dataset_hash.to_string(),
        has_synthetic,
        start_date: series
            .first_date()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        end_date: series
            .last_date()
            .map(|d| d.to_string())
            .unwrap_or_default(),
        metrics,
        run,
    })
}
