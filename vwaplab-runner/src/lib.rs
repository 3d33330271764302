//! VwapLab Runner — backtest orchestration, metrics, sweeps and export.
//!
//! This crate builds on `vwaplab-core` to provide:
//! - TOML configuration (`[backtest]` data source + `[simulation]` settings)
//! - Bar loading from normalized CSV or a seeded synthetic walk
//! - Single-backtest runner with performance metrics
//! - Parallel parameter sweeps ranked by total return
//! - JSON / CSV / Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, BacktestSection, ConfigError};
pub use data_loader::{load_bars, load_csv, DataSource, LoadError, LoadedData};
pub use export::{save_artifacts, load_artifacts};
pub use metrics::PerformanceMetrics;
pub use runner::{
    run_backtest_from_series, run_loaded, run_single_backtest, BacktestResult, RunError,
    SCHEMA_VERSION,
};
pub use sweep::{ParamGrid, ParamSweep, SweepResults};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<ParamGrid>();
        assert_sync::<ParamGrid>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
