//! Simulation engine — rolling indicators → policy → ledger, one bar at a time.
//!
//! All run state (indicator windows, ledger, trajectory) is owned by a
//! [`Simulation`] value, so independent runs never share mutable state.

pub mod ledger;
pub mod loop_runner;
pub mod state;
pub mod trade_extraction;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::BarError;

pub use ledger::{Applied, Ledger, LedgerError};
pub use loop_runner::{run_simulation, BarStep, Simulation};
pub use state::{EquityPoint, IndicatorPoint, RunResult};
pub use trade_extraction::extract_trades;

/// Fatal errors that abort a simulation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid bar: {0}")]
    Bar(#[from] BarError),
    #[error("bar {bar_index} ({date}): {source}")]
    Ledger {
        bar_index: usize,
        date: NaiveDate,
        #[source]
        source: LedgerError,
    },
    #[error("series exceeds the configured limit of {limit} bars")]
    BarLimitExceeded { limit: usize },
}
