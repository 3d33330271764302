//! VwapLab Core — single-asset, bar-by-bar VWAP strategy simulator.
//!
//! This crate contains the engine:
//! - Domain types (bars, validated bar series, positions, fills, trades)
//! - Rolling window sums and the VWAP indicator
//! - Decision policies (distance-threshold, weekday reversal)
//! - Portfolio ledger with fills at the bar close
//! - Bar-by-bar simulation loop producing the equity trajectory

pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;

pub use config::{ConfigError, SimulationConfig};
pub use domain::{Bar, BarError, BarSeries};
pub use engine::{run_simulation, RunResult, Simulation, SimulationError};
pub use strategy::{Decision, Policy};
