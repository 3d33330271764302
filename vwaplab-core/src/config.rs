//! Simulation configuration, validation and fingerprinting.
//!
//! Validation runs once before the first bar; an invalid configuration never
//! reaches the loop.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::WarmupPolicy;
use crate::strategy::{DistanceParams, Policy, WeekdayParams};

/// Configuration rejections.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer")]
    NonPositivePeriod { name: &'static str },
    #[error("{name} must be a non-negative finite fraction, got {value}")]
    NegativeThreshold { name: &'static str, value: f64 },
    #[error("fixed notional must be positive and finite, got {0}")]
    NonPositiveNotional(f64),
    #[error("starting cash must be non-negative and finite, got {0}")]
    NegativeStartingCash(f64),
    #[error("max_bars must be positive when set")]
    ZeroBarLimit,
}

/// Complete configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub starting_cash: f64,
    /// Lookback of the VWAP the policy trades against.
    pub vwap_period: usize,
    /// Optional second VWAP (e.g. 252-bar "yearly") reported alongside the
    /// primary one. It never influences decisions.
    #[serde(default)]
    pub reference_vwap_period: Option<usize>,
    #[serde(default)]
    pub warmup: WarmupPolicy,
    pub policy: Policy,
    /// Reject series longer than this many bars.
    #[serde(default)]
    pub max_bars: Option<usize>,
}

impl SimulationConfig {
    /// Distance-threshold mean reversion: buy 5% under the 14-bar VWAP,
    /// sell 4% over it, $5,000 per trade, $10,000 starting cash.
    pub fn mean_reversion() -> Self {
        Self {
            starting_cash: 10_000.0,
            vwap_period: 14,
            reference_vwap_period: Some(252),
            warmup: WarmupPolicy::Partial,
            policy: Policy::DistanceThreshold(DistanceParams {
                buy_threshold: 0.05,
                sell_threshold: 0.04,
                fixed_notional: 5_000.0,
            }),
            max_bars: None,
        }
    }

    /// Turnaround Tuesday: buy on Tuesday after a red prior bar, sell on
    /// Wednesday when the close is above the 14-bar VWAP.
    pub fn turnaround_tuesday() -> Self {
        Self {
            starting_cash: 100_000.0,
            vwap_period: 14,
            reference_vwap_period: None,
            warmup: WarmupPolicy::Partial,
            policy: Policy::WeekdayReversal(WeekdayParams {
                entry_weekday: Weekday::Tue,
                exit_weekday: Weekday::Wed,
                sell_threshold: 0.0001,
                fixed_notional: 100_000.0,
            }),
            max_bars: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.starting_cash.is_finite() || self.starting_cash < 0.0 {
            return Err(ConfigError::NegativeStartingCash(self.starting_cash));
        }
        if self.vwap_period == 0 {
            return Err(ConfigError::NonPositivePeriod { name: "vwap_period" });
        }
        if self.reference_vwap_period == Some(0) {
            return Err(ConfigError::NonPositivePeriod {
                name: "reference_vwap_period",
            });
        }
        if self.max_bars == Some(0) {
            return Err(ConfigError::ZeroBarLimit);
        }
        self.policy.validate()
    }

    /// Exact identity: BLAKE3 over the canonical JSON of the whole config.
    pub fn full_hash(&self) -> Result<String, serde_json::Error> {
        // Struct field order is fixed, so the JSON is deterministic.
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::NegativeThreshold { name, value });
    }
    Ok(())
}

pub(crate) fn check_notional(value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NonPositiveNotional(value));
    }
    Ok(())
}
