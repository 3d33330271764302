//! Per-bar output records and the run result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Fill, Position, TradeRecord};
use crate::indicators::VwapReading;

/// One entry of the equity trajectory, recorded after the bar's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub cash: f64,
    pub position_value: f64,
    pub equity: f64,
}

/// Indicator readings for one bar, for chart overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub vwap: VwapReading,
    pub reference_vwap: Option<VwapReading>,
}

/// Result of a complete simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub starting_cash: f64,
    pub final_cash: f64,
    /// Cash plus the open position marked at the last close.
    pub final_equity: f64,
    /// Position still open after the last bar, if any.
    pub open_position: Option<Position>,
    /// Equity after each bar.
    pub equity_curve: Vec<EquityPoint>,
    /// All Enter/Exit fills in bar order.
    pub fills: Vec<Fill>,
    /// Completed round trips.
    pub trades: Vec<TradeRecord>,
    pub indicators: Vec<IndicatorPoint>,
    pub bar_count: usize,
}

impl RunResult {
    pub fn equity_values(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.equity).collect()
    }

    pub fn total_pnl(&self) -> f64 {
        self.final_equity - self.starting_cash
    }

    /// Bars that ended with an open position.
    pub fn bars_in_market(&self) -> usize {
        self.equity_curve
            .iter()
            .filter(|p| p.position_value != 0.0)
            .count()
    }
}
