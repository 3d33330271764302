//! Decision policies — per-bar Hold / Enter / Exit over a {Flat, Long} state machine.
//!
//! Policies are pure: everything they may look at arrives in [`BarContext`],
//! which carries only the current bar, the previous bar and the VWAP reading
//! for the current bar. Nothing from later bars is reachable.

pub mod distance;
pub mod weekday;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;
use crate::domain::{Bar, Position, PositionState};
use crate::indicators::VwapReading;

pub use distance::DistanceParams;
pub use weekday::WeekdayParams;

/// Instruction for the ledger on the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    Hold,
    Enter { quantity: f64 },
    Exit { quantity: f64 },
}

/// Everything a policy may inspect on one bar.
#[derive(Debug, Clone, Copy)]
pub struct BarContext<'a> {
    pub bar_index: usize,
    pub bar: &'a Bar,
    pub previous: Option<&'a Bar>,
    pub vwap: VwapReading,
    pub position: Option<&'a Position>,
    pub cash: f64,
}

impl BarContext<'_> {
    pub fn state(&self) -> PositionState {
        PositionState::of(self.position)
    }

    /// Signed distance of the close from VWAP as a fraction of VWAP.
    ///
    /// `None` while the indicator is warming or undefined, or when VWAP is
    /// not positive.
    pub fn distance_from_vwap(&self) -> Option<f64> {
        let vwap = self.vwap.value()?;
        if vwap <= 0.0 {
            return None;
        }
        Some((self.bar.close - vwap) / vwap)
    }

    /// Quantity bought by spending `notional` at this bar's close.
    ///
    /// `None` when the close is not positive or the notional exceeds cash;
    /// the policy holds instead of handing the ledger an unaffordable entry.
    pub fn entry_quantity(&self, notional: f64) -> Option<f64> {
        if self.bar.close <= 0.0 {
            return None;
        }
        if notional > self.cash {
            debug!(
                date = %self.bar.date,
                notional,
                cash = self.cash,
                "entry skipped: notional exceeds available cash"
            );
            return None;
        }
        Some(notional / self.bar.close)
    }

    fn exit_all(&self) -> Decision {
        match self.position {
            Some(pos) => Decision::Exit {
                quantity: pos.quantity,
            },
            None => Decision::Hold,
        }
    }
}

/// Selected decision policy with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Policy {
    /// Mean reversion around VWAP.
    DistanceThreshold(DistanceParams),
    /// Calendar-gated entry after a red bar, VWAP-gated exit.
    WeekdayReversal(WeekdayParams),
}

impl Policy {
    pub fn decide(&self, ctx: &BarContext<'_>) -> Decision {
        match self {
            Policy::DistanceThreshold(params) => params.decide(ctx),
            Policy::WeekdayReversal(params) => params.decide(ctx),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Policy::DistanceThreshold(params) => params.validate(),
            Policy::WeekdayReversal(params) => params.validate(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::DistanceThreshold(_) => "distance_threshold",
            Policy::WeekdayReversal(_) => "weekday_reversal",
        }
    }

    pub fn fixed_notional(&self) -> f64 {
        match self {
            Policy::DistanceThreshold(params) => params.fixed_notional,
            Policy::WeekdayReversal(params) => params.fixed_notional,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn distance_from_vwap_requires_defined_positive_vwap() {
        let bar = bar_on(day(), 100.0, 90.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), None, 0.0);
        assert!((ctx.distance_from_vwap().unwrap() + 0.10).abs() < 1e-12);

        for reading in [VwapReading::Warming, VwapReading::Undefined, VwapReading::Value(0.0)] {
            let ctx = context(&bar, None, reading, None, 0.0);
            assert_eq!(ctx.distance_from_vwap(), None);
        }
    }

    #[test]
    fn entry_quantity_respects_cash() {
        let bar = bar_on(day(), 100.0, 50.0);
        let ctx = context(&bar, None, VwapReading::Warming, None, 1_000.0);
        assert_eq!(ctx.entry_quantity(500.0), Some(10.0));
        assert_eq!(ctx.entry_quantity(1_000.0), Some(20.0));
        assert_eq!(ctx.entry_quantity(1_000.01), None);
    }

    #[test]
    fn policy_dispatch_and_names() {
        let a = Policy::DistanceThreshold(DistanceParams {
            buy_threshold: 0.05,
            sell_threshold: 0.04,
            fixed_notional: 5_000.0,
        });
        assert_eq!(a.name(), "distance_threshold");
        assert_eq!(a.fixed_notional(), 5_000.0);

        let bar = bar_on(day(), 100.0, 100.0);
        let ctx = context(&bar, None, VwapReading::Undefined, None, 10_000.0);
        assert_eq!(a.decide(&ctx), Decision::Hold);
    }

    #[test]
    fn policy_deserializes_from_kind_tag() {
        let json = r#"{"kind":"weekday_reversal","entry_weekday":"Tue","exit_weekday":"Wed","sell_threshold":0.0001,"fixed_notional":1000.0}"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.name(), "weekday_reversal");
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn decision_serializes_with_action_tag() {
        let json = serde_json::to_string(&Decision::Enter { quantity: 2.0 }).unwrap();
        assert_eq!(json, r#"{"action":"enter","quantity":2.0}"#);
    }
}
