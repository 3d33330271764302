//! Distance-threshold mean reversion.
//!
//! distance = (close − vwap) / vwap
//! - Flat, close < vwap, |distance| > buy_threshold  → Enter(notional / close)
//! - Long, close > vwap, distance > sell_threshold   → Exit(full position)
//! - otherwise Hold; no defined VWAP → Hold

use serde::{Deserialize, Serialize};

use super::{BarContext, Decision};
use crate::config::{check_notional, check_threshold, ConfigError};
use crate::domain::PositionState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceParams {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub fixed_notional: f64,
}

impl DistanceParams {
    pub fn decide(&self, ctx: &BarContext<'_>) -> Decision {
        let Some(distance) = ctx.distance_from_vwap() else {
            return Decision::Hold;
        };

        match ctx.state() {
            PositionState::Flat if distance < 0.0 && distance.abs() > self.buy_threshold => ctx
                .entry_quantity(self.fixed_notional)
                .map_or(Decision::Hold, |quantity| Decision::Enter { quantity }),
            PositionState::Long if distance > 0.0 && distance > self.sell_threshold => {
                ctx.exit_all()
            }
            _ => Decision::Hold,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("buy_threshold", self.buy_threshold)?;
        check_threshold("sell_threshold", self.sell_threshold)?;
        check_notional(self.fixed_notional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::VwapReading;
    use crate::strategy::fixtures::{bar_on, context, long_position};
    use chrono::NaiveDate;

    fn params() -> DistanceParams {
        DistanceParams {
            buy_threshold: 0.05,
            sell_threshold: 0.04,
            fixed_notional: 5_000.0,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn enters_when_far_below_vwap() {
        let bar = bar_on(day(), 100.0, 90.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), None, 10_000.0);
        assert_eq!(
            params().decide(&ctx),
            Decision::Enter {
                quantity: 5_000.0 / 90.0
            }
        );
    }

    #[test]
    fn holds_when_below_vwap_within_threshold() {
        let bar = bar_on(day(), 100.0, 96.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), None, 10_000.0);
        assert_eq!(params().decide(&ctx), Decision::Hold);
    }

    #[test]
    fn threshold_is_strict() {
        // distance exactly -0.05 does not exceed the threshold
        let bar = bar_on(day(), 100.0, 95.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), None, 10_000.0);
        assert_eq!(params().decide(&ctx), Decision::Hold);
    }

    #[test]
    fn no_second_entry_while_long() {
        let bar = bar_on(day(), 100.0, 80.0);
        let pos = long_position(10.0, 90.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), Some(&pos), 10_000.0);
        assert_eq!(params().decide(&ctx), Decision::Hold);
    }

    #[test]
    fn exits_full_position_when_far_above_vwap() {
        let bar = bar_on(day(), 100.0, 106.0);
        let pos = long_position(55.5, 90.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), Some(&pos), 0.0);
        assert_eq!(params().decide(&ctx), Decision::Exit { quantity: 55.5 });
    }

    #[test]
    fn holds_long_when_above_vwap_within_threshold() {
        let bar = bar_on(day(), 100.0, 103.0);
        let pos = long_position(10.0, 90.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), Some(&pos), 0.0);
        assert_eq!(params().decide(&ctx), Decision::Hold);
    }

    #[test]
    fn no_exit_when_flat() {
        let bar = bar_on(day(), 100.0, 110.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), None, 10_000.0);
        assert_eq!(params().decide(&ctx), Decision::Hold);
    }

    #[test]
    fn undefined_or_warming_vwap_holds() {
        let bar = bar_on(day(), 100.0, 50.0);
        for reading in [VwapReading::Undefined, VwapReading::Warming] {
            let ctx = context(&bar, None, reading, None, 10_000.0);
            assert_eq!(params().decide(&ctx), Decision::Hold);
        }
    }

    #[test]
    fn unaffordable_entry_holds() {
        let bar = bar_on(day(), 100.0, 90.0);
        let ctx = context(&bar, None, VwapReading::Value(100.0), None, 4_999.0);
        assert_eq!(params().decide(&ctx), Decision::Hold);
    }

    #[test]
    fn validation() {
        assert!(params().validate().is_ok());
        let mut p = params();
        p.sell_threshold = f64::NAN;
        assert!(p.validate().is_err());
        let mut p = params();
        p.fixed_notional = 0.0;
        assert_eq!(p.validate(), Err(ConfigError::NonPositiveNotional(0.0)));
    }
}
