//! Weekday reversal ("turnaround Tuesday") with a VWAP-gated exit.
//!
//! - Entry: bar falls on `entry_weekday`, previous bar closed below its open,
//!   position is flat → Enter(notional / close).
//! - Exit: bar falls on `exit_weekday`, position is long and the close sits
//!   more than `sell_threshold` above VWAP → Exit(full position).
//!
//! Weekdays are named explicitly rather than indexed, so there is no
//! Monday-is-zero ambiguity in configuration.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{BarContext, Decision};
use crate::config::{check_notional, check_threshold, ConfigError};
use crate::domain::PositionState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayParams {
    pub entry_weekday: Weekday,
    pub exit_weekday: Weekday,
    pub sell_threshold: f64,
    pub fixed_notional: f64,
}

impl WeekdayParams {
    pub fn decide(&self, ctx: &BarContext<'_>) -> Decision {
        let weekday = ctx.bar.weekday();
        match ctx.state() {
            PositionState::Flat => {
                if weekday != self.entry_weekday {
                    return Decision::Hold;
                }
                // First bar has no previous bar: gate is closed.
                let prior_was_red = ctx.previous.is_some_and(|prev| prev.is_red());
                if !prior_was_red {
                    return Decision::Hold;
                }
                ctx.entry_quantity(self.fixed_notional)
                    .map_or(Decision::Hold, |quantity| Decision::Enter { quantity })
            }
            PositionState::Long => {
                if weekday != self.exit_weekday {
                    return Decision::Hold;
                }
                match ctx.distance_from_vwap() {
                    Some(distance) if distance > self.sell_threshold => ctx.exit_all(),
                    _ => Decision::Hold,
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("sell_threshold", self.sell_threshold)?;
        check_notional(self.fixed_notional)
    }
}
