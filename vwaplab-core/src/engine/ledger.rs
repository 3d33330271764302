//! Portfolio ledger — cash plus at most one long position, updated by fills at the close.
//!
//! The equity accounting identity must hold at every bar boundary:
//! `equity == cash + position.quantity × close`.

use thiserror::Error;
use tracing::debug;

use crate::domain::{Bar, Fill, FillSide, Position};
use crate::strategy::Decision;

use super::state::EquityPoint;

/// Relative tolerance for cash checks and full-exit matching.
///
/// `notional / close × close` can land a few ulps above `notional`; a buy
/// that spends all cash must not be rejected for that.
const TOLERANCE: f64 = 1e-9;

/// Instructions the ledger cannot honour in its current state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("insufficient cash: need {required:.2}, have {available:.2}")]
    InsufficientCash { required: f64, available: f64 },
    #[error("exit requested with no open position")]
    NoPosition,
    #[error("partial exit of {requested} requested, position holds {held}")]
    PartialExit { requested: f64, held: f64 },
    #[error("entry requested while already long {held}")]
    AlreadyLong { held: f64 },
    #[error("order quantity must be positive and finite, got {0}")]
    InvalidQuantity(f64),
}

/// Outcome of applying one decision on one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub fill: Option<Fill>,
    pub equity: EquityPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    cash: f64,
    position: Option<Position>,
}

impl Ledger {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            position: None,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Mark-to-market value of the open position, or 0 when flat.
    pub fn position_value(&self, price: f64) -> f64 {
        self.position
            .as_ref()
            .map_or(0.0, |pos| pos.market_value(price))
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position_value(price)
    }

    /// Apply a decision at `bar.close` and mark the ledger to that close.
    ///
    /// On error the ledger is unchanged.
    pub fn apply(
        &mut self,
        decision: &Decision,
        bar_index: usize,
        bar: &Bar,
    ) -> Result<Applied, LedgerError> {
        let price = bar.close;
        let fill = match *decision {
            Decision::Hold => None,
            Decision::Enter { quantity } => Some(self.enter(quantity, bar_index, bar)?),
            Decision::Exit { quantity } => Some(self.exit(quantity, bar_index, bar)?),
        };

        if let Some(fill) = &fill {
            debug!(
                date = %fill.date,
                side = ?fill.side,
                price = fill.price,
                quantity = fill.quantity,
                cash = self.cash,
                "fill"
            );
        }

        let position_value = self.position_value(price);
        Ok(Applied {
            fill,
            equity: EquityPoint {
                bar_index,
                date: bar.date,
                cash: self.cash,
                position_value,
                equity: self.cash + position_value,
            },
        })
    }

    fn enter(&mut self, quantity: f64, bar_index: usize, bar: &Bar) -> Result<Fill, LedgerError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }
        if let Some(pos) = &self.position {
            return Err(LedgerError::AlreadyLong { held: pos.quantity });
        }

        let cost = quantity * bar.close;
        if cost > self.cash + TOLERANCE * self.cash.abs().max(1.0) {
            return Err(LedgerError::InsufficientCash {
                required: cost,
                available: self.cash,
            });
        }

        let fill = Fill {
            bar_index,
            date: bar.date,
            side: FillSide::Buy,
            price: bar.close,
            quantity,
        };
        self.cash = (self.cash + fill.cash_delta()).max(0.0);
        self.position = Some(Position {
            quantity,
            entry_price: bar.close,
            entry_bar: bar_index,
            entry_date: bar.date,
        });
        Ok(fill)
    }

    fn exit(&mut self, quantity: f64, bar_index: usize, bar: &Bar) -> Result<Fill, LedgerError> {
        let held = match &self.position {
            Some(pos) => pos.quantity,
            None => return Err(LedgerError::NoPosition),
        };
        if (quantity - held).abs() > TOLERANCE * held.abs().max(1.0) {
            return Err(LedgerError::PartialExit {
                requested: quantity,
                held,
            });
        }

        let fill = Fill {
            bar_index,
            date: bar.date,
            side: FillSide::Sell,
            price: bar.close,
            quantity: held,
        };
        self.cash += fill.cash_delta();
        self.position = None;
        Ok(fill)
    }
}
