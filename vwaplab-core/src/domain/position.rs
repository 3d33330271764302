use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Open long position. Flat is represented by the absence of a `Position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn market_value(&self, current_price: f64) -> f64 {
        self.quantity * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.quantity * (current_price - self.entry_price)
    }
}

/// Coarse position state seen by the decision policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    Flat,
    Long,
}

impl PositionState {
    pub fn of(position: Option<&Position>) -> Self {
        match position {
            Some(_) => PositionState::Long,
            None => PositionState::Flat,
        }
    }
}
