use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillSide {
    Buy,
    Sell,
}

/// A realized Enter or Exit, executed at the bar's close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub side: FillSide,
    pub price: f64,
    pub quantity: f64,
}

impl Fill {
    /// Gross cash amount moved by the fill (always positive).
    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }

    /// Signed cash delta: negative for buys, positive for sells.
    pub fn cash_delta(&self) -> f64 {
        match self.side {
            FillSide::Buy => -self.notional(),
            FillSide::Sell => self.notional(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_delta_sign_follows_side() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let buy = Fill {
            bar_index: 0,
            date,
            side: FillSide::Buy,
            price: 50.0,
            quantity: 2.0,
        };
        let sell = Fill {
            side: FillSide::Sell,
            ..buy.clone()
        };
        assert_eq!(buy.notional(), 100.0);
        assert_eq!(buy.cash_delta(), -100.0);
        assert_eq!(sell.cash_delta(), 100.0);
    }
}
