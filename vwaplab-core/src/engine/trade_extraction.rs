//! Trade extraction — pairs Buy/Sell fills into round-trip `TradeRecord`s.
//!
//! Pure post-processing after the bar loop. A trailing Buy without a Sell is
//! an open position, not a trade.

use crate::domain::{Fill, FillSide, TradeRecord};

pub fn extract_trades(fills: &[Fill]) -> Vec<TradeRecord> {
    let mut trades = Vec::new();
    let mut open: Option<&Fill> = None;

    for fill in fills {
        match (fill.side, open) {
            (FillSide::Buy, None) => open = Some(fill),
            (FillSide::Sell, Some(entry)) => {
                trades.push(TradeRecord {
                    entry_bar: entry.bar_index,
                    entry_date: entry.date,
                    entry_price: entry.price,
                    exit_bar: fill.bar_index,
                    exit_date: fill.date,
                    exit_price: fill.price,
                    quantity: fill.quantity,
                    pnl: (fill.price - entry.price) * fill.quantity,
                    bars_held: fill.bar_index - entry.bar_index,
                });
                open = None;
            }
            // The ledger never produces these sequences.
            (FillSide::Buy, Some(_)) | (FillSide::Sell, None) => {}
        }
    }

    trades
}
