//! Domain types for VwapLab

pub mod bar;
pub mod fill;
pub mod position;
pub mod trade;

pub use bar::{Bar, BarError, BarSeries};
pub use fill::{Fill, FillSide};
pub use position::{Position, PositionState};
pub use trade::TradeRecord;
