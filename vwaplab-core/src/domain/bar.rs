//! Bar — the fundamental market data unit, and the validated series the engine consumes.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV bar for the single traded asset.
///
/// Volume is a real number: ingestion expands unit suffixes ("1.2K", "3M")
/// into fractional counts before bars reach the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Close below open.
    pub fn is_red(&self) -> bool {
        self.close < self.open
    }

    /// Close × volume, the numerator contribution to VWAP.
    pub fn price_volume(&self) -> f64 {
        self.close * self.volume
    }

    fn has_finite_prices(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Rejections raised while validating a bar series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar {index}: date {current} does not come after previous date {previous}")]
    NonIncreasingDate {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
    #[error("bar {index} ({date}): negative volume {volume}")]
    NegativeVolume {
        index: usize,
        date: NaiveDate,
        volume: f64,
    },
    #[error("bar {index} ({date}): non-finite price or volume")]
    NonFinite { index: usize, date: NaiveDate },
}

/// Ordered, immutable sequence of bars with strictly increasing dates.
///
/// The only way to build one is through [`BarSeries::new`], so every series
/// the engine sees has already passed ordering and volume checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarError> {
        for (index, bar) in bars.iter().enumerate() {
            validate_bar(index, bar)?;
            if index > 0 {
                let previous = bars[index - 1].date;
                if bar.date <= previous {
                    return Err(BarError::NonIncreasingDate {
                        index,
                        previous,
                        current: bar.date,
                    });
                }
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }
}

impl<'a> IntoIterator for &'a BarSeries {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

/// Per-bar checks shared by series construction and incremental stepping.
pub(crate) fn validate_bar(index: usize, bar: &Bar) -> Result<(), BarError> {
    if !bar.has_finite_prices() || !bar.volume.is_finite() {
        return Err(BarError::NonFinite {
            index,
            date: bar.date,
        });
    }
    if bar.volume < 0.0 {
        return Err(BarError::NegativeVolume {
            index,
            date: bar.date,
            volume: bar.volume,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64, volume: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    #[test]
    fn accepts_strictly_increasing_dates() {
        let series = BarSeries::new(vec![bar(2, 10.0, 100.0), bar(3, 11.0, 0.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn empty_series_is_valid() {
        let series = BarSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
    }

    #[test]
    fn rejects_duplicate_date() {
        let err = BarSeries::new(vec![bar(2, 10.0, 100.0), bar(2, 11.0, 100.0)]).unwrap_err();
        assert!(matches!(err, BarError::NonIncreasingDate { index: 1, .. }));
    }

    #[test]
    fn rejects_decreasing_date() {
        let err = BarSeries::new(vec![bar(5, 10.0, 100.0), bar(4, 11.0, 100.0)]).unwrap_err();
        assert!(matches!(err, BarError::NonIncreasingDate { index: 1, .. }));
    }

    #[test]
    fn rejects_negative_volume() {
        let err = BarSeries::new(vec![bar(2, 10.0, -1.0)]).unwrap_err();
        assert_eq!(
            err,
            BarError::NegativeVolume {
                index: 0,
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                volume: -1.0,
            }
        );
    }

    #[test]
    fn rejects_nan_close() {
        let err = BarSeries::new(vec![bar(2, f64::NAN, 10.0)]).unwrap_err();
        assert!(matches!(err, BarError::NonFinite { index: 0, .. }));
    }

    #[test]
    fn rejects_infinite_volume() {
        let err = BarSeries::new(vec![bar(2, 10.0, f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, BarError::NonFinite { index: 0, .. }));
    }

    #[test]
    fn red_bar_and_weekday() {
        let mut b = bar(1, 10.0, 1.0); // 2024-01-01 is a Monday
        b.open = 11.0;
        assert!(b.is_red());
        assert_eq!(b.weekday(), Weekday::Mon);
        assert_eq!(b.price_volume(), 10.0);
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let b = bar(2, 103.0, 5_000.0);
        let json = serde_json::to_string(&b).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(b, deser);
    }
}
