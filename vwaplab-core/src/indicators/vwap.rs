//! Rolling volume-weighted average price.
//!
//! VWAP = Σ(close × volume) / Σ(volume) over the last `period` bars.
//! Zero total volume yields [`VwapReading::Undefined`], never NaN or infinity.

use serde::{Deserialize, Serialize};

use super::rolling::RollingWindow;
use crate::config::ConfigError;
use crate::domain::Bar;

/// Per-bar output of a VWAP indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum VwapReading {
    Value(f64),
    /// Window not yet full and partial values are suppressed.
    Warming,
    /// Every bar in the window traded zero volume.
    Undefined,
}

impl VwapReading {
    pub fn value(self) -> Option<f64> {
        match self {
            VwapReading::Value(v) => Some(v),
            VwapReading::Warming | VwapReading::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, VwapReading::Value(_))
    }
}

/// What to report while fewer than `period` bars have been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// Average over the bars seen so far, from the first bar on.
    #[default]
    Partial,
    /// Report `Warming` until the window holds `period` bars.
    Suppress,
}

/// VWAP indicator owning its own rolling window.
#[derive(Debug, Clone)]
pub struct Vwap {
    window: RollingWindow,
    warmup: WarmupPolicy,
}

impl Vwap {
    pub fn new(period: usize, warmup: WarmupPolicy) -> Result<Self, ConfigError> {
        let window = RollingWindow::new(period).map_err(|_| ConfigError::NonPositivePeriod {
            name: "vwap_period",
        })?;
        Ok(Self { window, warmup })
    }

    /// Advance the window by one bar and read the new value.
    pub fn update(&mut self, bar: &Bar) -> VwapReading {
        self.window.advance(bar);
        self.reading()
    }

    /// Current reading without advancing.
    pub fn reading(&self) -> VwapReading {
        value_for(&self.window, self.warmup)
    }

    /// Lazy, forward-only readings aligned one-to-one with `bars`.
    pub fn series(self, bars: &[Bar]) -> VwapSeries<'_> {
        VwapSeries {
            vwap: self,
            bars: bars.iter(),
        }
    }
}

/// Derive a reading from window sums.
pub fn value_for(window: &RollingWindow, warmup: WarmupPolicy) -> VwapReading {
    if window.is_empty() {
        return VwapReading::Warming;
    }
    if warmup == WarmupPolicy::Suppress && !window.is_full() {
        return VwapReading::Warming;
    }
    if window.has_zero_volume() || window.volume_sum() == 0.0 {
        return VwapReading::Undefined;
    }
    let value = window.price_volume_sum() / window.volume_sum();
    if value.is_finite() {
        VwapReading::Value(value)
    } else {
        VwapReading::Undefined
    }
}

/// Iterator produced by [`Vwap::series`].
pub struct VwapSeries<'a> {
    vwap: Vwap,
    bars: std::slice::Iter<'a, Bar>,
}

impl Iterator for VwapSeries<'_> {
    type Item = VwapReading;

    fn next(&mut self) -> Option<Self::Item> {
        self.bars.next().map(|bar| self.vwap.update(bar))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bars.size_hint()
    }
}

impl ExactSizeIterator for VwapSeries<'_> {}
