//! Rolling window of (price×volume, volume) contributions.
//!
//! Amortized O(1) per bar: each new bar's contribution is added and, once the
//! window is full, the exact stored contribution of the evicted bar is
//! subtracted. Subtraction cancels badly when the evicted bar dominated the
//! sum, so the sums are re-added from the retained entries whenever a running
//! sum falls below half its peak since the last re-sum, and at least once
//! every `period` evictions.

use std::collections::VecDeque;

use crate::config::ConfigError;
use crate::domain::Bar;

/// Sliding-window sums backing a VWAP indicator.
///
/// Both sums always cover exactly the last `min(period, bars seen)` bars.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    entries: VecDeque<(f64, f64)>,
    price_volume_sum: f64,
    volume_sum: f64,
    /// Entries in the window with non-zero volume. When this reaches zero the
    /// sums are reset to exactly 0.0 so add/subtract residue cannot fake a
    /// defined VWAP over an all-zero-volume window.
    nonzero_volume: usize,
    price_volume_peak: f64,
    volume_peak: f64,
    evictions_since_resum: usize,
}

impl RollingWindow {
    pub fn new(period: usize) -> Result<Self, ConfigError> {
        if period == 0 {
            return Err(ConfigError::NonPositivePeriod { name: "rolling window" });
        }
        Ok(Self {
            period,
            entries: VecDeque::with_capacity(period),
            price_volume_sum: 0.0,
            volume_sum: 0.0,
            nonzero_volume: 0,
            price_volume_peak: 0.0,
            volume_peak: 0.0,
            evictions_since_resum: 0,
        })
    }

    /// Consume one bar, evicting the oldest contribution once the window is full.
    pub fn advance(&mut self, bar: &Bar) {
        self.push(bar.price_volume(), bar.volume);
    }

    fn push(&mut self, price_volume: f64, volume: f64) {
        if self.entries.len() == self.period {
            if let Some((old_pv, old_vol)) = self.entries.pop_front() {
                self.price_volume_sum -= old_pv;
                self.volume_sum -= old_vol;
                if old_vol != 0.0 {
                    self.nonzero_volume -= 1;
                }
                self.evictions_since_resum += 1;
                if self.has_drifted() {
                    self.resum();
                }
            }
        }

        self.entries.push_back((price_volume, volume));
        self.price_volume_sum += price_volume;
        self.volume_sum += volume;
        if volume != 0.0 {
            self.nonzero_volume += 1;
        }
        self.price_volume_peak = self.price_volume_peak.max(self.price_volume_sum.abs());
        self.volume_peak = self.volume_peak.max(self.volume_sum.abs());

        if self.nonzero_volume == 0 {
            self.price_volume_sum = 0.0;
            self.volume_sum = 0.0;
        }
    }

    /// Rounding left by earlier terms is bounded by a fraction of the peak,
    /// so it stays small relative to the current sum only while the sum is
    /// within a factor of two of that peak.
    fn has_drifted(&self) -> bool {
        self.evictions_since_resum >= self.period
            || self.volume_sum.abs() < 0.5 * self.volume_peak
            || self.price_volume_sum.abs() < 0.5 * self.price_volume_peak
    }

    fn resum(&mut self) {
        self.price_volume_sum = self.entries.iter().map(|&(pv, _)| pv).sum();
        self.volume_sum = self.entries.iter().map(|&(_, vol)| vol).sum();
        self.price_volume_peak = self.price_volume_sum.abs();
        self.volume_peak = self.volume_sum.abs();
        self.evictions_since_resum = 0;
    }

    pub fn price_volume_sum(&self) -> f64 {
        self.price_volume_sum
    }

    pub fn volume_sum(&self) -> f64 {
        self.volume_sum
    }

    /// Number of bars currently inside the window.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.period
    }

    /// True when every bar in the window traded zero volume (or the window is empty).
    pub fn has_zero_volume(&self) -> bool {
        self.nonzero_volume == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars_with_volume;

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            RollingWindow::new(0),
            Err(ConfigError::NonPositivePeriod { .. })
        ));
    }

    #[test]
    fn partial_window_sums_everything_seen() {
        let bars = make_bars_with_volume(&[(10.0, 1.0), (20.0, 2.0)]);
        let mut w = RollingWindow::new(3).unwrap();
        for b in &bars {
            w.advance(b);
        }
        assert_eq!(w.len(), 2);
        assert!(!w.is_full());
        assert_eq!(w.volume_sum(), 3.0);
        assert_eq!(w.price_volume_sum(), 50.0);
    }

    #[test]
    fn full_window_evicts_oldest() {
        let bars = make_bars_with_volume(&[(10.0, 1.0), (20.0, 2.0), (30.0, 3.0), (40.0, 4.0)]);
        let mut w = RollingWindow::new(3).unwrap();
        for b in &bars {
            w.advance(b);
        }
        assert!(w.is_full());
        // Last three bars: 20×2 + 30×3 + 40×4 = 290, volume 9
        assert_eq!(w.volume_sum(), 9.0);
        assert_eq!(w.price_volume_sum(), 290.0);
    }

    #[test]
    fn period_one_tracks_latest_bar() {
        let bars = make_bars_with_volume(&[(10.0, 5.0), (12.0, 7.0)]);
        let mut w = RollingWindow::new(1).unwrap();
        w.advance(&bars[0]);
        w.advance(&bars[1]);
        assert_eq!(w.volume_sum(), 7.0);
        assert_eq!(w.price_volume_sum(), 84.0);
    }

    #[test]
    fn evicting_a_dominant_bar_keeps_small_sums_exact() {
        let bars = make_bars_with_volume(&[(100.0, 1e16), (10.0, 1.0), (20.0, 1.0)]);
        let mut w = RollingWindow::new(2).unwrap();
        for b in &bars {
            w.advance(b);
        }
        assert_eq!(w.volume_sum(), 2.0);
        assert_eq!(w.price_volume_sum(), 30.0);
    }

    #[test]
    fn dominant_bar_in_a_longer_window() {
        let bars = make_bars_with_volume(&[
            (50.0, 3.0),
            (100.0, 1e15),
            (10.0, 2.0),
            (20.0, 4.0),
            (30.0, 6.0),
        ]);
        let mut w = RollingWindow::new(3).unwrap();
        for b in &bars {
            w.advance(b);
        }
        // Last three bars: 10×2 + 20×4 + 30×6 = 280, volume 12
        assert_eq!(w.volume_sum(), 12.0);
        assert_eq!(w.price_volume_sum(), 280.0);
    }

    #[test]
    fn zero_volume_window_resets_to_exact_zero() {
        let bars = make_bars_with_volume(&[
            (10.1, 0.1),
            (10.2, 0.2),
            (10.3, 0.0),
            (10.4, 0.0),
        ]);
        let mut w = RollingWindow::new(2).unwrap();
        for b in &bars {
            w.advance(b);
        }
        assert!(w.has_zero_volume());
        assert_eq!(w.volume_sum(), 0.0);
        assert_eq!(w.price_volume_sum(), 0.0);
    }
}
