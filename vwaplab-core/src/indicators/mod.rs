//! Rolling indicators.
//!
//! Unlike batch indicators, these are updated one bar at a time by the
//! simulation loop, so no value can depend on a later bar.

pub mod rolling;
pub mod vwap;

pub use rolling::RollingWindow;
pub use vwap::{value_for, Vwap, VwapReading, VwapSeries, WarmupPolicy};

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high/low ±1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    let with_volume: Vec<(f64, f64)> = closes.iter().map(|&c| (c, 1000.0)).collect();
    make_bars_with_volume(&with_volume)
}

/// Create synthetic bars from (close, volume) pairs for testing.
#[cfg(test)]
pub fn make_bars_with_volume(points: &[(f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    points
        .iter()
        .enumerate()
        .map(|(i, &(close, volume))| {
            let open = if i == 0 { close } else { points[i - 1].0 };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
