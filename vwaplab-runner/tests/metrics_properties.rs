//! Property tests for performance metrics.
//!
//! 1. Curve-level bounds — drawdown in [-1, 0], total return agrees with the
//!    curve's endpoints, CAGR shares the sign of total return
//! 2. Run-level consistency — metrics computed from real simulations agree
//!    with the run they summarize

use chrono::NaiveDate;
use proptest::prelude::*;
use vwaplab_core::domain::BarSeries;
use vwaplab_core::strategy::{DistanceParams, Policy};
use vwaplab_core::SimulationConfig;
use vwaplab_runner::data_loader::{compute_dataset_hash, generate_synthetic_bars};
use vwaplab_runner::metrics::{cagr, max_drawdown, total_return};
use vwaplab_runner::run_backtest_from_series;

fn arb_equity_curve() -> impl Strategy<Value = Vec<f64>> {
    (
        1_000.0..1_000_000.0_f64,
        prop::collection::vec(-0.2..0.2_f64, 1..300),
    )
        .prop_map(|(start, returns)| {
            let mut curve = Vec::with_capacity(returns.len() + 1);
            curve.push(start);
            for r in returns {
                let last = curve[curve.len() - 1];
                curve.push(last * (1.0 + r));
            }
            curve
        })
}

fn rel_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

// ── 1. Curve-level bounds ────────────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_is_a_fraction_of_the_peak(curve in arb_equity_curve()) {
        let dd = max_drawdown(&curve);
        prop_assert!(dd <= 0.0);
        prop_assert!(dd >= -1.0);
    }

    #[test]
    fn total_return_matches_endpoints(curve in arb_equity_curve()) {
        let first = curve[0];
        let last = curve[curve.len() - 1];
        prop_assert!(rel_close(total_return(&curve) * first, last - first));
    }

    #[test]
    fn cagr_shares_the_sign_of_total_return(curve in arb_equity_curve()) {
        let bars = curve.len() - 1;
        prop_assume!(bars >= 2);
        let tr = total_return(&curve);
        let c = cagr(&curve, bars);
        if tr > 0.0 {
            prop_assert!(c >= 0.0);
        } else if tr < 0.0 {
            prop_assert!(c <= 0.0);
        }
    }
}

// ── 2. Run-level consistency ─────────────────────────────────────────

fn arb_config() -> impl Strategy<Value = SimulationConfig> {
    (
        1_000.0..50_000.0_f64,
        1usize..40,
        0.0..0.08_f64,
        0.0..0.08_f64,
        100.0..20_000.0_f64,
    )
        .prop_map(|(cash, period, buy, sell, notional)| SimulationConfig {
            starting_cash: cash,
            vwap_period: period,
            policy: Policy::DistanceThreshold(DistanceParams {
                buy_threshold: buy,
                sell_threshold: sell,
                fixed_notional: notional,
            }),
            ..SimulationConfig::mean_reversion()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn metrics_agree_with_the_run(seed in 0u64..1_000, config in arb_config()) {
        let bars = generate_synthetic_bars(
            seed,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        );
        let series = BarSeries::new(bars).unwrap();
        let hash = compute_dataset_hash(&series);
        let result = run_backtest_from_series("SYN", &config, &series, &hash, true).unwrap();
        let m = &result.metrics;
        let run = &result.run;

        prop_assert!((0.0..=1.0).contains(&m.exposure));
        prop_assert!((0.0..=1.0).contains(&m.win_rate));
        prop_assert!(m.max_drawdown <= 0.0);
        prop_assert_eq!(m.trade_count, run.trades.len());
        prop_assert!(rel_close(
            m.total_return * run.starting_cash,
            run.final_equity - run.starting_cash
        ));
    }
}
