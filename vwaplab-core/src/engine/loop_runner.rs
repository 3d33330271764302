//! Bar-by-bar simulation loop — the heart of the engine.
//!
//! Per bar, in order:
//! 1. Validate the bar against the previous one (date order, volume)
//! 2. Advance every VWAP window and read this bar's values
//! 3. Ask the policy for a decision
//! 4. Apply it to the ledger at the close and record equity
//!
//! No I/O, no clock, no randomness: identical inputs give identical outputs.

use tracing::{info, trace};

use crate::config::SimulationConfig;
use crate::domain::bar::validate_bar;
use crate::domain::{Bar, BarError, BarSeries, Fill};
use crate::indicators::{Vwap, VwapReading};
use crate::strategy::{BarContext, Decision};

use super::ledger::Ledger;
use super::state::{EquityPoint, IndicatorPoint, RunResult};
use super::trade_extraction::extract_trades;
use super::SimulationError;

/// What happened on one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarStep {
    pub vwap: VwapReading,
    pub decision: Decision,
    pub fill: Option<Fill>,
    pub equity: EquityPoint,
}

/// Incremental simulation: owns the indicator windows and the ledger for one run.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    vwap: Vwap,
    reference_vwap: Option<Vwap>,
    ledger: Ledger,
    previous: Option<Bar>,
    bar_index: usize,
    equity_curve: Vec<EquityPoint>,
    fills: Vec<Fill>,
    indicators: Vec<IndicatorPoint>,
}

impl Simulation {
    /// Validate `config` and set up a fresh run.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let vwap = Vwap::new(config.vwap_period, config.warmup)?;
        let reference_vwap = config
            .reference_vwap_period
            .map(|period| Vwap::new(period, config.warmup))
            .transpose()?;
        let ledger = Ledger::new(config.starting_cash);

        Ok(Self {
            config,
            vwap,
            reference_vwap,
            ledger,
            previous: None,
            bar_index: 0,
            equity_curve: Vec::new(),
            fills: Vec::new(),
            indicators: Vec::new(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn bars_processed(&self) -> usize {
        self.bar_index
    }

    /// Process the next bar. Any error invalidates the whole run.
    pub fn step(&mut self, bar: &Bar) -> Result<BarStep, SimulationError> {
        let t = self.bar_index;
        if let Some(limit) = self.config.max_bars {
            if t >= limit {
                return Err(SimulationError::BarLimitExceeded { limit });
            }
        }
        self.check_bar(t, bar)?;

        let vwap = self.vwap.update(bar);
        let reference_vwap = self.reference_vwap.as_mut().map(|v| v.update(bar));
        trace!(bar = t, date = %bar.date, close = bar.close, ?vwap, "indicators");

        let decision = self.config.policy.decide(&BarContext {
            bar_index: t,
            bar,
            previous: self.previous.as_ref(),
            vwap,
            position: self.ledger.position(),
            cash: self.ledger.cash(),
        });

        let applied = self
            .ledger
            .apply(&decision, t, bar)
            .map_err(|source| SimulationError::Ledger {
                bar_index: t,
                date: bar.date,
                source,
            })?;

        if let Some(fill) = &applied.fill {
            self.fills.push(fill.clone());
        }
        self.equity_curve.push(applied.equity.clone());
        self.indicators.push(IndicatorPoint {
            date: bar.date,
            close: bar.close,
            vwap,
            reference_vwap,
        });
        self.previous = Some(bar.clone());
        self.bar_index += 1;

        Ok(BarStep {
            vwap,
            decision,
            fill: applied.fill,
            equity: applied.equity,
        })
    }

    /// Close out the run and assemble the result.
    pub fn finish(self) -> RunResult {
        let last_close = self.previous.as_ref().map_or(0.0, |b| b.close);
        let final_equity = self.ledger.equity(last_close);
        let trades = extract_trades(&self.fills);

        info!(
            bars = self.bar_index,
            fills = self.fills.len(),
            trades = trades.len(),
            ending_cash = self.ledger.cash(),
            ending_equity = final_equity,
            "simulation finished"
        );

        RunResult {
            starting_cash: self.config.starting_cash,
            final_cash: self.ledger.cash(),
            final_equity,
            open_position: self.ledger.position().cloned(),
            equity_curve: self.equity_curve,
            fills: self.fills,
            trades,
            indicators: self.indicators,
            bar_count: self.bar_index,
        }
    }

    fn check_bar(&self, index: usize, bar: &Bar) -> Result<(), BarError> {
        if let Some(prev) = &self.previous {
            if bar.date <= prev.date {
                return Err(BarError::NonIncreasingDate {
                    index,
                    previous: prev.date,
                    current: bar.date,
                });
            }
        }
        validate_bar(index, bar)
    }
}

/// Run a complete simulation over a validated series.
pub fn run_simulation(
    series: &BarSeries,
    config: &SimulationConfig,
) -> Result<RunResult, SimulationError> {
    let mut sim = Simulation::new(config.clone())?;
    if let Some(limit) = config.max_bars {
        if series.len() > limit {
            return Err(SimulationError::BarLimitExceeded { limit });
        }
    }

    info!(
        policy = config.policy.name(),
        starting_cash = config.starting_cash,
        vwap_period = config.vwap_period,
        bars = series.len(),
        "simulation started"
    );

    for bar in series {
        sim.step(bar)?;
    }
    Ok(sim.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ledger::LedgerError;
    use crate::indicators::WarmupPolicy;
    use crate::strategy::{DistanceParams, Policy};
    use chrono::NaiveDate;

    fn bar(i: i64, close: f64, volume: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    fn distance_config(cash: f64) -> SimulationConfig {
        SimulationConfig {
            starting_cash: cash,
            vwap_period: 5,
            reference_vwap_period: None,
            warmup: WarmupPolicy::Partial,
            policy: Policy::DistanceThreshold(DistanceParams {
                buy_threshold: 0.05,
                sell_threshold: 0.04,
                fixed_notional: 1_000.0,
            }),
            max_bars: None,
        }
    }

    #[test]
    fn invalid_config_rejected_before_any_bar() {
        let mut config = distance_config(10_000.0);
        config.vwap_period = 0;
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Config(_))
        ));
    }

    #[test]
    fn step_rejects_out_of_order_bar() {
        let mut sim = Simulation::new(distance_config(10_000.0)).unwrap();
        sim.step(&bar(1, 100.0, 10.0)).unwrap();
        let err = sim.step(&bar(0, 100.0, 10.0)).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Bar(BarError::NonIncreasingDate { index: 1, .. })
        ));
    }

    #[test]
    fn step_rejects_negative_volume() {
        let mut sim = Simulation::new(distance_config(10_000.0)).unwrap();
        let err = sim.step(&bar(0, 100.0, -5.0)).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Bar(BarError::NegativeVolume { .. })
        ));
    }

    #[test]
    fn one_equity_point_per_bar() {
        let bars: Vec<Bar> = (0..10).map(|i| bar(i, 100.0, 10.0)).collect();
        let series = BarSeries::new(bars).unwrap();
        let result = run_simulation(&series, &distance_config(10_000.0)).unwrap();
        assert_eq!(result.equity_curve.len(), 10);
        assert_eq!(result.indicators.len(), 10);
        assert_eq!(result.bar_count, 10);
        assert!(result.fills.is_empty());
        assert_eq!(result.final_equity, 10_000.0);
    }

    #[test]
    fn empty_series_yields_starting_figures() {
        let series = BarSeries::new(Vec::new()).unwrap();
        let result = run_simulation(&series, &distance_config(500.0)).unwrap();
        assert_eq!(result.final_cash, 500.0);
        assert_eq!(result.final_equity, 500.0);
        assert!(result.equity_curve.is_empty());
    }

    #[test]
    fn bar_limit_is_enforced() {
        let bars: Vec<Bar> = (0..5).map(|i| bar(i, 100.0, 10.0)).collect();
        let series = BarSeries::new(bars).unwrap();
        let mut config = distance_config(10_000.0);
        config.max_bars = Some(3);
        assert_eq!(
            run_simulation(&series, &config),
            Err(SimulationError::BarLimitExceeded { limit: 3 })
        );
    }

    #[test]
    fn step_reports_decision_and_fill() {
        let mut sim = Simulation::new(distance_config(10_000.0)).unwrap();
        for i in 0..4 {
            sim.step(&bar(i, 100.0, 10.0)).unwrap();
        }
        // Window [100×4, 80] → vwap 96, distance ≈ -16.7%
        let step = sim.step(&bar(4, 80.0, 10.0)).unwrap();
        assert_eq!(step.decision, Decision::Enter { quantity: 12.5 });
        assert!(step.fill.is_some());
        assert_eq!(sim.ledger().cash(), 9_000.0);
        assert_eq!(step.equity.equity, 10_000.0);
    }

    #[test]
    fn ledger_failure_is_tagged_with_bar() {
        let err = SimulationError::Ledger {
            bar_index: 7,
            date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            source: LedgerError::NoPosition,
        };
        assert!(err.to_string().contains("bar 7"));
    }
}
