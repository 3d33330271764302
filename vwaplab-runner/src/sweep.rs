//! Parameter sweep over the distance-threshold policy.
//!
//! Every grid point is an isolated simulation over the same shared series,
//! so points run in parallel with no coordination.

use rayon::prelude::*;
use tracing::info;

use vwaplab_core::domain::BarSeries;
use vwaplab_core::strategy::{DistanceParams, Policy};
use vwaplab_core::SimulationConfig;

use crate::runner::{run_backtest_from_series, BacktestResult, RunError};

/// VWAP period × buy threshold × sell threshold grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub vwap_periods: Vec<usize>,
    pub buy_thresholds: Vec<f64>,
    pub sell_thresholds: Vec<f64>,
}

impl ParamGrid {
    /// Periods 10/14/20, buy 3–7%, sell 2–6%.
    pub fn default_grid() -> Self {
        Self {
            vwap_periods: vec![10, 14, 20],
            buy_thresholds: vec![0.03, 0.05, 0.07],
            sell_thresholds: vec![0.02, 0.04, 0.06],
        }
    }

    /// Returns the total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.vwap_periods.len() * self.buy_thresholds.len() * self.sell_thresholds.len()
    }

    /// Expand the grid around `base`, keeping its cash, warm-up and notional.
    ///
    /// A weekday-reversal base is replaced by a distance-threshold policy
    /// with the same notional.
    pub fn generate_configs(&self, base: &SimulationConfig) -> Vec<SimulationConfig> {
        let fixed_notional = base.policy.fixed_notional();
        let mut configs = Vec::with_capacity(self.size());

        for &period in &self.vwap_periods {
            for &buy in &self.buy_thresholds {
                for &sell in &self.sell_thresholds {
                    let mut config = base.clone();
                    config.vwap_period = period;
                    config.policy = Policy::DistanceThreshold(DistanceParams {
                        buy_threshold: buy,
                        sell_threshold: sell,
                        fixed_notional,
                    });
                    configs.push(config);
                }
            }
        }

        configs
    }
}

/// Parameter sweep executor.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every grid point against `series`. Fails on the first invalid point.
    pub fn sweep(
        &self,
        grid: &ParamGrid,
        base: &SimulationConfig,
        symbol: &str,
        series: &BarSeries,
        dataset_hash: &str,
        has_synthetic: bool,
    ) -> Result<SweepResults, RunError> {
        let configs = grid.generate_configs(base);
        info!(points = configs.len(), parallel = self.parallel, "sweep started");

        let run = |config: &SimulationConfig| {
            run_backtest_from_series(symbol, config, series, dataset_hash, has_synthetic)
        };

        let results: Vec<BacktestResult> = if self.parallel {
            configs.par_iter().map(run).collect::<Result<Vec<_>, _>>()?
        } else {
            configs.iter().map(run).collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(results))
    }
}

/// Results from a parameter sweep, in grid order.
#[derive(Debug, Clone)]
pub struct SweepResults {
    results: Vec<BacktestResult>,
}

impl SweepResults {
    fn new(results: Vec<BacktestResult>) -> Self {
        Self { results }
    }

    pub fn all(&self) -> &[BacktestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results sorted by total return (descending). Ties keep grid order.
    pub fn sorted_by_return(&self) -> Vec<&BacktestResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by(|a, b| b.total_return().total_cmp(&a.total_return()));
        sorted
    }

    pub fn top_n(&self, n: usize) -> Vec<&BacktestResult> {
        self.sorted_by_return().into_iter().take(n).collect()
    }

    pub fn best(&self) -> Option<&BacktestResult> {
        self.sorted_by_return().into_iter().next()
    }
}
