//! VwapLab CLI — run and sweep commands.
//!
//! Commands:
//! - `run` — execute a simulation from a TOML config file or named preset
//! - `sweep` — grid-search the distance-threshold policy over one series
//!
//! Logs go to stderr (`RUST_LOG` overrides the default filter); reports go to stdout.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use vwaplab_core::SimulationConfig;
use vwaplab_runner::export::save_artifacts;
use vwaplab_runner::{
    load_bars, run_loaded, BacktestConfig, BacktestResult, ParamGrid, ParamSweep,
};

#[derive(Parser)]
#[command(
    name = "vwaplab",
    version,
    about = "VwapLab CLI — bar-by-bar VWAP strategy simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a simulation from a TOML config file or named preset.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset: mean_reversion, turnaround_tuesday.
        #[arg(long)]
        preset: Option<String>,

        /// CSV bars for --preset (date,open,high,low,close,volume). Synthetic if omitted.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Symbol label (with --preset).
        #[arg(long, default_value = "SPY")]
        symbol: String,

        /// Seed for synthetic data (with --preset).
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only; write no artifacts.
        #[arg(long, default_value_t = false)]
        no_artifacts: bool,
    },
    /// Grid-search VWAP period × buy threshold × sell threshold.
    Sweep {
        /// Path to a TOML config file (bar source and base settings).
        #[arg(long)]
        config: PathBuf,

        /// VWAP periods, comma-separated.
        #[arg(long, value_delimiter = ',', default_value = "10,14,20")]
        periods: Vec<usize>,

        /// Buy thresholds (fraction below VWAP), comma-separated.
        #[arg(long, value_delimiter = ',', default_value = "0.03,0.05,0.07")]
        buy_thresholds: Vec<f64>,

        /// Sell thresholds (fraction above VWAP), comma-separated.
        #[arg(long, value_delimiter = ',', default_value = "0.02,0.04,0.06")]
        sell_thresholds: Vec<f64>,

        /// Number of ranked results to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Run grid points one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,vwaplab_runner=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            preset,
            data,
            symbol,
            seed,
            output_dir,
            no_artifacts,
        } => {
            let config = resolve_config(config, preset, data, &symbol, seed)?;
            run_cmd(&config, (!no_artifacts).then_some(output_dir))
        }
        Commands::Sweep {
            config,
            periods,
            buy_thresholds,
            sell_thresholds,
            top,
            sequential,
        } => {
            let config = BacktestConfig::from_file(&config)?;
            let grid = ParamGrid {
                vwap_periods: periods,
                buy_thresholds,
                sell_thresholds,
            };
            sweep_cmd(&config, &grid, top, !sequential)
        }
    }
}

fn resolve_config(
    config_path: Option<PathBuf>,
    preset_name: Option<String>,
    data: Option<PathBuf>,
    symbol: &str,
    seed: u64,
) -> Result<BacktestConfig> {
    match (config_path, preset_name) {
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (None, None) => bail!("one of --config or --preset is required"),
        (Some(path), None) => Ok(BacktestConfig::from_file(&path)?),
        (None, Some(name)) => {
            let simulation = match name.as_str() {
                "mean_reversion" => SimulationConfig::mean_reversion(),
                "turnaround_tuesday" => SimulationConfig::turnaround_tuesday(),
                _ => bail!("unknown preset '{name}'. Valid: mean_reversion, turnaround_tuesday"),
            };
            let mut config = BacktestConfig::synthetic(symbol, simulation);
            config.backtest.seed = seed;
            if let Some(path) = data {
                config.backtest.data_path = Some(path);
                config.backtest.synthetic = false;
            }
            config.validate()?;
            Ok(config)
        }
    }
}

fn run_cmd(config: &BacktestConfig, output_dir: Option<PathBuf>) -> Result<()> {
    let loaded = load_bars(&config.backtest)?;
    let result = run_loaded(config, &loaded)?;

    print_summary(&result);

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn sweep_cmd(config: &BacktestConfig, grid: &ParamGrid, top: usize, parallel: bool) -> Result<()> {
    if grid.size() == 0 {
        bail!("empty grid: give at least one period, buy threshold and sell threshold");
    }
    let loaded = load_bars(&config.backtest)?;
    let results = ParamSweep::new()
        .with_parallelism(parallel)
        .sweep(
            grid,
            &config.simulation,
            &config.backtest.symbol,
            &loaded.series,
            &loaded.dataset_hash,
            loaded.is_synthetic(),
        )
        .context("sweep failed")?;
    info!(points = results.len(), "sweep complete");

    println!();
    println!("=== Sweep: {} points on {} ===", results.len(), config.backtest.symbol);
    println!(
        "{:>4}  {:>6}  {:>6}  {:>6}  {:>9}  {:>9}  {:>6}",
        "rank", "period", "buy", "sell", "return", "max dd", "trades"
    );
    for (rank, r) in results.top_n(top).into_iter().enumerate() {
        let (buy, sell) = match &r.config.policy {
            vwaplab_core::Policy::DistanceThreshold(p) => (p.buy_threshold, p.sell_threshold),
            vwaplab_core::Policy::WeekdayReversal(p) => (f64::NAN, p.sell_threshold),
        };
        println!(
            "{:>4}  {:>6}  {:>6.3}  {:>6.3}  {:>8.2}%  {:>8.2}%  {:>6}",
            rank + 1,
            r.config.vwap_period,
            buy,
            sell,
            r.metrics.total_return * 100.0,
            r.metrics.max_drawdown * 100.0,
            r.metrics.trade_count
        );
    }
    if loaded.is_synthetic() {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let run = &result.run;
    let m = &result.metrics;

    println!();
    println!("=== Simulation Result ===");
    println!("Symbol:         {}", result.symbol);
    println!(
        "Period:         {} to {}",
        result.start_date, result.end_date
    );
    println!("Policy:         {}", result.config.policy.name());
    println!("Bars:           {}", run.bar_count);
    println!();
    println!("--- Ledger ---");
    println!("Starting Cash:  {:.2}", run.starting_cash);
    println!("Ending Cash:    {:.2}", run.final_cash);
    println!("Ending Equity:  {:.2}", run.final_equity);
    if let Some(pos) = &run.open_position {
        println!(
            "Open Position:  {:.4} @ {:.2} since {}",
            pos.quantity, pos.entry_price, pos.entry_date
        );
        if let Some(last) = run.indicators.last() {
            println!("Unrealized PnL: {:.2}", pos.unrealized_pnl(last.close));
        }
    }
    println!();
    println!("--- Performance ---");
    println!("Total Return:   {:.2}%", m.total_return * 100.0);
    println!("CAGR:           {:.2}%", m.cagr * 100.0);
    println!("Sharpe:         {:.3}", m.sharpe);
    println!("Max Drawdown:   {:.2}%", m.max_drawdown * 100.0);
    println!("Trades:         {}", m.trade_count);
    println!("Win Rate:       {:.1}%", m.win_rate * 100.0);
    println!("Profit Factor:  {:.2}", m.profit_factor);
    println!("Exposure:       {:.1}%", m.exposure * 100.0);
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
