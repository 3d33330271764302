//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: equity trajectory, fills, trades and the VWAP trace for charting
//! - **Markdown**: a human-readable single-run report
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;
use vwaplab_core::domain::{Fill, TradeRecord};
use vwaplab_core::engine::{EquityPoint, IndicatorPoint};
use vwaplab_core::indicators::VwapReading;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per bar: bar_index, date, cash, position_value, equity.
pub fn export_equity_csv(points: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "date", "cash", "position_value", "equity"])?;
    for p in points {
        wtr.write_record([
            &p.bar_index.to_string(),
            &p.date.to_string(),
            &format!("{:.2}", p.cash),
            &format!("{:.2}", p.position_value),
            &format!("{:.2}", p.equity),
        ])?;
    }
    finish_csv(wtr)
}

pub fn export_fills_csv(fills: &[Fill]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "date", "side", "price", "quantity", "notional"])?;
    for f in fills {
        wtr.write_record([
            &f.bar_index.to_string(),
            &f.date.to_string(),
            &format!("{:?}", f.side),
            &format!("{:.6}", f.price),
            &format!("{:.6}", f.quantity),
            &format!("{:.2}", f.notional()),
        ])?;
    }
    finish_csv(wtr)
}

pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_bar",
        "entry_date",
        "entry_price",
        "exit_bar",
        "exit_date",
        "exit_price",
        "quantity",
        "pnl",
        "return_pct",
        "bars_held",
    ])?;
    for t in trades {
        wtr.write_record([
            &t.entry_bar.to_string(),
            &t.entry_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit_bar.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.quantity),
            &format!("{:.2}", t.pnl),
            &format!("{:.4}", t.return_pct()),
            &t.bars_held.to_string(),
        ])?;
    }
    finish_csv(wtr)
}

/// Close and VWAP per bar. Warming and undefined readings are left blank.
pub fn export_indicators_csv(points: &[IndicatorPoint]) -> Result<String> {
    fn cell(reading: Option<VwapReading>) -> String {
        reading
            .and_then(VwapReading::value)
            .map(|v| format!("{v:.6}"))
            .unwrap_or_default()
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "close", "vwap", "reference_vwap"])?;
    for p in points {
        wtr.write_record([
            &p.date.to_string(),
            &format!("{:.6}", p.close),
            &cell(Some(p.vwap)),
            &cell(p.reference_vwap),
        ])?;
    }
    finish_csv(wtr)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates `{symbol}_{timestamp}/` under `output_dir` containing
/// `manifest.json`, `equity.csv`, `fills.csv`, `trades.csv`,
/// `indicators.csv` and `report.md`. Returns the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        result.symbol,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("manifest.json", export_json(result)?),
        ("equity.csv", export_equity_csv(&result.run.equity_curve)?),
        ("fills.csv", export_fills_csv(&result.run.fills)?),
        ("trades.csv", export_trades_csv(&result.run.trades)?),
        ("indicators.csv", export_indicators_csv(&result.run.indicators)?),
        ("report.md", generate_report(result)),
    ];
    for (name, contents) in &files {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

pub fn generate_report(result: &BacktestResult) -> String {
    let run = &result.run;
    let m = &result.metrics;
    let mut md = String::with_capacity(1024);

    md.push_str("# Backtest Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", result.symbol));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        result.start_date, result.end_date
    ));
    md.push_str(&format!("| Policy | {} |\n", result.config.policy.name()));
    md.push_str(&format!("| VWAP Period | {} |\n", result.config.vwap_period));
    md.push_str(&format!("| Bars | {} |\n", run.bar_count));
    md.push_str(&format!("| Config Hash | {} |\n", result.config_hash));
    md.push_str(&format!("| Dataset Hash | {} |\n", result.dataset_hash));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Starting Cash | {:.2} |\n", run.starting_cash));
    md.push_str(&format!("| Ending Cash | {:.2} |\n", run.final_cash));
    md.push_str(&format!("| Ending Equity | {:.2} |\n", run.final_equity));
    md.push_str(&format!(
        "| Total Return | {:.2}% |\n",
        m.total_return * 100.0
    ));
    md.push_str(&format!("| CAGR | {:.2}% |\n", m.cagr * 100.0));
    md.push_str(&format!("| Sharpe | {:.3} |\n", m.sharpe));
    md.push_str(&format!("| Sortino | {:.3} |\n", m.sortino));
    md.push_str(&format!(
        "| Max Drawdown | {:.2}% |\n",
        m.max_drawdown * 100.0
    ));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", m.win_rate * 100.0));
    md.push_str(&format!("| Profit Factor | {:.2} |\n", m.profit_factor));
    md.push_str(&format!("| Trades | {} |\n", m.trade_count));
    md.push_str(&format!("| Exposure | {:.1}% |\n", m.exposure * 100.0));
    if let Some(pos) = &run.open_position {
        md.push_str(&format!(
            "| Open Position | {:.4} @ {:.2} since {} |\n",
            pos.quantity, pos.entry_price, pos.entry_date
        ));
        if let Some(last) = run.indicators.last() {
            md.push_str(&format!(
                "| Unrealized PnL | {:.2} |\n",
                pos.unrealized_pnl(last.close)
            ));
        }
    }
    md.push('\n');

    md
}
