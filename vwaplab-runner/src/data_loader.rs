//! Bar loading for the runner.
//!
//! Two sources:
//! 1. A normalized CSV file (`date,open,high,low,close,volume`, ISO dates)
//! 2. A seeded synthetic random walk over weekdays (tagged as synthetic)
//!
//! Rows are sorted by date before validation; duplicate dates, negative
//! volume and non-finite values are rejected by `BarSeries::new`.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use vwaplab_core::domain::{Bar, BarError, BarSeries};

use crate::config::BacktestSection;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path} contains no bars")]
    Empty { path: PathBuf },
    #[error("bar validation failed: {0}")]
    Bar(#[from] BarError),
    #[error("no bar source configured")]
    NoSource,
}

/// Where the bars came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Csv(PathBuf),
    Synthetic { seed: u64 },
}

/// A validated series with provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub series: BarSeries,
    pub source: DataSource,
    /// BLAKE3 over every bar's date and OHLCV values.
    pub dataset_hash: String,
}

impl LoadedData {
    pub fn is_synthetic(&self) -> bool {
        matches!(self.source, DataSource::Synthetic { .. })
    }

    fn new(series: BarSeries, source: DataSource) -> Self {
        let dataset_hash = compute_dataset_hash(&series);
        Self {
            series,
            source,
            dataset_hash,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load bars as described by the `[backtest]` section.
pub fn load_bars(section: &BacktestSection) -> Result<LoadedData, LoadError> {
    if let Some(path) = &section.data_path {
        return load_csv(path);
    }
    if section.synthetic {
        warn!(
            symbol = %section.symbol,
            "generating synthetic data; results are tagged as synthetic"
        );
        let bars = generate_synthetic_bars(section.seed, section.start_date, section.end_date);
        let series = BarSeries::new(bars)?;
        return Ok(LoadedData::new(
            series,
            DataSource::Synthetic { seed: section.seed },
        ));
    }
    Err(LoadError::NoSource)
}

/// Read a normalized CSV file into a validated series.
pub fn load_csv(path: &Path) -> Result<LoadedData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = parse_csv(file, path)?;
    info!(path = %path.display(), bars = series.len(), "loaded bars");
    Ok(LoadedData::new(series, DataSource::Csv(path.to_path_buf())))
}

fn parse_csv<R: std::io::Read>(reader: R, path: &Path) -> Result<BarSeries, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        let row = row.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        bars.push(Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    if bars.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(BarSeries::new(bars)?)
}

/// Compute a deterministic BLAKE3 hash over all bar data.
pub fn compute_dataset_hash(series: &BarSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in series {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Seeded random walk from 100.0 over weekdays in `[start, end]`.
pub fn generate_synthetic_bars(seed: u64, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    let seed_bytes = blake3::hash(&seed.to_le_bytes());
    let mut rng = StdRng::from_seed(*seed_bytes.as_bytes());

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
