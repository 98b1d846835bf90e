//! Candle loading for a screen run.
//!
//! Candles come from one of two sources:
//! 1. CSV files laid out as `<data_dir>/<SYMBOL>/{daily,weekly,intraday}.csv`
//! 2. A seeded random-walk generator (`--synthetic`), for offline runs
//!
//! A missing or unreadable benchmark is fatal. Problems with an individual
//! symbol are logged and leave that timeframe empty, which the cascade then
//! reports as a missing timeframe for the symbol.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use swingscreen_core::candidate::SymbolData;
use swingscreen_core::config::Universe;
use swingscreen_core::domain::{Candle, Symbol, Timeframe};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data source: pass a data directory or enable synthetic data")]
    NoSource,

    #[error("benchmark '{symbol}' unavailable: {reason}")]
    Benchmark { symbol: String, reason: String },

    #[error("read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} row {row}: unrecognised timestamp '{value}'")]
    Timestamp {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a symbol's candles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// Options controlling how candles are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Root of the CSV layout.
    pub data_dir: Option<PathBuf>,
    /// Generate random-walk candles instead of reading files.
    pub synthetic: bool,
    /// Last session of synthetic data.
    pub as_of: NaiveDate,
    /// Daily candles per synthetic symbol.
    pub synthetic_days: usize,
    /// Intraday sessions per synthetic symbol.
    pub synthetic_sessions: usize,
}

impl LoadOptions {
    pub fn from_dir(data_dir: impl Into<PathBuf>, as_of: NaiveDate) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            synthetic: false,
            as_of,
            synthetic_days: 320,
            synthetic_sessions: 3,
        }
    }

    pub fn synthetic(as_of: NaiveDate) -> Self {
        Self {
            data_dir: None,
            synthetic: true,
            ..Self::from_dir(PathBuf::new(), as_of)
        }
    }
}

/// Candles for the benchmark and every symbol in the universe.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub benchmark: SymbolData,
    /// In universe order.
    pub symbols: Vec<SymbolData>,
    pub sources: BTreeMap<Symbol, DataSource>,
    /// BLAKE3 over every candle, in sorted symbol order.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

impl LoadedData {
    /// Date of the benchmark's latest daily candle.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.benchmark.daily.last().map(|c| c.date())
    }
}

/// Load the benchmark and every universe symbol.
pub fn load_universe(universe: &Universe, opts: &LoadOptions) -> Result<LoadedData, LoadError> {
    if opts.synthetic {
        return Ok(load_synthetic(universe, opts));
    }
    let dir = opts.data_dir.as_deref().ok_or(LoadError::NoSource)?;

    let benchmark_daily = read_candles(&series_path(dir, &universe.benchmark, Timeframe::Daily))
        .map_err(|e| LoadError::Benchmark {
            symbol: universe.benchmark.clone(),
            reason: e.to_string(),
        })?;
    if benchmark_daily.is_empty() {
        return Err(LoadError::Benchmark {
            symbol: universe.benchmark.clone(),
            reason: "no daily candles".into(),
        });
    }
    let mut benchmark = SymbolData::new(universe.benchmark.clone(), benchmark_daily);
    benchmark.intraday = read_optional(dir, &universe.benchmark, Timeframe::Intraday);

    let mut sources = BTreeMap::new();
    let symbols: Vec<SymbolData> = universe
        .symbols
        .iter()
        .map(|symbol| {
            sources.insert(symbol.clone(), DataSource::Csv);
            SymbolData::new(symbol.clone(), read_optional(dir, symbol, Timeframe::Daily))
                .with_weekly(read_optional(dir, symbol, Timeframe::Weekly))
                .with_intraday(read_optional(dir, symbol, Timeframe::Intraday))
        })
        .collect();

    let dataset_hash = compute_dataset_hash(&benchmark, &symbols);
    info!(
        symbols = symbols.len(),
        benchmark = %universe.benchmark,
        dataset_hash = %&dataset_hash[..12],
        "loaded candles from {}",
        dir.display()
    );

    Ok(LoadedData {
        benchmark,
        symbols,
        sources,
        dataset_hash,
        has_synthetic: false,
    })
}

pub fn series_path(dir: &Path, symbol: &str, timeframe: Timeframe) -> PathBuf {
    dir.join(symbol).join(format!("{timeframe}.csv"))
}

/// Read one symbol's series; absence or a bad file leaves it empty.
fn read_optional(dir: &Path, symbol: &str, timeframe: Timeframe) -> Vec<Candle> {
    let path = series_path(dir, symbol, timeframe);
    if !path.exists() {
        debug!(symbol, %timeframe, "no {} file", path.display());
        return Vec::new();
    }
    match read_candles(&path) {
        Ok(candles) => candles,
        Err(e) => {
            warn!(symbol, %timeframe, error = %e, "skipping unreadable series");
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` or the `T`-separated form.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Read a `timestamp,open,high,low,close,volume` CSV file.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let mut candles = Vec::new();
    for (row, record) in reader.deserialize::<CsvRow>().enumerate() {
        let record = record.map_err(csv_err)?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            path: path.to_path_buf(),
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        candles.push(Candle::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }
    Ok(candles)
}

/// Write candles in the layout [`read_candles`] accepts.
pub fn write_candles(path: &Path, candles: &[Candle]) -> Result<(), LoadError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LoadError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for c in candles {
        writer
            .serialize(CsvRow {
                timestamp: c.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.volume,
            })
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| LoadError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Deterministic BLAKE3 hash over every candle.
///
/// Symbols are hashed in sorted order so the hash does not depend on the
/// universe ordering.
fn compute_dataset_hash(benchmark: &SymbolData, symbols: &[SymbolData]) -> String {
    let mut hasher = blake3::Hasher::new();
    let mut all: Vec<&SymbolData> = symbols.iter().chain(std::iter::once(benchmark)).collect();
    all.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    for data in all {
        hasher.update(data.symbol.as_bytes());
        for timeframe in Timeframe::ALL {
            hasher.update(timeframe.as_str().as_bytes());
            for c in data.series(timeframe) {
                hasher.update(&c.timestamp.and_utc().timestamp().to_le_bytes());
                hasher.update(&c.open.to_le_bytes());
                hasher.update(&c.high.to_le_bytes());
                hasher.update(&c.low.to_le_bytes());
                hasher.update(&c.close.to_le_bytes());
                hasher.update(&c.volume.to_le_bytes());
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}

// ── Synthetic data ───────────────────────────────────────────────────

fn load_synthetic(universe: &Universe, opts: &LoadOptions) -> LoadedData {
    warn!("generating synthetic candles; results are not market data");

    let benchmark = generate_synthetic(&universe.benchmark, opts);
    let mut sources = BTreeMap::new();
    let symbols: Vec<SymbolData> = universe
        .symbols
        .iter()
        .map(|symbol| {
            sources.insert(symbol.clone(), DataSource::Synthetic);
            generate_synthetic(symbol, opts)
        })
        .collect();
    let dataset_hash = compute_dataset_hash(&benchmark, &symbols);

    LoadedData {
        benchmark,
        symbols,
        sources,
        dataset_hash,
        has_synthetic: true,
    }
}

/// Random-walk candles for one symbol, seeded from the symbol name.
///
/// Daily candles end at `opts.as_of` (weekdays only), weekly candles are
/// aggregated from them, and intraday 15-minute candles cover the last
/// `synthetic_sessions` sessions from 09:15.
pub fn generate_synthetic(symbol: &str, opts: &LoadOptions) -> SymbolData {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let dates = trading_days_ending(opts.as_of, opts.synthetic_days);
    let drift: f64 = rng.gen_range(-0.001..0.002);
    let mut price: f64 = rng.gen_range(200.0..3000.0);

    let daily: Vec<Candle> = dates
        .iter()
        .map(|&date| {
            let open = price;
            let close = (price * (1.0 + drift + rng.gen_range(-0.02..0.02))).max(1.0);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            price = close;
            Candle::on_date(date, open, high, low, close, rng.gen_range(500_000..5_000_000u64))
        })
        .collect();

    let sessions = dates.len().min(opts.synthetic_sessions);
    let mut intraday = Vec::with_capacity(sessions * 25);
    for (date, day) in dates[dates.len() - sessions..]
        .iter()
        .zip(&daily[daily.len() - sessions..])
    {
        let mut px = day.open;
        let start = date.and_time(NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN));
        for slot in 0..25 {
            let open = px;
            let close = (px * (1.0 + drift / 5.0 + rng.gen_range(-0.004..0.004))).max(1.0);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.002));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.002));
            intraday.push(Candle::new(
                start + Duration::minutes(15 * slot),
                open,
                high,
                low,
                close,
                rng.gen_range(20_000..200_000u64),
            ));
            px = close;
        }
    }

    SymbolData::new(symbol, daily.clone())
        .with_weekly(aggregate_weekly(&daily))
        .with_intraday(intraday)
}

/// The last `count` weekdays up to and including `end`, oldest first.
fn trading_days_ending(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = end;
    while days.len() < count {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        current -= Duration::days(1);
    }
    days.reverse();
    days
}

/// Roll daily candles up into ISO-week candles stamped with the week's
/// first session.
pub fn aggregate_weekly(daily: &[Candle]) -> Vec<Candle> {
    let mut weeks: Vec<Candle> = Vec::new();
    let mut current_week = None;
    for c in daily {
        let week = c.date().iso_week();
        let key = (week.year(), week.week());
        match weeks.last_mut() {
            Some(w) if current_week == Some(key) => {
                w.high = w.high.max(c.high);
                w.low = w.low.min(c.low);
                w.close = c.close;
                w.volume += c.volume;
            }
            _ => {
                weeks.push(*c);
                current_week = Some(key);
            }
        }
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    #[test]
    fn timestamp_formats() {
        let day = parse_timestamp("2024-06-14").unwrap();
        assert_eq!(day.time(), NaiveTime::MIN);
        let minute = parse_timestamp("2024-06-14 09:30").unwrap();
        assert_eq!(minute.time(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_timestamp("2024-06-14T09:30:00").is_some());
        assert!(parse_timestamp("14/06/2024").is_none());
    }

    #[test]
    fn synthetic_data_is_deterministic() {
        let opts = LoadOptions::synthetic(as_of());
        let a = generate_synthetic("RELIANCE", &opts);
        let b = generate_synthetic("RELIANCE", &opts);
        assert_eq!(a, b);
    }

    #[test]
    fn different_symbols_get_different_synthetic_data() {
        let opts = LoadOptions::synthetic(as_of());
        let a = generate_synthetic("TCS", &opts);
        let b = generate_synthetic("INFY", &opts);
        assert_eq!(a.daily.len(), b.daily.len());
        assert_ne!(a.daily[0].close, b.daily[0].close);
    }

    #[test]
    fn synthetic_series_shape() {
        let opts = LoadOptions::synthetic(as_of());
        let data = generate_synthetic("SBIN", &opts);
        assert_eq!(data.daily.len(), 320);
        assert_eq!(data.daily.last().unwrap().date(), as_of());
        assert_eq!(data.intraday.len(), 3 * 25);
        assert!(data.weekly.len() >= 320 / 5);
        for tf in Timeframe::ALL {
            swingscreen_core::domain::validate_series(data.series(tf)).unwrap();
        }
    }

    #[test]
    fn weekly_aggregation() {
        // Mon..Fri of one week then Monday of the next
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let daily: Vec<Candle> = (0..8)
            .filter_map(|i| {
                let d = monday + Duration::days(i);
                (!matches!(d.weekday(), Weekday::Sat | Weekday::Sun)).then(|| {
                    Candle::on_date(d, 100.0 + i as f64, 105.0 + i as f64, 95.0, 101.0 + i as f64, 10)
                })
            })
            .collect();
        let weekly = aggregate_weekly(&daily);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].open, 100.0);
        assert_eq!(weekly[0].close, 105.0);
        assert_eq!(weekly[0].high, 109.0);
        assert_eq!(weekly[0].volume, 50);
        assert_eq!(weekly[1].date(), monday + Duration::days(7));
    }

    #[test]
    fn missing_source_is_an_error() {
        let opts = LoadOptions {
            data_dir: None,
            ..LoadOptions::from_dir("", as_of())
        };
        let err = load_universe(&Universe::nifty50(), &opts).unwrap_err();
        assert!(matches!(err, LoadError::NoSource));
    }
}
