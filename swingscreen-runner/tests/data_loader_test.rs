//! CSV layout loading against a temporary data directory.

use chrono::NaiveDate;
use std::path::Path;
use swingscreen_core::candidate::DiscardReason;
use swingscreen_core::config::{ScreenConfig, Universe};
use swingscreen_core::domain::Timeframe;
use swingscreen_runner::data_loader::{
    generate_synthetic, load_universe, read_candles, series_path, write_candles, DataSource,
    LoadError, LoadOptions,
};
use swingscreen_runner::pipeline::{run_screen, PipelineOptions};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

fn universe() -> Universe {
    Universe {
        benchmark: "NIFTY50".into(),
        symbols: vec!["TCS".into(), "INFY".into(), "GHOST".into()],
    }
}

/// Write synthetic candles for the benchmark, TCS and INFY. GHOST gets none.
fn seed_dir(dir: &Path) {
    let opts = LoadOptions::synthetic(as_of());
    for symbol in ["NIFTY50", "TCS", "INFY"] {
        let data = generate_synthetic(symbol, &opts);
        for tf in Timeframe::ALL {
            write_candles(&series_path(dir, symbol, tf), data.series(tf)).unwrap();
        }
    }
}

#[test]
fn csv_round_trip_preserves_candles() {
    let dir = tempfile::tempdir().unwrap();
    let data = generate_synthetic("TCS", &LoadOptions::synthetic(as_of()));
    let path = series_path(dir.path(), "TCS", Timeframe::Intraday);
    write_candles(&path, &data.intraday).unwrap();

    assert!(path.ends_with("TCS/intraday.csv"));
    assert_eq!(read_candles(&path).unwrap(), data.intraday);
}

#[test]
fn loads_universe_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    seed_dir(dir.path());

    let loaded = load_universe(&universe(), &LoadOptions::from_dir(dir.path(), as_of())).unwrap();
    assert!(!loaded.has_synthetic);
    assert_eq!(loaded.symbols.len(), 3);
    assert_eq!(loaded.sources["TCS"], DataSource::Csv);
    assert_eq!(loaded.as_of(), Some(as_of()));

    let tcs = &loaded.symbols[0];
    assert_eq!(tcs.symbol, "TCS");
    assert_eq!(tcs, &generate_synthetic("TCS", &LoadOptions::synthetic(as_of())));

    let ghost = &loaded.symbols[2];
    assert!(ghost.daily.is_empty());
    assert!(ghost.intraday.is_empty());
}

#[test]
fn dataset_hash_ignores_universe_order() {
    let dir = tempfile::tempdir().unwrap();
    seed_dir(dir.path());
    let opts = LoadOptions::from_dir(dir.path(), as_of());

    let forward = load_universe(&universe(), &opts).unwrap();
    let mut reversed = universe();
    reversed.symbols.reverse();
    let backward = load_universe(&reversed, &opts).unwrap();
    assert_eq!(forward.dataset_hash, backward.dataset_hash);
    assert_eq!(forward.dataset_hash.len(), 64);
}

#[test]
fn symbol_without_files_is_a_missing_timeframe() {
    let dir = tempfile::tempdir().unwrap();
    seed_dir(dir.path());
    let mut config = ScreenConfig::default();
    config.universe = universe();

    let loaded = load_universe(&config.universe, &LoadOptions::from_dir(dir.path(), as_of())).unwrap();
    let report = run_screen(&loaded, &config, &PipelineOptions::default()).unwrap();

    let ghost = report
        .candidates
        .iter()
        .find(|c| c.symbol == "GHOST")
        .unwrap();
    assert_eq!(
        ghost.discard_reason(),
        Some(&DiscardReason::MissingTimeframe {
            stage: Timeframe::Daily
        })
    );
    assert!(!report.selected.iter().any(|c| c.symbol == "GHOST"));
}

#[test]
fn missing_benchmark_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_universe(&universe(), &LoadOptions::from_dir(dir.path(), as_of())).unwrap_err();
    match err {
        LoadError::Benchmark { symbol, .. } => assert_eq!(symbol, "NIFTY50"),
        other => panic!("expected benchmark error, got {other}"),
    }
}

#[test]
fn corrupt_symbol_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    seed_dir(dir.path());
    std::fs::write(
        series_path(dir.path(), "INFY", Timeframe::Daily),
        "timestamp,open,high,low,close,volume\nnot-a-date,1,2,0.5,1.5,10\n",
    )
    .unwrap();

    let loaded = load_universe(&universe(), &LoadOptions::from_dir(dir.path(), as_of())).unwrap();
    let infy = &loaded.symbols[1];
    assert!(infy.daily.is_empty());
    assert!(!infy.weekly.is_empty());
}
