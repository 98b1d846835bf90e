//! End-to-end screen runs over synthetic data.

use chrono::NaiveDate;
use swingscreen_core::cascade::CascadeOptions;
use swingscreen_core::config::{ScreenConfig, Universe};
use swingscreen_runner::data_loader::{load_universe, LoadOptions};
use swingscreen_runner::pipeline::{run_screen, PipelineError, PipelineOptions};
use swingscreen_runner::{DailyResults, Diagnostics};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

fn small_config() -> ScreenConfig {
    let mut config = ScreenConfig::default();
    config.universe = Universe {
        benchmark: "NIFTY50".into(),
        symbols: ["TCS", "INFY", "SBIN", "ITC", "LT", "WIPRO", "TITAN", "NTPC"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };
    config
}

#[test]
fn synthetic_screen_runs_end_to_end() {
    let config = small_config();
    let data = load_universe(&config.universe, &LoadOptions::synthetic(as_of())).unwrap();
    let report = run_screen(&data, &config, &PipelineOptions::default()).unwrap();

    assert_eq!(report.as_of, Some(as_of()));
    assert!(report.has_synthetic);
    assert_eq!(report.candidates.len(), 8);
    assert!(report
        .candidates
        .windows(2)
        .all(|w| w[0].symbol < w[1].symbol));
    assert!(report.selected.len() <= config.selection.max_selections);
    assert!(report.selected.iter().all(|c| c.is_qualified()));

    let f = report.funnel;
    assert_eq!(f.total, 8);
    assert!(f.valid_data >= f.daily_passed);
    assert!(f.daily_passed >= f.weekly_passed);
    assert!(f.weekly_passed >= f.intraday_passed);
    assert!(f.intraday_passed >= f.quality_passed);
    assert!(f.quality_passed >= f.selected);
    assert!(report.market_sentiment.is_some());

    let results = DailyResults::from_report(&report, as_of().and_hms_opt(16, 0, 0).unwrap());
    assert_eq!(results.date, as_of());
    assert_eq!(results.total_selected, report.selected.len());
}

#[test]
fn worker_count_does_not_change_results() {
    let config = small_config();
    let data = load_universe(&config.universe, &LoadOptions::synthetic(as_of())).unwrap();

    let single = run_screen(
        &data,
        &config,
        &PipelineOptions {
            workers: Some(1),
            ..Default::default()
        },
    )
    .unwrap();
    let many = run_screen(
        &data,
        &config,
        &PipelineOptions {
            workers: Some(4),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(single.candidates, many.candidates);
    assert_eq!(single.selected, many.selected);
    assert_eq!(single.funnel, many.funnel);
    assert_eq!(single.dataset_hash, many.dataset_hash);
}

#[test]
fn exhaustive_run_feeds_diagnostics() {
    let config = small_config();
    let data = load_universe(&config.universe, &LoadOptions::synthetic(as_of())).unwrap();
    let options = PipelineOptions {
        cascade: CascadeOptions::diagnostic(),
        workers: None,
    };
    let report = run_screen(&data, &config, &options).unwrap();
    let diag = Diagnostics::from_candidates(&report.candidates, &Default::default());

    // Synthetic data is complete, so every daily filter sees every symbol.
    let adx = diag.filters.iter().find(|s| s.filter_name == "adx").unwrap();
    assert_eq!(adx.evaluated, 8);
    assert_eq!(diag.candidates, 8);
    let discarded: usize = diag.reasons.values().sum();
    assert_eq!(discarded + diag.qualified, 8);
}

#[test]
fn short_benchmark_aborts_the_run() {
    let config = small_config();
    let opts = LoadOptions {
        synthetic_days: 10,
        ..LoadOptions::synthetic(as_of())
    };
    let data = load_universe(&config.universe, &opts).unwrap();
    let err = run_screen(&data, &config, &PipelineOptions::default()).unwrap_err();
    match err {
        PipelineError::Benchmark {
            symbol,
            available,
            needed,
        } => {
            assert_eq!(symbol, "NIFTY50");
            assert_eq!(available, 10);
            assert_eq!(needed, config.periods.relative_strength);
        }
        other => panic!("expected benchmark error, got {other}"),
    }
}

#[test]
fn invalid_config_is_rejected_before_work() {
    let mut config = small_config();
    config.weights.trend_strength += 1;
    let data = load_universe(&config.universe, &LoadOptions::synthetic(as_of())).unwrap();
    let err = run_screen(&data, &config, &PipelineOptions::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}
