//! Cascade and selection scenarios over hand-built snapshots.

use swingscreen_core::candidate::{Candidate, CandidateStatus, DiscardReason};
use swingscreen_core::cascade::{daily, Cascade, CascadeOptions, EvaluationMode};
use swingscreen_core::config::ScreenConfig;
use swingscreen_core::domain::Timeframe;
use swingscreen_core::market::WeeklyTrend;
use swingscreen_core::scoring::{score_candidate, ScoreBreakdown};
use swingscreen_core::selector::select;
use swingscreen_core::snapshot::{keys, IndicatorSnapshot, TimeframeSnapshots};

// ── Helpers ──────────────────────────────────────────────────────────

fn snapshot(pairs: &[(&str, f64)]) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot::new();
    for &(key, value) in pairs {
        snap.set(key, Some(value));
    }
    snap
}

/// Snapshots that pass every mandatory filter with default thresholds.
fn passing() -> TimeframeSnapshots {
    TimeframeSnapshots {
        daily: Some(snapshot(&[
            (keys::CLOSE, 120.0),
            (keys::EMA_FAST, 115.0),
            (keys::EMA_MID, 110.0),
            (keys::EMA_SLOW, 100.0),
            (keys::EMA_FAST_SLOPE, 1.2),
            (keys::EMA_FAST_SLOPE_PCT, 0.2),
            (keys::ADX, 31.0),
            (keys::RSI, 53.0),
            (keys::ATR_RATIO, 1.3),
            (keys::VOLUME_RATIO, 1.6),
            (keys::RELATIVE_STRENGTH, 3.5),
            (keys::HIGHER_LOWS, 3.0),
            (keys::VOLUME_EXPANDING, 1.0),
            (keys::CONSOLIDATION, 0.0),
            (keys::BULLISH_ENGULFING, 0.0),
        ])),
        weekly: Some(snapshot(&[
            (keys::CLOSE, 120.0),
            (keys::EMA_FAST, 110.0),
            (keys::EMA_MID, 100.0),
            (keys::RSI, 58.0),
        ])),
        intraday: Some(snapshot(&[
            (keys::CLOSE, 121.0),
            (keys::VWAP, 120.2),
            (keys::VWAP_HOLD, 2.0),
            (keys::MAX_UPPER_WICK, 0.2),
            (keys::VOLUME_SPIKE, 1.8),
        ])),
    }
}

fn with_daily(mut snaps: TimeframeSnapshots, key: &str, value: f64) -> TimeframeSnapshots {
    if let Some(daily) = snaps.daily.as_mut() {
        daily.set(key, Some(value));
    }
    snaps
}

fn scored(symbol: &str, total: f64) -> Candidate {
    Candidate {
        symbol: symbol.to_string(),
        snapshots: TimeframeSnapshots::default(),
        outcomes: Vec::new(),
        status: CandidateStatus::Qualified,
        setup: None,
        quality: None,
        market: None,
        weekly_trend: WeeklyTrend::Bullish,
        score: Some(ScoreBreakdown {
            total,
            ..Default::default()
        }),
    }
}

// ── Qualification ────────────────────────────────────────────────────

#[test]
fn passing_snapshots_qualify() {
    let config = ScreenConfig::default();
    let run = Cascade::canonical().run(&passing(), &config, &CascadeOptions::production());
    assert!(run.qualified(), "unexpected failure: {:?}", run.failure);
    // every filter, informational ones included
    assert_eq!(run.outcomes.len(), 19);
}

#[test]
fn alignment_failure_strict_vs_exhaustive() {
    let config = ScreenConfig::default();
    let cascade = Cascade::canonical();
    // close below EMA20 but above EMA200
    let snaps = with_daily(passing(), keys::CLOSE, 112.0);

    let strict = cascade.run(&snaps, &config, &CascadeOptions::production());
    let expected = Some(DiscardReason::FilterFailed {
        stage: Timeframe::Daily,
        filter: daily::EMA_ALIGNMENT.to_string(),
    });
    assert_eq!(strict.failure, expected);
    assert_eq!(strict.outcomes.len(), 2);
    assert_eq!(strict.outcomes[1].filter_name, "ema-alignment");

    let exhaustive = cascade.run(&snaps, &config, &CascadeOptions::diagnostic());
    assert_eq!(exhaustive.failure, expected);
    let daily_recorded = exhaustive
        .outcomes
        .iter()
        .filter(|o| o.stage == Timeframe::Daily)
        .count();
    assert_eq!(daily_recorded, 13);
    let names: Vec<&str> = exhaustive
        .outcomes
        .iter()
        .map(|o| o.filter_name.as_str())
        .collect();
    assert!(names.contains(&"adx"));
    assert!(names.contains(&"higher-lows"));
}

#[test]
fn adx_failure_records_observed_and_threshold() {
    let config = ScreenConfig::default();
    let snaps = with_daily(passing(), keys::ADX, 11.12);
    let run = Cascade::canonical().run(&snaps, &config, &CascadeOptions::production());

    let adx = run.outcomes.last().unwrap();
    assert_eq!(adx.filter_name, "adx");
    assert!(!adx.passed);
    assert_eq!(adx.observed, Some(11.12));
    assert_eq!(adx.threshold, Some(23.0));
    assert_eq!(run.failure.map(|r| r.code()), Some("adx".to_string()));
}

#[test]
fn thresholds_come_from_config() {
    let mut config = ScreenConfig::default();
    config.thresholds.adx_min = 10.0;
    let snaps = with_daily(passing(), keys::ADX, 11.12);
    let run = Cascade::canonical().run(&snaps, &config, &CascadeOptions::production());
    assert!(run.qualified());
}

#[test]
fn daily_only_ignores_missing_weekly_and_intraday() {
    let config = ScreenConfig::default();
    let mut snaps = passing();
    snaps.weekly = None;
    snaps.intraday = None;

    let run = Cascade::canonical().run(&snaps, &config, &CascadeOptions::production());
    assert_eq!(
        run.failure,
        Some(DiscardReason::MissingTimeframe {
            stage: Timeframe::Weekly
        })
    );

    let run = Cascade::canonical().run(&snaps, &config, &CascadeOptions::daily_only());
    assert!(run.qualified());
    assert!(run.outcomes.iter().all(|o| o.stage == Timeframe::Daily));
}

#[test]
fn weekly_rsi_outside_band_is_only_a_warning() {
    let config = ScreenConfig::default();
    let mut snaps = passing();
    if let Some(weekly) = snaps.weekly.as_mut() {
        weekly.set(keys::RSI, Some(75.0));
    }
    let run = Cascade::canonical().run(&snaps, &config, &CascadeOptions::test_mode());
    assert!(run.qualified());
    let rsi = run
        .outcomes
        .iter()
        .find(|o| o.filter_name == "weekly-rsi")
        .unwrap();
    assert!(!rsi.passed);
    assert!(!rsi.mandatory);
}

#[test]
fn strict_trace_is_prefix_of_exhaustive_trace() {
    let config = ScreenConfig::default();
    let cascade = Cascade::canonical();
    let snaps = with_daily(passing(), keys::RSI, 70.0);

    let strict = cascade.run(
        &snaps,
        &config,
        &CascadeOptions::production().with_mode(EvaluationMode::Strict),
    );
    let exhaustive = cascade.run(
        &snaps,
        &config,
        &CascadeOptions::production().with_mode(EvaluationMode::Exhaustive),
    );
    assert_eq!(strict.failure, exhaustive.failure);
    assert_eq!(
        strict.outcomes[..],
        exhaustive.outcomes[..strict.outcomes.len()]
    );
}

// ── Scoring and selection ────────────────────────────────────────────

#[test]
fn passing_candidate_scores_within_bounds() {
    let config = ScreenConfig::default();
    let snaps = passing();
    let score = score_candidate(snaps.daily.as_ref().unwrap(), Some(true), None, &config);
    assert!(score.total > 0.0 && score.total <= 100.0);
    assert_eq!(score.weekly_alignment, 100.0);
}

#[test]
fn higher_score_ranks_first() {
    let selected = select(&[scored("INFY", 72.10), scored("TCS", 87.45)], 3);
    let order: Vec<(&str, f64)> = selected
        .iter()
        .map(|c| (c.symbol.as_str(), c.final_score().unwrap()))
        .collect();
    assert_eq!(order, vec![("TCS", 87.45), ("INFY", 72.10)]);
}

#[test]
fn empty_selection_is_valid() {
    let config = ScreenConfig::default();
    let candidates: Vec<Candidate> = Vec::new();
    assert!(select(&candidates, config.selection.max_selections).is_empty());

    let discarded = Candidate {
        status: CandidateStatus::Discarded(DiscardReason::MissingTimeframe {
            stage: Timeframe::Intraday,
        }),
        score: None,
        ..scored("HDFCBANK", 0.0)
    };
    assert!(select(&[discarded], 3).is_empty());
}
