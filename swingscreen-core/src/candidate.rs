//! Per-symbol evaluation: snapshots, cascade, trade setup, quality, score.

use crate::cascade::{weekly, Cascade, CascadeOptions, EvaluationMode, FilterOutcome};
use crate::config::ScreenConfig;
use crate::domain::{validate_series, Candle, Symbol, Timeframe};
use crate::market::{self, MarketContext, WeeklyTrend};
use crate::quality::{self, QualityCheck, QualityReport};
use crate::scoring::{score_candidate, ScoreBreakdown};
use crate::setup::{self, TradeSetup};
use crate::snapshot::{
    daily_snapshot, intraday_snapshot, keys, weekly_snapshot, BenchmarkSnapshot,
    TimeframeSnapshots,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate was excluded from ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscardReason {
    /// A mandatory filter evaluated and failed.
    FilterFailed { stage: Timeframe, filter: String },
    /// A mandatory filter's input was undefined.
    InsufficientData { stage: Timeframe, filter: String },
    /// A required timeframe had no candles.
    MissingTimeframe { stage: Timeframe },
    /// A candle series failed validation.
    InvalidData { timeframe: Timeframe, detail: String },
    /// The trade setup failed a quality check.
    Quality {
        check: QualityCheck,
        observed: Option<f64>,
        limit: Option<f64>,
    },
}

impl DiscardReason {
    /// Stable reason code used in reports and histograms.
    pub fn code(&self) -> String {
        match self {
            DiscardReason::FilterFailed { filter, .. } => filter.clone(),
            DiscardReason::InsufficientData { .. } => "insufficient-data".to_string(),
            DiscardReason::MissingTimeframe { .. } => "missing-timeframe".to_string(),
            DiscardReason::InvalidData { .. } => "invalid-data".to_string(),
            DiscardReason::Quality { check, .. } => format!("quality:{}", check.code()),
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::FilterFailed { stage, filter } => {
                write!(f, "{filter} ({stage})")
            }
            DiscardReason::InsufficientData { stage, filter } => {
                write!(f, "insufficient-data: {filter} ({stage})")
            }
            DiscardReason::MissingTimeframe { stage } => {
                write!(f, "missing-timeframe: no {stage} candles")
            }
            DiscardReason::InvalidData { timeframe, detail } => {
                write!(f, "invalid-data: {timeframe} series: {detail}")
            }
            DiscardReason::Quality {
                check,
                observed,
                limit,
            } => {
                write!(f, "quality:{check}")?;
                if let (Some(observed), Some(limit)) = (observed, limit) {
                    write!(f, " ({observed:.2} vs {limit:.2})")?;
                }
                Ok(())
            }
        }
    }
}

/// Raw input for one symbol. An empty series means the timeframe is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolData {
    pub symbol: Symbol,
    pub daily: Vec<Candle>,
    pub weekly: Vec<Candle>,
    pub intraday: Vec<Candle>,
    /// Caller-supplied S/R context; derived from the candles when absent.
    pub market: Option<MarketContext>,
}

impl SymbolData {
    pub fn new(symbol: impl Into<Symbol>, daily: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            daily,
            ..Default::default()
        }
    }

    pub fn with_weekly(mut self, weekly: Vec<Candle>) -> Self {
        self.weekly = weekly;
        self
    }

    pub fn with_intraday(mut self, intraday: Vec<Candle>) -> Self {
        self.intraday = intraday;
        self
    }

    pub fn series(&self, timeframe: Timeframe) -> &[Candle] {
        match timeframe {
            Timeframe::Daily => &self.daily,
            Timeframe::Weekly => &self.weekly,
            Timeframe::Intraday => &self.intraday,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Qualified,
    Discarded(DiscardReason),
}

/// Everything the screen learned about one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: Symbol,
    pub snapshots: TimeframeSnapshots,
    pub outcomes: Vec<FilterOutcome>,
    pub status: CandidateStatus,
    pub setup: Option<TradeSetup>,
    pub quality: Option<QualityReport>,
    pub market: Option<MarketContext>,
    pub weekly_trend: WeeklyTrend,
    pub score: Option<ScoreBreakdown>,
}

impl Candidate {
    fn discarded(symbol: Symbol, reason: DiscardReason) -> Self {
        Self {
            symbol,
            snapshots: TimeframeSnapshots::default(),
            outcomes: Vec::new(),
            status: CandidateStatus::Discarded(reason),
            setup: None,
            quality: None,
            market: None,
            weekly_trend: WeeklyTrend::Unknown,
            score: None,
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.status == CandidateStatus::Qualified
    }

    pub fn discard_reason(&self) -> Option<&DiscardReason> {
        match &self.status {
            CandidateStatus::Discarded(reason) => Some(reason),
            CandidateStatus::Qualified => None,
        }
    }

    pub fn final_score(&self) -> Option<f64> {
        self.score.map(|s| s.total)
    }

    pub fn relative_strength(&self) -> Option<f64> {
        self.snapshots
            .daily
            .as_ref()
            .and_then(|s| s.get(keys::RELATIVE_STRENGTH))
    }

    /// Names of the mandatory filters that failed, in evaluation order.
    pub fn failed_filters(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.mandatory && !o.passed)
            .map(|o| o.filter_name.as_str())
    }
}

/// Run one symbol through the whole screen.
///
/// Quality validation runs for qualified candidates, and for every candidate
/// with intraday data in exhaustive mode; it is skipped with the intraday
/// stage. Only candidates still qualified after quality are scored.
pub fn evaluate_symbol(
    data: &SymbolData,
    benchmark: &BenchmarkSnapshot,
    cascade: &Cascade,
    config: &ScreenConfig,
    options: &CascadeOptions,
) -> Candidate {
    for timeframe in Timeframe::ALL {
        if options.is_skipped(timeframe) {
            continue;
        }
        if let Err(err) = validate_series(data.series(timeframe)) {
            return Candidate::discarded(
                data.symbol.clone(),
                DiscardReason::InvalidData {
                    timeframe,
                    detail: err.to_string(),
                },
            );
        }
    }

    let present = |tf: Timeframe| !options.is_skipped(tf) && !data.series(tf).is_empty();
    let snapshots = TimeframeSnapshots {
        daily: present(Timeframe::Daily)
            .then(|| daily_snapshot(&data.daily, benchmark, &config.periods)),
        weekly: present(Timeframe::Weekly)
            .then(|| weekly_snapshot(&data.weekly, &config.periods)),
        intraday: present(Timeframe::Intraday)
            .then(|| intraday_snapshot(&data.intraday, &config.intraday)),
    };

    let run = cascade.run(&snapshots, config, options);
    let mut status = match run.failure {
        Some(reason) => CandidateStatus::Discarded(reason),
        None => CandidateStatus::Qualified,
    };

    let market = data.market.or_else(|| {
        market::analyze(&data.daily, &data.intraday, config.periods.sr_lookback)
    });

    let mut trade_setup = None;
    let mut quality_report = None;
    let wants_quality =
        status == CandidateStatus::Qualified || options.mode == EvaluationMode::Exhaustive;
    if present(Timeframe::Intraday) && wants_quality {
        trade_setup = setup::calculate(&data.intraday, &config.setup);
        let levels = market.map(|m| m.sr_levels).unwrap_or_default();
        let report = quality::validate(trade_setup.as_ref(), &levels, &config.thresholds);
        if let (CandidateStatus::Qualified, Some(failure)) = (&status, report.failure) {
            status = CandidateStatus::Discarded(DiscardReason::Quality {
                check: failure.check,
                observed: failure.observed,
                limit: failure.limit,
            });
        }
        quality_report = Some(report);
    }

    let weekly_trend = if options.is_skipped(Timeframe::Weekly) {
        WeeklyTrend::Unknown
    } else {
        WeeklyTrend::from_snapshot(
            snapshots.weekly.as_ref(),
            config.thresholds.weekly_rsi_min,
            config.thresholds.weekly_rsi_max,
        )
    };

    let score = match (&status, snapshots.daily.as_ref()) {
        (CandidateStatus::Qualified, Some(daily)) => {
            let weekly_aligned = run
                .outcomes
                .iter()
                .find(|o| o.filter_name == weekly::WEEKLY_ALIGNMENT)
                .map(|o| o.passed);
            Some(score_candidate(
                daily,
                weekly_aligned,
                quality_report.as_ref(),
                config,
            ))
        }
        _ => None,
    };

    Candidate {
        symbol: data.symbol.clone(),
        snapshots,
        outcomes: run.outcomes,
        status,
        setup: trade_setup,
        quality: quality_report,
        market,
        weekly_trend,
        score,
    }
}
