//! Screen pipeline: benchmark once, fan out per symbol, fan in to the
//! selector.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use swingscreen_core::candidate::{evaluate_symbol, Candidate, DiscardReason, SymbolData};
use swingscreen_core::cascade::{Cascade, CascadeOptions};
use swingscreen_core::config::{ConfigError, ScreenConfig};
use swingscreen_core::domain::Timeframe;
use swingscreen_core::market::{market_sentiment, MarketSentiment};
use swingscreen_core::selector::select;
use swingscreen_core::snapshot::BenchmarkSnapshot;
use thiserror::Error;
use tracing::{debug, info, info_span};

use crate::data_loader::LoadedData;

/// Errors that abort a whole run. Per-symbol problems never do.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("benchmark '{symbol}' has {available} daily candles, relative strength needs {needed}")]
    Benchmark {
        symbol: String,
        available: usize,
        needed: usize,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub cascade: CascadeOptions,
    /// Worker threads; `None` uses the global rayon pool.
    pub workers: Option<usize>,
}

/// How many candidates made it through each stage.
///
/// A skipped stage passes everything that reached it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageFunnel {
    pub total: usize,
    pub valid_data: usize,
    pub daily_passed: usize,
    pub weekly_passed: usize,
    pub intraday_passed: usize,
    pub quality_passed: usize,
    pub selected: usize,
}

impl StageFunnel {
    pub fn from_candidates(candidates: &[Candidate], selected: usize) -> Self {
        let mut funnel = StageFunnel {
            total: candidates.len(),
            selected,
            ..Default::default()
        };
        for candidate in candidates {
            // Number of stages the candidate cleared, in cascade order.
            let cleared = match candidate.discard_reason() {
                None => 5,
                Some(DiscardReason::InvalidData { .. }) => 0,
                Some(DiscardReason::Quality { .. }) => 4,
                Some(
                    DiscardReason::FilterFailed { stage, .. }
                    | DiscardReason::InsufficientData { stage, .. }
                    | DiscardReason::MissingTimeframe { stage },
                ) => match stage {
                    Timeframe::Daily => 1,
                    Timeframe::Weekly => 2,
                    Timeframe::Intraday => 3,
                },
            };
            let counters = [
                &mut funnel.valid_data,
                &mut funnel.daily_passed,
                &mut funnel.weekly_passed,
                &mut funnel.intraday_passed,
                &mut funnel.quality_passed,
            ];
            for counter in counters.into_iter().take(cleared) {
                *counter += 1;
            }
        }
        funnel
    }
}

/// Everything a screen run produced.
#[derive(Debug, Clone)]
pub struct ScreenReport {
    pub as_of: Option<NaiveDate>,
    pub benchmark: BenchmarkSnapshot,
    pub market_sentiment: Option<MarketSentiment>,
    /// Every evaluated symbol, sorted by symbol.
    pub candidates: Vec<Candidate>,
    /// Ranked selection, at most `max_selections` long.
    pub selected: Vec<Candidate>,
    pub funnel: StageFunnel,
    pub options: CascadeOptions,
    pub config_fingerprint: String,
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Run the full screen over loaded data.
pub fn run_screen(
    data: &LoadedData,
    config: &ScreenConfig,
    options: &PipelineOptions,
) -> Result<ScreenReport, PipelineError> {
    config.validate()?;
    let _span = info_span!("screen", symbols = data.symbols.len()).entered();

    let window = config.periods.relative_strength;
    let benchmark =
        BenchmarkSnapshot::compute(&data.benchmark.daily, window).ok_or_else(|| {
            PipelineError::Benchmark {
                symbol: data.benchmark.symbol.clone(),
                available: data.benchmark.daily.len(),
                needed: window,
            }
        })?;
    info!(
        benchmark = %data.benchmark.symbol,
        return_pct = benchmark.return_pct,
        "benchmark snapshot ready"
    );

    let cascade = Cascade::canonical();
    let evaluate = |symbol_data: &SymbolData| {
        let candidate = evaluate_symbol(symbol_data, &benchmark, &cascade, config, &options.cascade);
        if let Some(reason) = candidate.discard_reason() {
            debug!(symbol = %candidate.symbol, reason = %reason, "discarded");
        }
        candidate
    };

    let mut candidates: Vec<Candidate> = match options.workers {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            pool.install(|| data.symbols.par_iter().map(evaluate).collect())
        }
        None => data.symbols.par_iter().map(evaluate).collect(),
    };
    // Output must not depend on scheduling.
    candidates.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let selected = select(&candidates, config.selection.max_selections);
    let funnel = StageFunnel::from_candidates(&candidates, selected.len());
    info!(
        total = funnel.total,
        daily = funnel.daily_passed,
        weekly = funnel.weekly_passed,
        intraday = funnel.intraday_passed,
        quality = funnel.quality_passed,
        selected = funnel.selected,
        "screen complete"
    );

    Ok(ScreenReport {
        as_of: data.as_of(),
        benchmark,
        market_sentiment: market_sentiment(&data.benchmark.daily, &data.benchmark.intraday),
        candidates,
        selected,
        funnel,
        options: options.cascade,
        config_fingerprint: config.fingerprint(),
        dataset_hash: data.dataset_hash.clone(),
        has_synthetic: data.has_synthetic,
    })
}
