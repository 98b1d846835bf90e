//! Multi-timeframe filter cascade.
//!
//! Filters are data: a name, the stage they belong to, whether they gate
//! qualification, and a [`Rule`] that reads snapshot keys and config
//! thresholds. The cascade walks daily, weekly and intraday filters in order
//! and records one [`FilterOutcome`] per evaluated filter.
//!
//! In strict mode evaluation stops at the first mandatory failure; in
//! exhaustive mode every filter of every non-skipped stage is evaluated and
//! the first mandatory failure still decides the discard reason.

pub mod daily;
pub mod intraday;
pub mod weekly;

use crate::candidate::DiscardReason;
use crate::config::ScreenConfig;
use crate::domain::Timeframe;
use crate::snapshot::{IndicatorSnapshot, TimeframeSnapshots};
use serde::{Deserialize, Serialize};

/// Config bound a rule compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    AdxMin,
    RsiMin,
    RsiMax,
    AtrRatioMin,
    VolumeRatioMin,
    RelativeStrengthMin,
    HigherLowsMin,
    WeeklyRsiMin,
    WeeklyRsiMax,
    MaxUpperWick,
    IntradayVolumeMin,
    VwapHoldCandles,
}

/// Comparison a filter performs on snapshot values.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// `metric > reference`, both read from the snapshot.
    Above {
        metric: &'static str,
        reference: &'static str,
    },
    /// Each metric strictly greater than the next.
    Ordered { metrics: &'static [&'static str] },
    /// `metric >= bound`
    AtLeast {
        metric: &'static str,
        bound: Threshold,
    },
    /// `metric <= bound`
    AtMost {
        metric: &'static str,
        bound: Threshold,
    },
    /// `metric > bound`
    Exceeds {
        metric: &'static str,
        bound: Threshold,
    },
    /// `low <= metric <= high`, or strict when `inclusive` is false.
    Within {
        metric: &'static str,
        low: Threshold,
        high: Threshold,
        inclusive: bool,
    },
    /// `metric > 0`
    Positive { metric: &'static str },
    /// 0/1 snapshot flag.
    Flag { metric: &'static str },
}

/// Result of applying a rule to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Check {
    pub passed: bool,
    pub observed: Option<f64>,
    pub threshold: Option<f64>,
}

impl Check {
    fn undefined(threshold: Option<f64>) -> Self {
        Self {
            passed: false,
            observed: None,
            threshold,
        }
    }

    fn compare(observed: f64, threshold: f64, passed: bool) -> Self {
        Self {
            passed,
            observed: Some(observed),
            threshold: Some(threshold),
        }
    }
}

impl Rule {
    /// Apply the rule. An undefined metric always fails.
    pub fn evaluate(&self, snapshot: &IndicatorSnapshot, config: &ScreenConfig) -> Check {
        match *self {
            Rule::Above { metric, reference } => {
                match (snapshot.get(metric), snapshot.get(reference)) {
                    (Some(value), Some(level)) => Check::compare(value, level, value > level),
                    (_, level) => Check::undefined(level),
                }
            }
            Rule::Ordered { metrics } => {
                let values: Option<Vec<f64>> = metrics.iter().map(|k| snapshot.get(k)).collect();
                let Some(values) = values else {
                    return Check::undefined(None);
                };
                let first_break = values.windows(2).find(|pair| pair[0] <= pair[1]);
                match (first_break, values.as_slice()) {
                    (Some(pair), _) => Check::compare(pair[0], pair[1], false),
                    (None, [a, b, ..]) => Check::compare(*a, *b, true),
                    (None, _) => Check::undefined(None),
                }
            }
            Rule::AtLeast { metric, bound } => {
                let threshold = config.threshold(bound);
                match snapshot.get(metric) {
                    Some(v) => Check::compare(v, threshold, v >= threshold),
                    None => Check::undefined(Some(threshold)),
                }
            }
            Rule::AtMost { metric, bound } => {
                let threshold = config.threshold(bound);
                match snapshot.get(metric) {
                    Some(v) => Check::compare(v, threshold, v <= threshold),
                    None => Check::undefined(Some(threshold)),
                }
            }
            Rule::Exceeds { metric, bound } => {
                let threshold = config.threshold(bound);
                match snapshot.get(metric) {
                    Some(v) => Check::compare(v, threshold, v > threshold),
                    None => Check::undefined(Some(threshold)),
                }
            }
            Rule::Within {
                metric,
                low,
                high,
                inclusive,
            } => {
                let (lo, hi) = (config.threshold(low), config.threshold(high));
                let Some(v) = snapshot.get(metric) else {
                    return Check::undefined(Some(lo));
                };
                let passed = if inclusive {
                    lo <= v && v <= hi
                } else {
                    lo < v && v < hi
                };
                // Report the violated edge, or the nearer one on a pass.
                let edge = if v < lo || (passed && v - lo <= hi - v) {
                    lo
                } else {
                    hi
                };
                Check::compare(v, edge, passed)
            }
            Rule::Positive { metric } => match snapshot.get(metric) {
                Some(v) => Check::compare(v, 0.0, v > 0.0),
                None => Check::undefined(Some(0.0)),
            },
            Rule::Flag { metric } => match snapshot.get(metric) {
                Some(v) => Check::compare(v, 1.0, v > 0.5),
                None => Check::undefined(Some(1.0)),
            },
        }
    }
}

/// A named predicate in one cascade stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: &'static str,
    pub stage: Timeframe,
    /// Informational filters are recorded but never disqualify.
    pub mandatory: bool,
    pub rule: Rule,
}

impl Filter {
    pub fn mandatory(name: &'static str, stage: Timeframe, rule: Rule) -> Self {
        Self {
            name,
            stage,
            mandatory: true,
            rule,
        }
    }

    pub fn informational(name: &'static str, stage: Timeframe, rule: Rule) -> Self {
        Self {
            name,
            stage,
            mandatory: false,
            rule,
        }
    }

    pub fn evaluate(&self, snapshot: &IndicatorSnapshot, config: &ScreenConfig) -> FilterOutcome {
        let check = self.rule.evaluate(snapshot, config);
        FilterOutcome {
            filter_name: self.name.to_string(),
            stage: self.stage,
            mandatory: self.mandatory,
            passed: check.passed,
            observed: check.observed,
            threshold: check.threshold,
        }
    }
}

/// One evaluated filter in a candidate's trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub filter_name: String,
    pub stage: Timeframe,
    pub mandatory: bool,
    pub passed: bool,
    pub observed: Option<f64>,
    pub threshold: Option<f64>,
}

impl FilterOutcome {
    /// Outcome recorded when a required stage has no candles.
    pub fn missing_data(stage: Timeframe) -> Self {
        Self {
            filter_name: format!("{stage}-data"),
            stage,
            mandatory: true,
            passed: false,
            observed: None,
            threshold: None,
        }
    }

    /// Discard reason a failed filter outcome implies.
    pub fn discard_reason(&self) -> DiscardReason {
        if self.observed.is_none() {
            DiscardReason::InsufficientData {
                stage: self.stage,
                filter: self.filter_name.clone(),
            }
        } else {
            DiscardReason::FilterFailed {
                stage: self.stage,
                filter: self.filter_name.clone(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Stop at the first mandatory failure.
    Strict,
    /// Evaluate every filter for failure-rate reporting.
    Exhaustive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRequirement {
    /// Missing data disqualifies.
    Required,
    /// Stage is not evaluated at all.
    Skipped,
}

/// How the cascade is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOptions {
    pub mode: EvaluationMode,
    pub weekly: StageRequirement,
    pub intraday: StageRequirement,
}

impl CascadeOptions {
    /// All stages required, strict evaluation.
    pub fn production() -> Self {
        Self {
            mode: EvaluationMode::Strict,
            weekly: StageRequirement::Required,
            intraday: StageRequirement::Required,
        }
    }

    /// All stages required, exhaustive evaluation.
    pub fn diagnostic() -> Self {
        Self {
            mode: EvaluationMode::Exhaustive,
            ..Self::production()
        }
    }

    /// Daily filters only.
    pub fn daily_only() -> Self {
        Self {
            weekly: StageRequirement::Skipped,
            intraday: StageRequirement::Skipped,
            ..Self::production()
        }
    }

    /// Daily and weekly; intraday confirmation skipped.
    pub fn test_mode() -> Self {
        Self {
            intraday: StageRequirement::Skipped,
            ..Self::production()
        }
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn requirement(&self, stage: Timeframe) -> StageRequirement {
        match stage {
            Timeframe::Daily => StageRequirement::Required,
            Timeframe::Weekly => self.weekly,
            Timeframe::Intraday => self.intraday,
        }
    }

    pub fn is_skipped(&self, stage: Timeframe) -> bool {
        self.requirement(stage) == StageRequirement::Skipped
    }
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self::production()
    }
}

/// Trace of one cascade run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CascadeRun {
    pub outcomes: Vec<FilterOutcome>,
    /// First mandatory failure, if any.
    pub failure: Option<DiscardReason>,
}

impl CascadeRun {
    pub fn qualified(&self) -> bool {
        self.failure.is_none()
    }
}

/// Ordered filter set across all stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Cascade {
    filters: Vec<Filter>,
}

impl Cascade {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    /// The standard swing screen: daily, then weekly, then intraday.
    pub fn canonical() -> Self {
        let mut filters = daily::filters();
        filters.extend(weekly::filters());
        filters.extend(intraday::filters());
        Self { filters }
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn stage(&self, stage: Timeframe) -> impl Iterator<Item = &Filter> {
        self.filters.iter().filter(move |f| f.stage == stage)
    }

    /// Evaluate every non-skipped stage in order.
    pub fn run(
        &self,
        snapshots: &TimeframeSnapshots,
        config: &ScreenConfig,
        options: &CascadeOptions,
    ) -> CascadeRun {
        let mut run = CascadeRun::default();

        for stage in Timeframe::ALL {
            if options.is_skipped(stage) {
                continue;
            }

            let Some(snapshot) = snapshots.get(stage) else {
                if run.failure.is_none() {
                    run.failure = Some(DiscardReason::MissingTimeframe { stage });
                }
                run.outcomes.push(FilterOutcome::missing_data(stage));
                if options.mode == EvaluationMode::Strict {
                    return run;
                }
                continue;
            };

            for filter in self.stage(stage) {
                let outcome = filter.evaluate(snapshot, config);
                let failed_gate = outcome.mandatory && !outcome.passed;
                if failed_gate && run.failure.is_none() {
                    run.failure = Some(outcome.discard_reason());
                }
                run.outcomes.push(outcome);
                if failed_gate && options.mode == EvaluationMode::Strict {
                    return run;
                }
            }
        }

        run
    }
}

impl Default for Cascade {
    fn default() -> Self {
        Self::canonical()
    }
}
