//! Per-filter failure rates and discard-reason histograms.
//!
//! Meant for exhaustive runs, where every filter of every candidate is
//! evaluated; on strict runs the rates only cover candidates that reached
//! each filter.

use serde::Serialize;
use std::collections::BTreeMap;
use swingscreen_core::candidate::Candidate;
use swingscreen_core::cascade::Cascade;
use swingscreen_core::domain::Timeframe;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterStats {
    pub filter_name: String,
    pub stage: Timeframe,
    pub mandatory: bool,
    pub evaluated: usize,
    pub failed: usize,
    /// Failures caused by an undefined input.
    pub undefined: usize,
}

impl FilterStats {
    /// Failed over evaluated, 0 when never evaluated.
    pub fn failure_rate(&self) -> f64 {
        if self.evaluated == 0 {
            0.0
        } else {
            self.failed as f64 / self.evaluated as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub candidates: usize,
    pub qualified: usize,
    /// Cascade order, then any ad-hoc outcomes such as `weekly-data`.
    pub filters: Vec<FilterStats>,
    /// Discard reason code to count.
    pub reasons: BTreeMap<String, usize>,
}

impl Diagnostics {
    pub fn from_candidates(candidates: &[Candidate], cascade: &Cascade) -> Self {
        let mut filters: Vec<FilterStats> = cascade
            .filters()
            .iter()
            .map(|f| FilterStats {
                filter_name: f.name.to_string(),
                stage: f.stage,
                mandatory: f.mandatory,
                evaluated: 0,
                failed: 0,
                undefined: 0,
            })
            .collect();

        let mut reasons = BTreeMap::new();
        for candidate in candidates {
            if let Some(reason) = candidate.discard_reason() {
                *reasons.entry(reason.code()).or_insert(0) += 1;
            }
            for outcome in &candidate.outcomes {
                let index = match filters
                    .iter()
                    .position(|s| s.filter_name == outcome.filter_name)
                {
                    Some(i) => i,
                    None => {
                        filters.push(FilterStats {
                            filter_name: outcome.filter_name.clone(),
                            stage: outcome.stage,
                            mandatory: outcome.mandatory,
                            evaluated: 0,
                            failed: 0,
                            undefined: 0,
                        });
                        filters.len() - 1
                    }
                };
                let stats = &mut filters[index];
                stats.evaluated += 1;
                if !outcome.passed {
                    stats.failed += 1;
                    if outcome.observed.is_none() {
                        stats.undefined += 1;
                    }
                }
            }
        }

        Diagnostics {
            candidates: candidates.len(),
            qualified: candidates.iter().filter(|c| c.is_qualified()).count(),
            filters,
            reasons,
        }
    }

    /// Mandatory filters ordered by failure rate, highest first.
    pub fn bottlenecks(&self) -> Vec<&FilterStats> {
        let mut ranked: Vec<&FilterStats> = self
            .filters
            .iter()
            .filter(|s| s.mandatory && s.evaluated > 0)
            .collect();
        ranked.sort_by(|a, b| {
            b.failure_rate()
                .total_cmp(&a.failure_rate())
                .then_with(|| a.filter_name.cmp(&b.filter_name))
        });
        ranked
    }
}
