//! Final ranking and top-K truncation.

use crate::candidate::Candidate;
use std::cmp::Ordering;

/// Ranking order: score descending, then relative strength descending, then
/// symbol ascending. Missing values sort last.
pub fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    let score_a = a.final_score().unwrap_or(f64::NEG_INFINITY);
    let score_b = b.final_score().unwrap_or(f64::NEG_INFINITY);
    let rs_a = a.relative_strength().unwrap_or(f64::NEG_INFINITY);
    let rs_b = b.relative_strength().unwrap_or(f64::NEG_INFINITY);

    score_b
        .total_cmp(&score_a)
        .then_with(|| rs_b.total_cmp(&rs_a))
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Keep qualified, scored candidates, rank them and truncate to
/// `max_selections`. An empty result is a valid outcome.
pub fn select(candidates: &[Candidate], max_selections: usize) -> Vec<Candidate> {
    let mut ranked: Vec<Candidate> = candidates
        .iter()
        .filter(|c| c.is_qualified() && c.score.is_some())
        .cloned()
        .collect();
    ranked.sort_by(compare_candidates);
    ranked.truncate(max_selections);
    ranked
}
