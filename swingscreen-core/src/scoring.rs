//! Weighted scoring of qualified candidates.
//!
//! Each factor is normalized to [0, 100] by a [`Curve`]; the final score is
//! the weight-averaged sum (weights total 100), rounded to two decimals.

use crate::config::ScreenConfig;
use crate::quality::QualityReport;
use crate::snapshot::{keys, IndicatorSnapshot};
use serde::{Deserialize, Serialize};

/// Normalization from a raw indicator value to a 0–100 sub-score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    /// 0 at `floor`, rising linearly to 100 at `ceiling`.
    Saturating { floor: f64, ceiling: f64 },
    /// 100 inside `[ideal_low, ideal_high]`, falling to 0 at either edge.
    Proximity {
        edge_low: f64,
        ideal_low: f64,
        ideal_high: f64,
        edge_high: f64,
    },
    /// Proportional to the margin above `threshold`; 100 at `full_margin`.
    Linear { threshold: f64, full_margin: f64 },
}

impl Curve {
    /// Sub-score in [0, 100]. Non-finite input scores 0.
    pub fn apply(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        let raw = match *self {
            Curve::Saturating { floor, ceiling } => ramp(value, floor, ceiling),
            Curve::Proximity {
                edge_low,
                ideal_low,
                ideal_high,
                edge_high,
            } => {
                if value < ideal_low {
                    ramp(value, edge_low, ideal_low)
                } else if value > ideal_high {
                    100.0 - ramp(value, ideal_high, edge_high)
                } else {
                    100.0
                }
            }
            Curve::Linear {
                threshold,
                full_margin,
            } => ramp(value, threshold, threshold + full_margin),
        };
        clamp_score(raw)
    }
}

/// Linear 0→100 between `from` and `to`. A degenerate span is a step at `to`.
fn ramp(value: f64, from: f64, to: f64) -> f64 {
    if to <= from {
        return if value >= to { 100.0 } else { 0.0 };
    }
    (value - from) / (to - from) * 100.0
}

fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-factor sub-scores (each 0–100) and the weighted total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub trend_strength: f64,
    pub rsi_position: f64,
    pub relative_strength: f64,
    pub volume_expansion: f64,
    pub atr_expansion: f64,
    pub weekly_alignment: f64,
    pub price_action: f64,
    pub trade_quality: f64,
    pub total: f64,
}

/// Score a candidate from its daily snapshot.
///
/// `weekly_aligned` is `None` when the weekly stage was not evaluated;
/// `quality` is `None` when no quality report exists.
pub fn score_candidate(
    daily: &IndicatorSnapshot,
    weekly_aligned: Option<bool>,
    quality: Option<&QualityReport>,
    config: &ScreenConfig,
) -> ScoreBreakdown {
    let t = &config.thresholds;
    let c = &config.curves;
    let value = |key: &str| daily.get(key).unwrap_or(f64::NAN);

    let adx = Curve::Saturating {
        floor: t.adx_min,
        ceiling: c.adx_excellent,
    }
    .apply(value(keys::ADX));
    let slope = Curve::Saturating {
        floor: 0.0,
        ceiling: c.slope_excellent_pct,
    }
    .apply(value(keys::EMA_FAST_SLOPE_PCT));
    let trend_strength = 0.7 * adx + 0.3 * slope;

    let rsi_position = Curve::Proximity {
        edge_low: t.rsi_min,
        ideal_low: c.rsi_ideal_low,
        ideal_high: c.rsi_ideal_high,
        edge_high: t.rsi_max,
    }
    .apply(value(keys::RSI));

    let relative_strength = Curve::Linear {
        threshold: t.relative_strength_min,
        full_margin: c.rs_full_margin,
    }
    .apply(value(keys::RELATIVE_STRENGTH));

    let volume_expansion = Curve::Linear {
        threshold: t.volume_ratio_min,
        full_margin: c.volume_full_margin,
    }
    .apply(value(keys::VOLUME_RATIO));

    let atr_expansion = Curve::Saturating {
        floor: t.atr_ratio_min,
        ceiling: c.atr_excellent,
    }
    .apply(value(keys::ATR_RATIO));

    let weekly_alignment = match weekly_aligned {
        Some(true) => 100.0,
        Some(false) => 0.0,
        None => 50.0,
    };

    let price_action = price_action_score(daily, config);
    let trade_quality = trade_quality_score(quality, config);

    let w = &config.weights;
    let weighted = [
        (trend_strength, w.trend_strength),
        (rsi_position, w.rsi_position),
        (relative_strength, w.relative_strength),
        (volume_expansion, w.volume_expansion),
        (atr_expansion, w.atr_expansion),
        (weekly_alignment, w.weekly_alignment),
        (price_action, w.price_action),
        (trade_quality, w.trade_quality),
    ]
    .iter()
    .map(|(sub, weight)| sub * f64::from(*weight) / 100.0)
    .sum::<f64>();

    ScoreBreakdown {
        trend_strength,
        rsi_position,
        relative_strength,
        volume_expansion,
        atr_expansion,
        weekly_alignment,
        price_action,
        trade_quality,
        total: round2(clamp_score(weighted)),
    }
}

fn price_action_score(daily: &IndicatorSnapshot, config: &ScreenConfig) -> f64 {
    let higher_lows = Curve::Saturating {
        floor: config.thresholds.higher_lows_min,
        ceiling: config.curves.higher_lows_excellent,
    }
    .apply(daily.get(keys::HIGHER_LOWS).unwrap_or(f64::NAN));

    let mut score = higher_lows * 0.4;
    if daily.flag(keys::CONSOLIDATION) {
        score += 30.0;
    }
    if daily.flag(keys::BULLISH_ENGULFING) {
        score += 30.0;
    }
    if daily.flag(keys::VOLUME_EXPANDING) {
        score += 40.0;
    }
    clamp_score(score)
}

fn trade_quality_score(quality: Option<&QualityReport>, config: &ScreenConfig) -> f64 {
    let Some(report) = quality.filter(|r| r.passed()) else {
        return 50.0;
    };
    let c = &config.curves;

    let stop = match report.stop_distance_pct {
        Some(d) if d >= c.stop_ideal_low_pct && d <= c.stop_ideal_high_pct => 50.0,
        Some(d) if d.is_finite() => {
            let center = (c.stop_ideal_low_pct + c.stop_ideal_high_pct) / 2.0;
            (50.0 - 25.0 * (d - center).abs()).max(0.0)
        }
        _ => 0.0,
    };
    let reward = Curve::Saturating {
        floor: config.thresholds.min_risk_reward,
        ceiling: c.rr_excellent,
    }
    .apply(report.risk_reward.unwrap_or(f64::NAN));

    clamp_score(stop + 0.5 * reward)
}
