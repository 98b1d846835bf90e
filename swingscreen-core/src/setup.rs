//! Trade setup from intraday candles.
//!
//! Entries are pullback levels at the fast and slow intraday EMAs. The stop
//! is the higher of a buffered swing-low stop and an ATR stop below the fast
//! EMA; targets sit a fixed multiple of risk above each entry.

use crate::config::SetupParams;
use crate::domain::Candle;
use crate::indicators::price_action::swing_low;
use crate::indicators::{Atr, Ema, Indicator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopMethod {
    SwingLow,
    AtrBased,
}

/// Derived trade parameters. Field names match the published result file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    pub ltp: f64,
    pub ema9: f64,
    pub ema20: f64,
    pub stop_loss: f64,
    pub stop_method: StopMethod,
    pub swing_low: f64,
    pub atr_15min: f64,
    pub target_ema9: Option<f64>,
    pub target_ema20: Option<f64>,
    pub risk_ema9: f64,
    pub risk_ema20: f64,
    pub risk_reward_ratio: f64,
}

impl TradeSetup {
    /// Percent distance from the last traded price to the stop.
    pub fn stop_distance_pct(&self) -> f64 {
        ((self.ltp - self.stop_loss) / self.ltp).abs() * 100.0
    }

    /// Reward over risk for the fast-EMA entry, when the entry sits above
    /// the stop.
    pub fn risk_reward(&self) -> Option<f64> {
        if self.risk_ema9 <= 0.0 {
            return None;
        }
        self.target_ema9
            .map(|target| (target - self.ema9) / self.risk_ema9)
    }
}

/// `None` when there are fewer than `min_candles` candles or the entry EMAs
/// are undefined.
pub fn calculate(candles: &[Candle], params: &SetupParams) -> Option<TradeSetup> {
    if candles.len() < params.min_candles {
        return None;
    }
    let ltp = candles.last()?.close;
    let ema9 = Ema::new(params.ema_entry).latest(candles)?;
    let ema20 = Ema::new(params.ema_pullback).latest(candles)?;

    let swing = swing_low(candles, params.swing_window)?;
    let stop_swing = swing * (1.0 - params.swing_buffer_pct / 100.0);

    let atr = Atr::new(params.atr_period)
        .latest(candles)
        .filter(|a| *a > 0.0);
    let stop_atr = atr.map(|a| ema9 - a * params.atr_multiplier);

    // Higher stop is tighter for a long.
    let (stop_loss, stop_method) = match stop_atr {
        Some(level) if level > stop_swing => (level, StopMethod::AtrBased),
        _ => (stop_swing, StopMethod::SwingLow),
    };

    let r = params.target_r_multiple;
    let risk_ema9 = ema9 - stop_loss;
    let risk_ema20 = ema20 - stop_loss;

    Some(TradeSetup {
        ltp,
        ema9,
        ema20,
        stop_loss,
        stop_method,
        swing_low: swing,
        atr_15min: atr.unwrap_or(0.0),
        target_ema9: (risk_ema9 > 0.0).then(|| ema9 + risk_ema9 * r),
        target_ema20: (risk_ema20 > 0.0).then(|| ema20 + risk_ema20 * r),
        risk_ema9,
        risk_ema20,
        risk_reward_ratio: r,
    })
}
