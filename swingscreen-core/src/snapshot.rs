//! Indicator snapshots: the latest value of every indicator a timeframe's
//! filters and the scorer read.
//!
//! Snapshots are built once per symbol per timeframe and never persisted.
//! Only finite values are stored; an absent key reads as undefined.

use crate::config::{IntradayParams, Periods};
use crate::domain::{Candle, Timeframe};
use crate::indicators::atr::atr_ratio;
use crate::indicators::ema::{ema_slope, ema_slope_pct};
use crate::indicators::price_action::{
    bullish_engulfing, higher_lows, is_consolidating, upper_wick_ratio, volume_expanding,
    volume_ratio,
};
use crate::indicators::relative_strength::{pct_return, relative_strength};
use crate::indicators::{Adx, Atr, Ema, Indicator, Rsi, Vwap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable snapshot keys.
pub mod keys {
    pub const CLOSE: &str = "close";
    pub const EMA_FAST: &str = "ema_fast";
    pub const EMA_MID: &str = "ema_mid";
    pub const EMA_SLOW: &str = "ema_slow";
    pub const EMA_FAST_SLOPE: &str = "ema_fast_slope";
    pub const EMA_FAST_SLOPE_PCT: &str = "ema_fast_slope_pct";
    pub const RSI: &str = "rsi";
    pub const ADX: &str = "adx";
    pub const ATR: &str = "atr";
    pub const ATR_RATIO: &str = "atr_ratio";
    pub const VOLUME_RATIO: &str = "volume_ratio";
    pub const RELATIVE_STRENGTH: &str = "relative_strength";
    pub const HIGHER_LOWS: &str = "higher_lows";
    pub const VOLUME_EXPANDING: &str = "volume_expanding";
    pub const CONSOLIDATION: &str = "consolidation";
    pub const BULLISH_ENGULFING: &str = "bullish_engulfing";
    pub const VWAP: &str = "vwap";
    pub const VWAP_HOLD: &str = "vwap_hold";
    pub const MAX_UPPER_WICK: &str = "max_upper_wick";
    pub const VOLUME_SPIKE: &str = "volume_spike";
    pub const WINDOW_CANDLES: &str = "window_candles";
}

/// Named indicator values for one symbol on one timeframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSnapshot {
    values: BTreeMap<String, f64>,
}

impl IndicatorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value; `None` and non-finite values leave the key undefined.
    pub fn set(&mut self, key: &str, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                self.values.insert(key.to_string(), v);
            }
            None => {
                self.values.remove(key);
            }
        }
    }

    pub fn set_flag(&mut self, key: &str, flag: bool) {
        self.set(key, Some(if flag { 1.0 } else { 0.0 }));
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Boolean view of a 0/1 value. Undefined reads as false.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v > 0.5)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A symbol's snapshots across timeframes. `None` means no candles were
/// supplied for that timeframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSnapshots {
    pub daily: Option<IndicatorSnapshot>,
    pub weekly: Option<IndicatorSnapshot>,
    pub intraday: Option<IndicatorSnapshot>,
}

impl TimeframeSnapshots {
    pub fn get(&self, timeframe: Timeframe) -> Option<&IndicatorSnapshot> {
        match timeframe {
            Timeframe::Daily => self.daily.as_ref(),
            Timeframe::Weekly => self.weekly.as_ref(),
            Timeframe::Intraday => self.intraday.as_ref(),
        }
    }
}

/// Benchmark figures shared read-only by every symbol in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSnapshot {
    pub return_pct: f64,
    pub window: usize,
    pub last_close: f64,
}

impl BenchmarkSnapshot {
    /// `None` when the benchmark series is too short for the return window.
    pub fn compute(candles: &[Candle], window: usize) -> Option<Self> {
        let return_pct = pct_return(candles, window)?;
        let last_close = candles.last()?.close;
        Some(Self {
            return_pct,
            window,
            last_close,
        })
    }
}

/// Daily-timeframe snapshot.
pub fn daily_snapshot(
    candles: &[Candle],
    benchmark: &BenchmarkSnapshot,
    periods: &Periods,
) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot::new();
    snap.set(keys::CLOSE, candles.last().map(|c| c.close));

    let ema_fast = Ema::new(periods.ema_fast);
    snap.set(keys::EMA_FAST, ema_fast.latest(candles));
    snap.set(keys::EMA_MID, Ema::new(periods.ema_mid).latest(candles));
    snap.set(keys::EMA_SLOW, Ema::new(periods.ema_slow).latest(candles));

    let fast_series = ema_fast.compute(candles);
    snap.set(
        keys::EMA_FAST_SLOPE,
        ema_slope(&fast_series, periods.slope_window),
    );
    snap.set(
        keys::EMA_FAST_SLOPE_PCT,
        ema_slope_pct(&fast_series, periods.slope_window),
    );

    snap.set(keys::RSI, Rsi::new(periods.rsi).latest(candles));
    snap.set(keys::ADX, Adx::new(periods.adx).latest(candles));

    let atr = Atr::new(periods.atr);
    snap.set(keys::ATR, atr.latest(candles));
    snap.set(
        keys::ATR_RATIO,
        atr_ratio(&atr.compute(candles), periods.atr_avg),
    );
    snap.set(keys::VOLUME_RATIO, volume_ratio(candles, periods.volume_avg));
    snap.set(
        keys::RELATIVE_STRENGTH,
        relative_strength(candles, benchmark.return_pct, periods.relative_strength),
    );

    if !candles.is_empty() {
        snap.set(
            keys::HIGHER_LOWS,
            Some(higher_lows(candles, periods.higher_lows_lookback) as f64),
        );
        snap.set_flag(
            keys::VOLUME_EXPANDING,
            volume_expanding(candles, periods.volume_expansion_days),
        );
        // Consolidation is judged on the candles before today's breakout.
        let before_today = &candles[..candles.len() - 1];
        snap.set_flag(
            keys::CONSOLIDATION,
            is_consolidating(
                before_today,
                periods.consolidation_days,
                periods.consolidation_max_range_pct,
            ),
        );
        snap.set_flag(keys::BULLISH_ENGULFING, bullish_engulfing(candles));
    }

    snap
}

/// Weekly-timeframe snapshot.
pub fn weekly_snapshot(candles: &[Candle], periods: &Periods) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot::new();
    snap.set(keys::CLOSE, candles.last().map(|c| c.close));
    snap.set(
        keys::EMA_FAST,
        Ema::new(periods.weekly_ema_fast).latest(candles),
    );
    snap.set(
        keys::EMA_MID,
        Ema::new(periods.weekly_ema_slow).latest(candles),
    );
    snap.set(keys::RSI, Rsi::new(periods.weekly_rsi).latest(candles));
    snap
}

/// Intraday snapshot over the confirmation window of the latest session.
///
/// The session is the calendar date of the last candle. Window metrics stay
/// undefined when the window holds fewer than `vwap_candles` candles.
pub fn intraday_snapshot(candles: &[Candle], params: &IntradayParams) -> IndicatorSnapshot {
    let mut snap = IndicatorSnapshot::new();
    let Some(last) = candles.last() else {
        return snap;
    };
    let session = last.date();

    let vwap = Vwap::new().compute(candles);
    let window: Vec<usize> = candles
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.date() == session && c.time() >= params.window_start && c.time() <= params.window_end
        })
        .map(|(i, _)| i)
        .collect();

    snap.set(keys::WINDOW_CANDLES, Some(window.len() as f64));
    if window.is_empty() || window.len() < params.vwap_candles {
        return snap;
    }

    let latest = window[window.len() - 1];
    snap.set(keys::CLOSE, Some(candles[latest].close));
    snap.set(keys::VWAP, Some(vwap[latest]));

    let leading = &window[..params.vwap_candles];
    if leading.iter().all(|&i| vwap[i].is_finite()) {
        let held = leading
            .iter()
            .filter(|&&i| candles[i].low >= vwap[i])
            .count();
        snap.set(keys::VWAP_HOLD, Some(held as f64));
    }
    let max_wick = leading
        .iter()
        .map(|&i| upper_wick_ratio(&candles[i]))
        .fold(0.0, f64::max);
    snap.set(keys::MAX_UPPER_WICK, Some(max_wick));

    let start = latest.saturating_sub(params.volume_avg);
    let preceding = &candles[start..latest];
    if !preceding.is_empty() {
        let avg = preceding.iter().map(|c| c.volume as f64).sum::<f64>() / preceding.len() as f64;
        if avg > 0.0 {
            snap.set(
                keys::VOLUME_SPIKE,
                Some(candles[latest].volume as f64 / avg),
            );
        }
    }

    snap
}
