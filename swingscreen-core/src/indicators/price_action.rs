//! Price-action primitives over the most recent candles.

use super::sma::trailing_mean;
use crate::domain::Candle;

/// Consecutive strictly-higher lows ending at the most recent candle.
///
/// Walks backward from the last candle, comparing each low with the one
/// before it, and stops at the first non-increase or after `lookback`
/// candles have been examined.
pub fn higher_lows(candles: &[Candle], lookback: usize) -> usize {
    let window = lookback.min(candles.len());
    if window < 2 {
        return 0;
    }
    let recent = &candles[candles.len() - window..];
    recent
        .windows(2)
        .rev()
        .take_while(|pair| pair[1].low > pair[0].low)
        .count()
}

/// Upper wick as a fraction of the candle range. Zero-range candles score 0.
pub fn upper_wick_ratio(candle: &Candle) -> f64 {
    let range = candle.range();
    if range <= 0.0 {
        return 0.0;
    }
    candle.upper_wick() / range
}

/// Current volume over the mean of the previous `avg_period` volumes.
pub fn volume_ratio(candles: &[Candle], avg_period: usize) -> Option<f64> {
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume as f64).collect();
    let avg = trailing_mean(&volumes, avg_period)?;
    if avg == 0.0 {
        return None;
    }
    volumes.last().map(|v| v / avg)
}

/// Lowest low over the last `window` candles (or all of them if fewer).
pub fn swing_low(candles: &[Candle], window: usize) -> Option<f64> {
    let start = candles.len().saturating_sub(window);
    candles[start..]
        .iter()
        .map(|c| c.low)
        .fold(None, |acc: Option<f64>, low| Some(acc.map_or(low, |a| a.min(low))))
}

/// Whether the high-low envelope of the last `days` candles stays within
/// `max_range_pct` percent of the lowest low.
pub fn is_consolidating(candles: &[Candle], days: usize, max_range_pct: f64) -> bool {
    if days == 0 || candles.len() < days {
        return false;
    }
    let recent = &candles[candles.len() - days..];
    let high = recent.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = recent.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    if low <= 0.0 {
        return false;
    }
    (high - low) / low * 100.0 <= max_range_pct
}

/// Strictly rising volume across the last `days` candles.
pub fn volume_expanding(candles: &[Candle], days: usize) -> bool {
    if days < 2 || candles.len() < days {
        return false;
    }
    candles[candles.len() - days..]
        .windows(2)
        .all(|pair| pair[1].volume > pair[0].volume)
}

/// Bearish candle followed by a bullish candle whose body covers it.
pub fn bullish_engulfing(candles: &[Candle]) -> bool {
    let [.., prev, curr] = candles else {
        return false;
    };
    prev.is_bearish() && curr.is_bullish() && curr.open <= prev.close && curr.close >= prev.open
}
