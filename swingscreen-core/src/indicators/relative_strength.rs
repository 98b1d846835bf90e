//! Relative strength against a benchmark.
//!
//! Both returns use close[t] against close[t - window + 1], so a window of 20
//! spans twenty candles inclusive.

use crate::domain::Candle;

/// Percentage return over the last `window` candles.
pub fn pct_return(candles: &[Candle], window: usize) -> Option<f64> {
    let n = candles.len();
    if window < 2 || n < window {
        return None;
    }
    let start = candles[n - window].close;
    let end = candles[n - 1].close;
    if start <= 0.0 || !start.is_finite() || !end.is_finite() {
        return None;
    }
    Some((end - start) / start * 100.0)
}

/// Symbol return minus benchmark return over the same window.
///
/// Positive means the symbol outperformed.
pub fn relative_strength(candles: &[Candle], benchmark_return: f64, window: usize) -> Option<f64> {
    if !benchmark_return.is_finite() {
        return None;
    }
    pct_return(candles, window).map(|r| r - benchmark_return)
}
