//! Indicator library.
//!
//! Series indicators implement [`Indicator`] and return one value per candle
//! with a NaN warmup. Scalar primitives (ratios, price-action checks, relative
//! strength) are free functions over candle slices that return `Option<f64>`
//! when the input is too short to answer.
//!
//! # Look-ahead contamination guard
//! No value at candle t may depend on candle t+1 or later. Every series
//! indicator must pass the truncated-vs-full series test.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod price_action;
pub mod relative_strength;
pub mod rsi;
pub mod sma;
pub mod vwap;

pub use adx::Adx;
pub use atr::Atr;
pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;
pub use vwap::Vwap;

use crate::domain::Candle;

/// A series indicator over an ordered candle sequence.
///
/// `compute` returns a vector of the same length as the input. The first
/// `lookback()` values are `f64::NAN`.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "atr_14").
    fn name(&self) -> &str;

    /// Index of the first value the indicator can produce.
    fn lookback(&self) -> usize;

    /// Candles required before the latest value counts as defined.
    ///
    /// Smoothed indicators override this when the first computable value is
    /// not yet stable.
    fn min_history(&self) -> usize {
        self.lookback() + 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64>;

    /// Value at the most recent candle, or `None` when history is short or
    /// the value is not finite.
    fn latest(&self, candles: &[Candle]) -> Option<f64> {
        if candles.len() < self.min_history() {
            return None;
        }
        last_finite(&self.compute(candles))
    }
}

/// Last element of a series if it is finite.
pub fn last_finite(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| v.is_finite())
}

/// Value `back` positions before the last element, if finite.
pub fn finite_at_back(series: &[f64], back: usize) -> Option<f64> {
    let n = series.len();
    if back >= n {
        return None;
    }
    Some(series[n - 1 - back]).filter(|v| v.is_finite())
}

/// Daily candles from close prices for testing.
///
/// open = previous close (or close for the first candle), high/low one point
/// outside the body, volume 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::on_date(
                base_date + chrono::Duration::days(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000,
            )
        })
        .collect()
}

/// Daily candles from (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Candle::on_date(
                base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                1000,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
