//! Simple Moving Average (SMA).
//!
//! Rolling mean over a window. Lookback: period - 1.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        sma_of_series(&closes, self.period)
    }
}

/// Rolling mean of an arbitrary series. A window containing NaN yields NaN.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

/// Mean of the `window` values immediately before the last one.
///
/// The current value is excluded so that a ratio against it measures
/// expansion relative to recent history.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    let n = values.len();
    if window == 0 || n < window + 1 {
        return None;
    }
    let slice = &values[n - 1 - window..n - 1];
    if slice.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(slice.iter().sum::<f64>() / window as f64)
}
