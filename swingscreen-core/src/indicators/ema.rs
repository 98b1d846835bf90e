//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[period-1] = SMA of first `period` close values.
//! Lookback: period - 1.

use super::{finite_at_back, Indicator};
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        ema_of_series(&closes, self.period)
    }
}

/// EMA of an arbitrary series. NaN in the seed window leaves the whole output
/// NaN; NaN after the seed taints everything from that point on.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let mut sum = 0.0;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

/// EMA[t] - EMA[t-window]. Positive means the average is rising.
pub fn ema_slope(series: &[f64], window: usize) -> Option<f64> {
    if window == 0 {
        return None;
    }
    let now = finite_at_back(series, 0)?;
    let then = finite_at_back(series, window)?;
    Some(now - then)
}

/// Slope as percent of the earlier value, per candle.
pub fn ema_slope_pct(series: &[f64], window: usize) -> Option<f64> {
    let then = finite_at_back(series, window)?;
    if then == 0.0 {
        return None;
    }
    let diff = ema_slope(series, window)?;
    Some(diff / then * 100.0 / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let candles = make_candles(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&candles);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed SMA(10,11,12) = 11
        // EMA[3] = 0.5*13 + 0.5*11 = 12, EMA[4] = 0.5*14 + 0.5*12 = 13
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&candles);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_in_seed_produces_all_nan() {
        let result = ema_of_series(&[10.0, f64::NAN, 12.0, 13.0, 14.0], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_nan_after_seed_propagates() {
        let result = ema_of_series(&[10.0, 11.0, 12.0, f64::NAN, 14.0], 3);
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn ema_200_undefined_below_200_candles() {
        let closes: Vec<f64> = (0..199).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        assert_eq!(Ema::new(200).latest(&candles), None);

        let closes: Vec<f64> = (0..200).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        assert!(Ema::new(200).latest(&candles).is_some());
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 19);
        assert_eq!(Ema::new(1).lookback(), 0);
    }

    #[test]
    fn slope_sign_follows_direction() {
        let rising = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let falling = [6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        assert_approx(ema_slope(&rising, 5).unwrap(), 5.0, DEFAULT_EPSILON);
        assert!(ema_slope(&falling, 5).unwrap() < 0.0);
    }

    #[test]
    fn slope_pct_per_candle() {
        // (110 - 100) / 100 * 100 / 5 = 2% per candle
        let series = [100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        assert_approx(ema_slope_pct(&series, 5).unwrap(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn slope_undefined_in_warmup() {
        let series = [f64::NAN, f64::NAN, 3.0, 4.0];
        assert_eq!(ema_slope(&series, 3), None);
        assert_eq!(ema_slope(&series, 4), None);
    }
}
