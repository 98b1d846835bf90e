//! ADX: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive candles
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! DX is first defined at index `period`; ADX at `2 * period - 1`.

use super::atr::{true_range, wilder_smooth};
use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        if n < 2 {
            return vec![f64::NAN; n];
        }

        let mut plus_dm = vec![f64::NAN; n];
        let mut minus_dm = vec![f64::NAN; n];

        for i in 1..n {
            let up_move = candles[i].high - candles[i - 1].high;
            let down_move = candles[i - 1].low - candles[i].low;

            plus_dm[i] = if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            };
            minus_dm[i] = if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            };
        }

        // TR[0] is aligned with the missing DM[0] so all three seeds line up.
        let mut tr = true_range(candles);
        tr[0] = f64::NAN;

        let smooth_tr = wilder_smooth(&tr, self.period);
        let smooth_plus_dm = wilder_smooth(&plus_dm, self.period);
        let smooth_minus_dm = wilder_smooth(&minus_dm, self.period);

        let mut dx = vec![f64::NAN; n];
        for i in 0..n {
            if smooth_tr[i].is_nan()
                || smooth_plus_dm[i].is_nan()
                || smooth_minus_dm[i].is_nan()
                || smooth_tr[i] == 0.0
            {
                continue;
            }

            let plus_di = 100.0 * smooth_plus_dm[i] / smooth_tr[i];
            let minus_di = 100.0 * smooth_minus_dm[i] / smooth_tr[i];
            let di_sum = plus_di + minus_di;

            dx[i] = if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di - minus_di).abs() / di_sum
            };
        }

        wilder_smooth(&dx, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn choppy(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + ((i * 7) % 11) as f64).collect()
    }

    #[test]
    fn adx_bounds() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 8.0 + i as f64 * 0.2)
            .collect();
        let result = Adx::new(14).compute(&make_candles(&closes));
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "ADX out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn adx_first_value_at_lookback() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let result = Adx::new(5).compute(&make_candles(&closes));
        assert!(result[8].is_nan());
        assert!(!result[9].is_nan());
    }

    #[test]
    fn adx_strong_in_steady_trend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 2.0 * i as f64).collect();
        let adx = Adx::new(14).latest(&make_candles(&closes)).unwrap();
        assert!(adx > 50.0, "steady trend should produce high ADX, got {adx}");
    }

    #[test]
    fn adx_weak_in_chop() {
        let trend: Vec<f64> = (0..60).map(|i| 100.0 + 2.0 * i as f64).collect();
        let trend_adx = Adx::new(14).latest(&make_candles(&trend)).unwrap();
        let chop_adx = Adx::new(14).latest(&make_candles(&choppy(60))).unwrap();
        assert!(chop_adx < trend_adx);
    }

    #[test]
    fn adx_undefined_below_two_periods() {
        let closes: Vec<f64> = (0..27).map(|i| 100.0 + i as f64).collect();
        assert_eq!(Adx::new(14).latest(&make_candles(&closes)), None);
    }
}
