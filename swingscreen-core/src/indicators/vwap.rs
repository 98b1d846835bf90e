//! Volume Weighted Average Price (VWAP).
//!
//! Cumulative (typical price × volume) / cumulative volume, reset at the
//! first candle of each session (calendar date). Zero cumulative volume
//! leaves the value undefined.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut result = vec![f64::NAN; candles.len()];
        let mut cum_pv = 0.0;
        let mut cum_vol = 0.0;

        for (i, candle) in candles.iter().enumerate() {
            if i == 0 || candle.date() != candles[i - 1].date() {
                cum_pv = 0.0;
                cum_vol = 0.0;
            }
            let volume = candle.volume as f64;
            cum_pv += candle.typical_price() * volume;
            cum_vol += volume;
            if cum_vol > 0.0 {
                result[i] = cum_pv / cum_vol;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn candle(ts: NaiveDateTime, high: f64, low: f64, close: f64, volume: u64) -> Candle {
        Candle::new(ts, low, high, low, close, volume)
    }

    #[test]
    fn vwap_weights_by_volume() {
        // typical prices 10 and 20, volumes 1 and 3 → (10 + 60) / 4 = 17.5
        let candles = [
            candle(at(4, 9, 15), 11.0, 9.0, 10.0, 1),
            candle(at(4, 9, 30), 21.0, 19.0, 20.0, 3),
        ];
        let result = Vwap::new().compute(&candles);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 17.5, DEFAULT_EPSILON);
    }

    #[test]
    fn vwap_resets_each_session() {
        let candles = [
            candle(at(4, 15, 15), 11.0, 9.0, 10.0, 100),
            candle(at(5, 9, 15), 31.0, 29.0, 30.0, 5),
        ];
        let result = Vwap::new().compute(&candles);
        assert_approx(result[1], 30.0, DEFAULT_EPSILON);
    }

    #[test]
    fn vwap_zero_volume_is_undefined() {
        let candles = [
            candle(at(4, 9, 15), 11.0, 9.0, 10.0, 0),
            candle(at(4, 9, 30), 11.0, 9.0, 10.0, 0),
        ];
        let result = Vwap::new().compute(&candles);
        assert!(result.iter().all(|v| v.is_nan()));
        assert_eq!(Vwap::new().latest(&candles), None);
    }
}
