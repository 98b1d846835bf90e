//! Candle, the fundamental market data unit.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// OHLCV candle for one symbol on one timeframe.
///
/// Daily and weekly candles carry a midnight timestamp; intraday candles carry
/// the candle's open time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Daily/weekly candle stamped at midnight of `date`.
    pub fn on_date(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self::new(date.and_time(NaiveTime::MIN), open, high, low, close, volume)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Basic OHLC sanity: finite, positive prices, high/low enclose open/close.
    pub fn is_sane(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// The three timeframes the screen evaluates, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Daily,
    Weekly,
    Intraday,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Daily, Timeframe::Weekly, Timeframe::Intraday];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Intraday => "intraday",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural problems with a candle sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("candle {index} fails OHLC sanity check")]
    NotSane { index: usize },

    #[error("candle {index} is not strictly after the previous candle ({timestamp})")]
    OutOfOrder {
        index: usize,
        timestamp: NaiveDateTime,
    },
}

/// Check that every candle is sane and timestamps strictly increase.
pub fn validate_series(candles: &[Candle]) -> Result<(), CandleError> {
    for (index, candle) in candles.iter().enumerate() {
        if !candle.is_sane() {
            return Err(CandleError::NotSane { index });
        }
        if index > 0 && candle.timestamp <= candles[index - 1].timestamp {
            return Err(CandleError::OutOfOrder {
                index,
                timestamp: candle.timestamp,
            });
        }
    }
    Ok(())
}
