//! Market context: previous-day levels, opening gap, swing-point
//! support/resistance and benchmark sentiment.

use crate::domain::Candle;
use crate::snapshot::{keys, IndicatorSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrevDay {
    pub prev_high: f64,
    pub prev_low: f64,
    pub prev_close: f64,
    pub prev_volume: u64,
}

/// The daily series is expected to end with today's candle, so the previous
/// session is the second-to-last one.
pub fn previous_day(daily: &[Candle]) -> Option<PrevDay> {
    let [.., prev, _] = daily else {
        return None;
    };
    Some(PrevDay {
        prev_high: prev.high,
        prev_low: prev.low,
        prev_close: prev.close,
        prev_volume: prev.volume,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapType {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    Bullish,
    Flat,
    Bearish,
    #[serde(rename = "Strong Bearish")]
    StrongBearish,
}

impl GapType {
    pub fn classify(gap_pct: f64) -> Self {
        if gap_pct > 2.0 {
            GapType::StrongBullish
        } else if gap_pct > 0.5 {
            GapType::Bullish
        } else if gap_pct > -0.5 {
            GapType::Flat
        } else if gap_pct > -2.0 {
            GapType::Bearish
        } else {
            GapType::StrongBearish
        }
    }
}

impl fmt::Display for GapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GapType::StrongBullish => "Strong Bullish",
            GapType::Bullish => "Bullish",
            GapType::Flat => "Flat",
            GapType::Bearish => "Bearish",
            GapType::StrongBearish => "Strong Bearish",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub gap_pct: f64,
    pub gap_type: GapType,
    pub prev_close: f64,
    pub today_open: f64,
}

/// Today's open against yesterday's close.
///
/// Today's open is the first intraday candle of the latest session when
/// intraday candles exist, otherwise the last daily open.
pub fn gap(daily: &[Candle], intraday: &[Candle]) -> Option<Gap> {
    let prev_close = previous_day(daily)?.prev_close;
    if prev_close <= 0.0 {
        return None;
    }
    let today_open = match intraday.last() {
        Some(last) => intraday.iter().find(|c| c.date() == last.date())?.open,
        None => daily.last()?.open,
    };
    let gap_pct = (today_open - prev_close) / prev_close * 100.0;
    Some(Gap {
        gap_pct,
        gap_type: GapType::classify(gap_pct),
        prev_close,
        today_open,
    })
}

/// Nearest swing levels around the current price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_distance_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance_distance_pct: Option<f64>,
}

/// Swing highs/lows (strict extreme against two candles each side) over the
/// last `lookback` daily candles. Levels absent when history is shorter than
/// the lookback or no swing point lies on the right side of the price.
pub fn support_resistance(daily: &[Candle], current_price: f64, lookback: usize) -> SupportResistance {
    let mut levels = SupportResistance::default();
    if daily.len() < lookback || lookback < 5 || current_price <= 0.0 {
        return levels;
    }
    let recent = &daily[daily.len() - lookback..];

    let mut swing_highs = Vec::new();
    let mut swing_lows = Vec::new();
    for i in 2..recent.len() - 2 {
        let neighbours = [i - 2, i - 1, i + 1, i + 2];
        if neighbours.iter().all(|&j| recent[i].high > recent[j].high) {
            swing_highs.push(recent[i].high);
        }
        if neighbours.iter().all(|&j| recent[i].low < recent[j].low) {
            swing_lows.push(recent[i].low);
        }
    }

    levels.resistance = swing_highs
        .into_iter()
        .filter(|&h| h > current_price)
        .reduce(f64::min);
    levels.support = swing_lows
        .into_iter()
        .filter(|&l| l < current_price)
        .reduce(f64::max);

    levels.resistance_distance_pct = levels
        .resistance
        .map(|r| (r - current_price) / current_price * 100.0);
    levels.support_distance_pct = levels
        .support
        .map(|s| (current_price - s) / current_price * 100.0);
    levels
}

/// Where the current price sits against the previous session's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLocation {
    AbovePrevHigh,
    BelowPrevLow,
    AbovePrevClose,
    BelowPrevClose,
    AtPrevClose,
}

impl PriceLocation {
    pub fn locate(current_price: f64, prev: &PrevDay) -> Self {
        if current_price > prev.prev_high {
            PriceLocation::AbovePrevHigh
        } else if current_price < prev.prev_low {
            PriceLocation::BelowPrevLow
        } else if current_price > prev.prev_close {
            PriceLocation::AbovePrevClose
        } else if current_price < prev.prev_close {
            PriceLocation::BelowPrevClose
        } else {
            PriceLocation::AtPrevClose
        }
    }
}

impl fmt::Display for PriceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PriceLocation::AbovePrevHigh => "Above prev high (breakout)",
            PriceLocation::BelowPrevLow => "Below prev low (breakdown)",
            PriceLocation::AbovePrevClose => "Above prev close (bullish)",
            PriceLocation::BelowPrevClose => "Below prev close (bearish)",
            PriceLocation::AtPrevClose => "At prev close (neutral)",
        })
    }
}

/// Per-symbol market context consumed by the quality validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub current_price: f64,
    pub prev_day: Option<PrevDay>,
    pub gap: Option<Gap>,
    pub sr_levels: SupportResistance,
    pub price_location: Option<PriceLocation>,
}

/// Build the context from a symbol's daily and (possibly empty) intraday
/// candles. `None` when there are no daily candles.
pub fn analyze(daily: &[Candle], intraday: &[Candle], sr_lookback: usize) -> Option<MarketContext> {
    let current_price = intraday.last().or(daily.last())?.close;
    let prev_day = previous_day(daily);
    Some(MarketContext {
        current_price,
        prev_day,
        gap: gap(daily, intraday),
        sr_levels: support_resistance(daily, current_price, sr_lookback),
        price_location: prev_day.map(|p| PriceLocation::locate(current_price, &p)),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    #[serde(rename = "Strong Bearish")]
    StrongBearish,
}

impl Sentiment {
    pub fn classify(day_change_pct: f64) -> Self {
        if day_change_pct > 1.0 {
            Sentiment::StrongBullish
        } else if day_change_pct > 0.3 {
            Sentiment::Bullish
        } else if day_change_pct > -0.3 {
            Sentiment::Neutral
        } else if day_change_pct > -1.0 {
            Sentiment::Bearish
        } else {
            Sentiment::StrongBearish
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Sentiment::StrongBullish => "Full confidence - good day for longs",
            Sentiment::Bullish => "Favorable for trades",
            Sentiment::Neutral => "Be selective",
            Sentiment::Bearish => "Reduce position sizes",
            Sentiment::StrongBearish => "Avoid new longs - sit out",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::StrongBullish => "Strong Bullish",
            Sentiment::Bullish => "Bullish",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bearish => "Bearish",
            Sentiment::StrongBearish => "Strong Bearish",
        })
    }
}

/// Benchmark mood for the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSentiment {
    pub gap_pct: f64,
    pub gap_type: GapType,
    pub day_change_pct: f64,
    pub sentiment: Sentiment,
    pub recommendation: String,
    pub current_price: f64,
}

pub fn market_sentiment(daily: &[Candle], intraday: &[Candle]) -> Option<MarketSentiment> {
    let gap = gap(daily, intraday)?;
    let current_price = intraday.last().or(daily.last())?.close;
    let day_change_pct = (current_price - gap.prev_close) / gap.prev_close * 100.0;
    let sentiment = Sentiment::classify(day_change_pct);
    Some(MarketSentiment {
        gap_pct: gap.gap_pct,
        gap_type: gap.gap_type,
        day_change_pct,
        sentiment,
        recommendation: sentiment.recommendation().to_string(),
        current_price,
    })
}

/// Weekly trend label shown alongside a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeeklyTrend {
    Bullish,
    #[serde(rename = "Bullish (RSI warning)")]
    BullishRsiWarning,
    #[serde(rename = "Not Bullish")]
    NotBullish,
    Unknown,
}

impl WeeklyTrend {
    /// Classify from a weekly snapshot: the EMA stack decides, RSI outside
    /// `(rsi_min, rsi_max)` only downgrades to a warning.
    pub fn from_snapshot(snapshot: Option<&IndicatorSnapshot>, rsi_min: f64, rsi_max: f64) -> Self {
        let Some(snap) = snapshot else {
            return WeeklyTrend::Unknown;
        };
        let stack = (
            snap.get(keys::CLOSE),
            snap.get(keys::EMA_FAST),
            snap.get(keys::EMA_MID),
        );
        let (Some(close), Some(fast), Some(mid)) = stack else {
            return WeeklyTrend::Unknown;
        };
        if !(close > fast && fast > mid) {
            return WeeklyTrend::NotBullish;
        }
        match snap.get(keys::RSI) {
            Some(rsi) if rsi > rsi_min && rsi < rsi_max => WeeklyTrend::Bullish,
            _ => WeeklyTrend::BullishRsiWarning,
        }
    }

    pub fn suitable_for_swing(&self) -> bool {
        matches!(self, WeeklyTrend::Bullish | WeeklyTrend::BullishRsiWarning)
    }
}
