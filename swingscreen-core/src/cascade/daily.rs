//! Daily trend filters.
//!
//! Order matters for diagnostic reporting: the cheapest structural checks
//! (EMA stack) come first, momentum and participation after.

use super::{Filter, Rule, Threshold};
use crate::domain::Timeframe;
use crate::snapshot::keys;

pub const PRICE_ABOVE_EMA200: &str = "price-above-ema200";
pub const EMA_ALIGNMENT: &str = "ema-alignment";
pub const EMA_REGIME: &str = "ema-regime";
pub const EMA20_SLOPE: &str = "ema20-slope";
pub const ADX: &str = "adx";
pub const RSI_BAND: &str = "rsi-band";
pub const ATR_EXPANSION: &str = "atr-expansion";
pub const VOLUME: &str = "volume";
pub const RELATIVE_STRENGTH: &str = "relative-strength";
pub const HIGHER_LOWS: &str = "higher-lows";
pub const VOLUME_EXPANSION: &str = "volume-expansion";
pub const CONSOLIDATION_BREAKOUT: &str = "consolidation-breakout";
pub const BULLISH_ENGULFING: &str = "bullish-engulfing";

pub fn filters() -> Vec<Filter> {
    let stage = Timeframe::Daily;
    vec![
        Filter::mandatory(
            PRICE_ABOVE_EMA200,
            stage,
            Rule::Above {
                metric: keys::CLOSE,
                reference: keys::EMA_SLOW,
            },
        ),
        Filter::mandatory(
            EMA_ALIGNMENT,
            stage,
            Rule::Ordered {
                metrics: &[keys::CLOSE, keys::EMA_FAST, keys::EMA_MID],
            },
        ),
        Filter::mandatory(
            EMA_REGIME,
            stage,
            Rule::Above {
                metric: keys::EMA_MID,
                reference: keys::EMA_SLOW,
            },
        ),
        Filter::mandatory(
            EMA20_SLOPE,
            stage,
            Rule::Positive {
                metric: keys::EMA_FAST_SLOPE,
            },
        ),
        Filter::mandatory(
            ADX,
            stage,
            Rule::AtLeast {
                metric: keys::ADX,
                bound: Threshold::AdxMin,
            },
        ),
        Filter::mandatory(
            RSI_BAND,
            stage,
            Rule::Within {
                metric: keys::RSI,
                low: Threshold::RsiMin,
                high: Threshold::RsiMax,
                inclusive: true,
            },
        ),
        Filter::mandatory(
            ATR_EXPANSION,
            stage,
            Rule::AtLeast {
                metric: keys::ATR_RATIO,
                bound: Threshold::AtrRatioMin,
            },
        ),
        // Volume equal to the average passes; only a shortfall fails.
        Filter::mandatory(
            VOLUME,
            stage,
            Rule::AtLeast {
                metric: keys::VOLUME_RATIO,
                bound: Threshold::VolumeRatioMin,
            },
        ),
        Filter::mandatory(
            RELATIVE_STRENGTH,
            stage,
            Rule::Exceeds {
                metric: keys::RELATIVE_STRENGTH,
                bound: Threshold::RelativeStrengthMin,
            },
        ),
        Filter::mandatory(
            HIGHER_LOWS,
            stage,
            Rule::AtLeast {
                metric: keys::HIGHER_LOWS,
                bound: Threshold::HigherLowsMin,
            },
        ),
        Filter::informational(
            VOLUME_EXPANSION,
            stage,
            Rule::Flag {
                metric: keys::VOLUME_EXPANDING,
            },
        ),
        Filter::informational(
            CONSOLIDATION_BREAKOUT,
            stage,
            Rule::Flag {
                metric: keys::CONSOLIDATION,
            },
        ),
        Filter::informational(
            BULLISH_ENGULFING,
            stage,
            Rule::Flag {
                metric: keys::BULLISH_ENGULFING,
            },
        ),
    ]
}
