//! Weekly confirmation: the weekly EMA stack must agree with the daily trend.

use super::{Filter, Rule, Threshold};
use crate::domain::Timeframe;
use crate::snapshot::keys;

pub const WEEKLY_ALIGNMENT: &str = "weekly-alignment";
pub const WEEKLY_RSI: &str = "weekly-rsi";

pub fn filters() -> Vec<Filter> {
    vec![
        Filter::mandatory(
            WEEKLY_ALIGNMENT,
            Timeframe::Weekly,
            Rule::Ordered {
                metrics: &[keys::CLOSE, keys::EMA_FAST, keys::EMA_MID],
            },
        ),
        // Outside the band is a warning only.
        Filter::informational(
            WEEKLY_RSI,
            Timeframe::Weekly,
            Rule::Within {
                metric: keys::RSI,
                low: Threshold::WeeklyRsiMin,
                high: Threshold::WeeklyRsiMax,
                inclusive: false,
            },
        ),
    ]
}
