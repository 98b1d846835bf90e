//! Intraday confirmation over the opening window of the current session.

use super::{Filter, Rule, Threshold};
use crate::domain::Timeframe;
use crate::snapshot::keys;

pub const ABOVE_VWAP: &str = "above-vwap";
pub const VWAP_HOLD: &str = "vwap-hold";
pub const UPPER_WICK: &str = "upper-wick";
pub const VOLUME_SPIKE: &str = "volume-spike";

pub fn filters() -> Vec<Filter> {
    let stage = Timeframe::Intraday;
    vec![
        Filter::mandatory(
            ABOVE_VWAP,
            stage,
            Rule::Above {
                metric: keys::CLOSE,
                reference: keys::VWAP,
            },
        ),
        Filter::mandatory(
            VWAP_HOLD,
            stage,
            Rule::AtLeast {
                metric: keys::VWAP_HOLD,
                bound: Threshold::VwapHoldCandles,
            },
        ),
        Filter::mandatory(
            UPPER_WICK,
            stage,
            Rule::AtMost {
                metric: keys::MAX_UPPER_WICK,
                bound: Threshold::MaxUpperWick,
            },
        ),
        Filter::mandatory(
            VOLUME_SPIKE,
            stage,
            Rule::AtLeast {
                metric: keys::VOLUME_SPIKE,
                bound: Threshold::IntradayVolumeMin,
            },
        ),
    ]
}
