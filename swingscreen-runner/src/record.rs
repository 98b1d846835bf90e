//! Published result records: one [`StockRecord`] per selected candidate and
//! a [`DailyResults`] file per run. Field names are part of the file format.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use swingscreen_core::candidate::Candidate;
use swingscreen_core::cascade::{daily, intraday};
use swingscreen_core::domain::Timeframe;
use swingscreen_core::market::{MarketContext, MarketSentiment, WeeklyTrend};
use swingscreen_core::scoring::ScoreBreakdown;
use swingscreen_core::setup::TradeSetup;
use swingscreen_core::snapshot::keys;

use crate::pipeline::ScreenReport;

pub const ENTRY_REASON: &str = "trend + momentum continuation";
const SKIPPED: &str = "test_mode";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub daily_trend: bool,
    pub above_200ema: bool,
    #[serde(rename = "ADX")]
    pub adx: f64,
    #[serde(rename = "RSI")]
    pub rsi: f64,
    #[serde(rename = "ATR_ratio")]
    pub atr_ratio: f64,
    pub relative_strength: f64,
    pub volume_confirmed: bool,
    pub intraday_bias: String,
    pub weekly_trend: String,
    pub final_score: f64,
    pub entry_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_setup: Option<TradeSetup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_analysis: Option<MarketContext>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl StockRecord {
    /// Record for a scored candidate; `None` for anything unscored.
    pub fn from_candidate(candidate: &Candidate) -> Option<Self> {
        let score = candidate.score?;
        let passed = |name: &str| {
            candidate
                .outcomes
                .iter()
                .any(|o| o.filter_name == name && o.passed)
        };
        let metric = |key: &str| {
            candidate
                .snapshots
                .daily
                .as_ref()
                .and_then(|s| s.get(key))
                .map_or(0.0, round2)
        };
        let intraday_evaluated = candidate
            .outcomes
            .iter()
            .any(|o| o.stage == Timeframe::Intraday);
        let weekly_trend = match candidate.weekly_trend {
            WeeklyTrend::Unknown if candidate.snapshots.weekly.is_none() => SKIPPED.to_string(),
            trend => serde_json::to_value(trend)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
        };

        Some(Self {
            symbol: candidate.symbol.clone(),
            daily_trend: passed(daily::EMA_ALIGNMENT),
            above_200ema: passed(daily::PRICE_ABOVE_EMA200),
            adx: metric(keys::ADX),
            rsi: metric(keys::RSI),
            atr_ratio: metric(keys::ATR_RATIO),
            relative_strength: metric(keys::RELATIVE_STRENGTH),
            // Intraday volume spike confirms when that stage ran.
            volume_confirmed: if intraday_evaluated {
                passed(intraday::VOLUME_SPIKE)
            } else {
                passed(daily::VOLUME)
            },
            intraday_bias: if intraday_evaluated { "bullish" } else { SKIPPED }.to_string(),
            weekly_trend,
            final_score: score.total,
            entry_reason: ENTRY_REASON.to_string(),
            score_breakdown: Some(score),
            trade_setup: candidate.setup,
            market_analysis: candidate.market,
        })
    }
}

/// Contents of `results/<date>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResults {
    pub date: NaiveDate,
    pub timestamp: NaiveDateTime,
    pub total_selected: usize,
    pub market_sentiment: Option<MarketSentiment>,
    pub stocks: Vec<StockRecord>,
}

impl DailyResults {
    pub fn from_report(report: &ScreenReport, timestamp: NaiveDateTime) -> Self {
        let stocks: Vec<StockRecord> = report
            .selected
            .iter()
            .filter_map(StockRecord::from_candidate)
            .collect();
        Self {
            date: report.as_of.unwrap_or_else(|| timestamp.date()),
            timestamp,
            total_selected: stocks.len(),
            market_sentiment: report.market_sentiment.clone(),
            stocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swingscreen_core::candidate::CandidateStatus;
    use swingscreen_core::cascade::FilterOutcome;
    use swingscreen_core::snapshot::{IndicatorSnapshot, TimeframeSnapshots};

    fn pass(name: &str, stage: Timeframe) -> FilterOutcome {
        FilterOutcome {
            filter_name: name.into(),
            stage,
            mandatory: true,
            passed: true,
            observed: Some(1.0),
            threshold: Some(0.0),
        }
    }

    fn scored_candidate() -> Candidate {
        let mut daily_snap = IndicatorSnapshot::new();
        daily_snap.set(keys::ADX, Some(27.456));
        daily_snap.set(keys::RSI, Some(55.111));
        daily_snap.set(keys::ATR_RATIO, Some(1.234));
        daily_snap.set(keys::RELATIVE_STRENGTH, Some(4.567));
        Candidate {
            symbol: "TCS".into(),
            snapshots: TimeframeSnapshots {
                daily: Some(daily_snap),
                weekly: Some(IndicatorSnapshot::new()),
                intraday: None,
            },
            outcomes: vec![
                pass(daily::PRICE_ABOVE_EMA200, Timeframe::Daily),
                pass(daily::EMA_ALIGNMENT, Timeframe::Daily),
                pass(daily::VOLUME, Timeframe::Daily),
            ],
            status: CandidateStatus::Qualified,
            setup: None,
            quality: None,
            market: None,
            weekly_trend: WeeklyTrend::BullishRsiWarning,
            score: Some(ScoreBreakdown {
                total: 81.25,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn record_uses_published_field_names() {
        let record = StockRecord::from_candidate(&scored_candidate()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["ADX"], 27.46);
        assert_eq!(json["RSI"], 55.11);
        assert_eq!(json["ATR_ratio"], 1.23);
        assert_eq!(json["relative_strength"], 4.57);
        assert_eq!(json["daily_trend"], true);
        assert_eq!(json["volume_confirmed"], true);
        assert_eq!(json["intraday_bias"], "test_mode");
        assert_eq!(json["weekly_trend"], "Bullish (RSI warning)");
        assert_eq!(json["final_score"], 81.25);
        assert_eq!(json["entry_reason"], ENTRY_REASON);
        assert!(json.get("trade_setup").is_none());
    }

    #[test]
    fn unscored_candidate_has_no_record() {
        let mut candidate = scored_candidate();
        candidate.score = None;
        assert!(StockRecord::from_candidate(&candidate).is_none());
    }

    #[test]
    fn volume_confirmation_follows_intraday_spike() {
        let mut candidate = scored_candidate();
        candidate
            .outcomes
            .push(pass(intraday::ABOVE_VWAP, Timeframe::Intraday));
        let mut spike = pass(intraday::VOLUME_SPIKE, Timeframe::Intraday);
        spike.passed = false;
        candidate.outcomes.push(spike);

        let record = StockRecord::from_candidate(&candidate).unwrap();
        assert_eq!(record.intraday_bias, "bullish");
        assert!(!record.volume_confirmed);

        candidate.outcomes.last_mut().unwrap().passed = true;
        let record = StockRecord::from_candidate(&candidate).unwrap();
        assert!(record.volume_confirmed);
    }
}
