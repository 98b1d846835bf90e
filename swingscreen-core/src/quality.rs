//! Trade-quality validation of a qualified candidate's setup.
//!
//! Checks run in a fixed order (stop distance, risk:reward, resistance,
//! support) and stop at the first failure. Metrics computed before the
//! failure are kept on the report.

use crate::config::Thresholds;
use crate::market::SupportResistance;
use crate::setup::TradeSetup;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityCheck {
    StopTooTight,
    StopTooWide,
    RiskReward,
    NearResistance,
    FarFromSupport,
    NoTradeSetup,
}

impl QualityCheck {
    pub fn code(&self) -> &'static str {
        match self {
            QualityCheck::StopTooTight => "stop-too-tight",
            QualityCheck::StopTooWide => "stop-too-wide",
            QualityCheck::RiskReward => "risk-reward",
            QualityCheck::NearResistance => "near-resistance",
            QualityCheck::FarFromSupport => "far-from-support",
            QualityCheck::NoTradeSetup => "no-trade-setup",
        }
    }
}

impl fmt::Display for QualityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityFailure {
    pub check: QualityCheck,
    pub observed: Option<f64>,
    pub limit: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub stop_distance_pct: Option<f64>,
    pub risk_reward: Option<f64>,
    pub resistance_distance_pct: Option<f64>,
    pub support_distance_pct: Option<f64>,
    pub failure: Option<QualityFailure>,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    fn fail(mut self, check: QualityCheck, observed: Option<f64>, limit: f64) -> Self {
        self.failure = Some(QualityFailure {
            check,
            observed,
            limit: Some(limit),
        });
        self
    }
}

/// Validate a setup against the stop, reward and S/R bounds.
///
/// S/R checks only apply when the corresponding level exists.
pub fn validate(
    setup: Option<&TradeSetup>,
    levels: &SupportResistance,
    thresholds: &Thresholds,
) -> QualityReport {
    let mut report = QualityReport::default();
    let Some(setup) = setup else {
        report.failure = Some(QualityFailure {
            check: QualityCheck::NoTradeSetup,
            observed: None,
            limit: None,
        });
        return report;
    };

    let stop = setup.stop_distance_pct();
    report.stop_distance_pct = Some(stop);
    if stop < thresholds.min_stop_pct {
        return report.fail(QualityCheck::StopTooTight, Some(stop), thresholds.min_stop_pct);
    }
    if stop > thresholds.max_stop_pct {
        return report.fail(QualityCheck::StopTooWide, Some(stop), thresholds.max_stop_pct);
    }

    report.risk_reward = setup.risk_reward();
    match report.risk_reward {
        Some(rr) if rr + RR_TOLERANCE >= thresholds.min_risk_reward => {}
        observed => {
            return report.fail(QualityCheck::RiskReward, observed, thresholds.min_risk_reward);
        }
    }

    report.resistance_distance_pct = levels.resistance_distance_pct;
    if let Some(distance) = levels.resistance_distance_pct {
        if distance < thresholds.min_resistance_pct {
            return report.fail(
                QualityCheck::NearResistance,
                Some(distance),
                thresholds.min_resistance_pct,
            );
        }
    }

    report.support_distance_pct = levels.support_distance_pct;
    if let Some(distance) = levels.support_distance_pct {
        if distance > thresholds.max_support_pct {
            return report.fail(
                QualityCheck::FarFromSupport,
                Some(distance),
                thresholds.max_support_pct,
            );
        }
    }

    report
}

/// Slack for reward:risk rebuilt from prices. A target placed at exactly the
/// minimum multiple can come back a few ulps short.
const RR_TOLERANCE: f64 = 1e-9;
