//! Plain-text console summaries.

use std::fmt::Write;

use swingscreen_core::candidate::Candidate;
use swingscreen_core::snapshot::keys;

use crate::diagnostics::Diagnostics;
use crate::pipeline::ScreenReport;

const RULE: &str = "------------------------------------------------------------";

pub fn render_report(report: &ScreenReport) -> String {
    let mut out = String::new();
    let date = report
        .as_of
        .map_or_else(|| "unknown date".to_string(), |d| d.to_string());
    let _ = writeln!(out, "SWING SCREEN  {date}");
    if report.has_synthetic {
        let _ = writeln!(out, "(synthetic data)");
    }

    if let Some(sentiment) = &report.market_sentiment {
        let _ = writeln!(
            out,
            "\nMarket: gap {:+.2}% ({}), today {:+.2}% {}: {}",
            sentiment.gap_pct,
            sentiment.gap_type,
            sentiment.day_change_pct,
            sentiment.sentiment,
            sentiment.recommendation
        );
    }

    let f = &report.funnel;
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "Symbols analysed:        {}", f.total);
    let _ = writeln!(out, "Valid data:              {}", f.valid_data);
    let _ = writeln!(out, "Passed daily filters:    {}", f.daily_passed);
    let _ = writeln!(out, "Passed weekly filters:   {}", f.weekly_passed);
    let _ = writeln!(out, "Passed intraday filters: {}", f.intraday_passed);
    let _ = writeln!(out, "Passed quality checks:   {}", f.quality_passed);
    let _ = writeln!(out, "Selected:                {}", f.selected);
    let _ = writeln!(out, "{RULE}");

    if report.selected.is_empty() {
        let _ = writeln!(out, "\nNo stocks selected today.");
        return out;
    }
    for (rank, candidate) in report.selected.iter().enumerate() {
        render_candidate(&mut out, rank + 1, candidate);
    }
    let _ = writeln!(out, "\n{RULE}");
    for note in TRADING_NOTES {
        let _ = writeln!(out, "- {note}");
    }
    out
}

const TRADING_NOTES: [&str; 4] = [
    "Enter near the 9 or 20 EMA on a pullback, not at the open.",
    "Place the stop at the listed level before the order fills.",
    "Skip names that gap more than 2% against the setup.",
    "Size each position so one stop-out costs under 1% of capital.",
];

fn render_candidate(out: &mut String, rank: usize, candidate: &Candidate) {
    let score = candidate.final_score().unwrap_or(0.0);
    let _ = writeln!(out, "\n#{rank} {}  score {score:.2}/100", candidate.symbol);
    if let Some(daily) = candidate.snapshots.daily.as_ref() {
        for (key, label) in [
            (keys::ADX, "ADX"),
            (keys::RSI, "RSI"),
            (keys::ATR_RATIO, "ATR ratio"),
            (keys::RELATIVE_STRENGTH, "Rel. strength"),
            (keys::VOLUME_RATIO, "Volume ratio"),
        ] {
            if let Some(value) = daily.get(key) {
                let _ = writeln!(out, "  {label:<14} {value:>8.2}");
            }
        }
    }
    let _ = writeln!(out, "  Weekly trend   {:?}", candidate.weekly_trend);

    if let Some(sr) = candidate.market.map(|m| m.sr_levels) {
        if let (Some(level), Some(pct)) = (sr.support, sr.support_distance_pct) {
            let _ = writeln!(out, "  Support        {level:.2} ({pct:.1}% below)");
        }
        if let (Some(level), Some(pct)) = (sr.resistance, sr.resistance_distance_pct) {
            let _ = writeln!(out, "  Resistance     {level:.2} ({pct:.1}% above)");
        }
    }
    if let Some(setup) = candidate.setup {
        let _ = writeln!(
            out,
            "  Entry {:.2} / {:.2}  stop {:.2} ({:?})  risk {:.2}",
            setup.ema9, setup.ema20, setup.stop_loss, setup.stop_method, setup.risk_ema9
        );
        if let Some(target) = setup.target_ema9 {
            let _ = writeln!(out, "  Target {target:.2} ({:.1}R)", setup.risk_reward_ratio);
        }
    }
}

pub fn render_diagnostics(diag: &Diagnostics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "FILTER DIAGNOSTICS  {} candidates, {} qualified",
        diag.candidates, diag.qualified
    );
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{:<24} {:<9} {:>5} {:>6} {:>6} {:>7}",
        "filter", "stage", "gate", "eval", "fail", "rate"
    );
    for s in &diag.filters {
        let _ = writeln!(
            out,
            "{:<24} {:<9} {:>5} {:>6} {:>6} {:>6.1}%",
            s.filter_name,
            s.stage,
            if s.mandatory { "yes" } else { "no" },
            s.evaluated,
            s.failed,
            s.failure_rate() * 100.0
        );
    }

    if !diag.reasons.is_empty() {
        let _ = writeln!(out, "\nDiscard reasons");
        let mut reasons: Vec<(&String, &usize)> = diag.reasons.iter().collect();
        reasons.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (code, count) in reasons {
            let _ = writeln!(out, "  {code:<28} {count:>4}");
        }
    }
    out
}
