//! Look-ahead contamination tests for the series indicators and snapshots.
//!
//! No indicator value at candle t may depend on candle t+1 or later.
//!
//! Method: compute on a truncated series (candles 0..150) and the full series
//! (candles 0..300). Values for candles 0..150 must be identical in both runs.

use chrono::NaiveDate;
use swingscreen_core::config::Periods;
use swingscreen_core::domain::Candle;
use swingscreen_core::indicators::*;
use swingscreen_core::snapshot::{daily_snapshot, BenchmarkSnapshot};

/// N daily candles of deterministic pseudo-random walk.
fn make_test_candles(n: usize) -> Vec<Candle> {
    let base_date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut price = 100.0;

    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.05;
            price = (price + change).max(10.0);

            let open = price - 0.5;
            let close = price + 0.3;
            Candle::on_date(
                base_date + chrono::Duration::days(i as i64),
                open,
                open.max(close) + 2.0,
                open.min(close) - 2.0,
                close,
                1000 + (i as u64 * 37) % 900,
            )
        })
        .collect()
}

fn assert_no_lookahead(indicator: &dyn Indicator, full: &[Candle], truncated_len: usize) {
    let truncated_result = indicator.compute(&full[..truncated_len]);
    let full_result = indicator.compute(full);

    assert_eq!(truncated_result.len(), truncated_len, "{}", indicator.name());
    assert_eq!(full_result.len(), full.len(), "{}", indicator.name());

    for i in 0..truncated_len {
        let (t, f) = (truncated_result[i], full_result[i]);
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            (t - f).abs() < 1e-10,
            "{}: look-ahead contamination at candle {i}: truncated={t}, full={f}",
            indicator.name()
        );
    }
}

#[test]
fn lookahead_ema_sma() {
    let candles = make_test_candles(300);
    assert_no_lookahead(&Ema::new(20), &candles, 150);
    assert_no_lookahead(&Ema::new(50), &candles, 150);
    assert_no_lookahead(&Sma::new(20), &candles, 150);
}

#[test]
fn lookahead_rsi_atr_adx() {
    let candles = make_test_candles(300);
    assert_no_lookahead(&Rsi::new(14), &candles, 150);
    assert_no_lookahead(&Atr::new(14), &candles, 150);
    assert_no_lookahead(&Adx::new(14), &candles, 150);
}

#[test]
fn lookahead_vwap() {
    let candles = make_test_candles(300);
    assert_no_lookahead(&Vwap::new(), &candles, 150);
}

/// The EMA in a prefix snapshot equals the full-series EMA at that candle.
#[test]
fn snapshot_only_reads_the_past() {
    let candles = make_test_candles(300);
    let bench = BenchmarkSnapshot {
        return_pct: 0.5,
        window: 20,
        last_close: 100.0,
    };
    let periods = Periods::default();
    let prefix = daily_snapshot(&candles[..250], &bench, &periods);
    let full_ema = Ema::new(periods.ema_fast).compute(&candles);
    let snap_ema = prefix.get("ema_fast").unwrap();
    assert!((snap_ema - full_ema[249]).abs() < 1e-10);

    let full_adx = Adx::new(periods.adx).compute(&candles);
    assert!((prefix.get("adx").unwrap() - full_adx[249]).abs() < 1e-10);
}
