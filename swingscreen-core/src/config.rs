//! Screen configuration.
//!
//! Every filter bound, scoring weight and normalization constant is a named
//! field here. The defaults are the swing-trading profile; a TOML file only
//! needs to name the fields it overrides.

use crate::cascade::Threshold;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("scoring weights must sum to 100, got {sum}")]
    WeightsSum { sum: u32 },

    #[error("{name}: lower bound {low} must be below upper bound {high}")]
    InvalidBand { name: &'static str, low: f64, high: f64 },

    #[error("{name} must be positive")]
    NonPositive { name: &'static str },

    #[error("max_selections must be between 1 and 3, got {0}")]
    MaxSelections(usize),

    #[error("intraday window start {start} is after end {end}")]
    IntradayWindow { start: NaiveTime, end: NaiveTime },
}

/// Complete, immutable screen configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScreenConfig {
    pub thresholds: Thresholds,
    pub weights: Weights,
    pub curves: Curves,
    pub periods: Periods,
    pub intraday: IntradayParams,
    pub setup: SetupParams,
    pub selection: SelectionParams,
    pub universe: Universe,
}

/// Filter and quality bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub adx_min: f64,
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub atr_ratio_min: f64,
    pub volume_ratio_min: f64,
    pub relative_strength_min: f64,
    pub higher_lows_min: f64,
    pub weekly_rsi_min: f64,
    pub weekly_rsi_max: f64,
    pub max_upper_wick: f64,
    pub intraday_volume_min: f64,
    /// Stop distance bounds, percent of last traded price.
    pub min_stop_pct: f64,
    pub max_stop_pct: f64,
    pub min_risk_reward: f64,
    pub min_resistance_pct: f64,
    pub max_support_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            adx_min: 23.0,
            rsi_min: 42.0,
            rsi_max: 62.0,
            atr_ratio_min: 1.15,
            volume_ratio_min: 1.0,
            relative_strength_min: 0.0,
            higher_lows_min: 2.0,
            weekly_rsi_min: 40.0,
            weekly_rsi_max: 70.0,
            max_upper_wick: 0.5,
            intraday_volume_min: 1.2,
            min_stop_pct: 0.5,
            max_stop_pct: 2.0,
            min_risk_reward: 1.5,
            min_resistance_pct: 2.0,
            max_support_pct: 5.0,
        }
    }
}

/// Scoring weights in percent. Must sum to exactly 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub trend_strength: u32,
    pub rsi_position: u32,
    pub relative_strength: u32,
    pub volume_expansion: u32,
    pub atr_expansion: u32,
    pub weekly_alignment: u32,
    pub price_action: u32,
    pub trade_quality: u32,
}

impl Weights {
    pub fn sum(&self) -> u32 {
        self.trend_strength
            + self.rsi_position
            + self.relative_strength
            + self.volume_expansion
            + self.atr_expansion
            + self.weekly_alignment
            + self.price_action
            + self.trade_quality
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            trend_strength: 25,
            rsi_position: 15,
            relative_strength: 15,
            volume_expansion: 10,
            atr_expansion: 5,
            weekly_alignment: 10,
            price_action: 10,
            trade_quality: 10,
        }
    }
}

/// Normalization constants for the scoring curves.
///
/// Saturating curves start at the matching mandatory threshold and reach 100
/// at the `*_excellent` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Curves {
    pub adx_excellent: f64,
    /// EMA slope, percent per candle, that scores 100.
    pub slope_excellent_pct: f64,
    pub rsi_ideal_low: f64,
    pub rsi_ideal_high: f64,
    /// Relative-strength margin above the threshold that scores 100.
    pub rs_full_margin: f64,
    /// Volume-ratio margin above the threshold that scores 100.
    pub volume_full_margin: f64,
    pub atr_excellent: f64,
    pub higher_lows_excellent: f64,
    pub stop_ideal_low_pct: f64,
    pub stop_ideal_high_pct: f64,
    pub rr_excellent: f64,
}

impl Default for Curves {
    fn default() -> Self {
        Self {
            adx_excellent: 50.0,
            slope_excellent_pct: 0.5,
            rsi_ideal_low: 50.0,
            rsi_ideal_high: 55.0,
            rs_full_margin: 10.0,
            volume_full_margin: 1.5,
            atr_excellent: 3.0,
            higher_lows_excellent: 5.0,
            stop_ideal_low_pct: 0.8,
            stop_ideal_high_pct: 1.2,
            rr_excellent: 3.0,
        }
    }
}

/// Indicator periods and windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Periods {
    pub ema_fast: usize,
    pub ema_mid: usize,
    pub ema_slow: usize,
    pub slope_window: usize,
    pub rsi: usize,
    pub adx: usize,
    pub atr: usize,
    pub atr_avg: usize,
    pub volume_avg: usize,
    pub relative_strength: usize,
    pub higher_lows_lookback: usize,
    pub consolidation_days: usize,
    pub consolidation_max_range_pct: f64,
    pub volume_expansion_days: usize,
    pub weekly_ema_fast: usize,
    pub weekly_ema_slow: usize,
    pub weekly_rsi: usize,
    pub sr_lookback: usize,
}

impl Default for Periods {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_mid: 50,
            ema_slow: 200,
            slope_window: 5,
            rsi: 14,
            adx: 14,
            atr: 14,
            atr_avg: 20,
            volume_avg: 20,
            relative_strength: 20,
            higher_lows_lookback: 6,
            consolidation_days: 5,
            consolidation_max_range_pct: 3.0,
            volume_expansion_days: 3,
            weekly_ema_fast: 20,
            weekly_ema_slow: 50,
            weekly_rsi: 14,
            sr_lookback: 30,
        }
    }
}

/// Intraday confirmation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntradayParams {
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    /// Leading window candles that must hold above VWAP.
    pub vwap_candles: usize,
    /// Preceding candles averaged for the volume-spike ratio.
    pub volume_avg: usize,
}

impl Default for IntradayParams {
    fn default() -> Self {
        Self {
            window_start: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN),
            window_end: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            vwap_candles: 2,
            volume_avg: 20,
        }
    }
}

/// Trade setup derivation from intraday candles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupParams {
    pub ema_entry: usize,
    pub ema_pullback: usize,
    pub atr_period: usize,
    pub atr_multiplier: f64,
    pub swing_window: usize,
    /// Stop placed this percent below the swing low.
    pub swing_buffer_pct: f64,
    /// Target distance as a multiple of risk.
    pub target_r_multiple: f64,
    pub min_candles: usize,
}

impl Default for SetupParams {
    fn default() -> Self {
        Self {
            ema_entry: 9,
            ema_pullback: 20,
            atr_period: 14,
            atr_multiplier: 0.7,
            swing_window: 10,
            swing_buffer_pct: 0.1,
            target_r_multiple: 1.5,
            min_candles: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    pub max_selections: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self { max_selections: 3 }
    }
}

/// Symbols screened each run plus the benchmark index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Universe {
    pub benchmark: String,
    pub symbols: Vec<String>,
}

impl Universe {
    pub fn nifty50() -> Self {
        let symbols = [
            "ADANIENT", "ADANIPORTS", "APOLLOHOSP", "ASIANPAINT", "AXISBANK", "BAJAJ-AUTO",
            "BAJFINANCE", "BAJAJFINSV", "BEL", "BHARTIARTL", "CIPLA", "COALINDIA", "DRREDDY",
            "EICHERMOT", "GRASIM", "HCLTECH", "HDFCBANK", "HDFCLIFE", "HINDALCO", "HINDUNILVR",
            "ICICIBANK", "INDIGO", "INFY", "ITC", "JIOFIN", "JSWSTEEL", "KOTAKBANK", "LT", "M&M",
            "MARUTI", "MAXHEALTH", "NESTLEIND", "NTPC", "ONGC", "POWERGRID", "RELIANCE",
            "SBILIFE", "SBIN", "SHRIRAMFIN", "SUNPHARMA", "TATASTEEL", "TATACONSUM", "TCS",
            "TECHM", "TITAN", "TMPV", "TRENT", "ULTRACEMCO", "WIPRO",
        ];
        Self {
            benchmark: "NIFTY50".to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::nifty50()
    }
}

impl ScreenConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.weights.sum();
        if sum != 100 {
            return Err(ConfigError::WeightsSum { sum });
        }

        let t = &self.thresholds;
        let c = &self.curves;
        let bands = [
            ("rsi band", t.rsi_min, t.rsi_max),
            ("weekly rsi band", t.weekly_rsi_min, t.weekly_rsi_max),
            ("stop distance", t.min_stop_pct, t.max_stop_pct),
            ("rsi ideal band", c.rsi_ideal_low, c.rsi_ideal_high),
            ("stop ideal band", c.stop_ideal_low_pct, c.stop_ideal_high_pct),
            ("adx curve", t.adx_min, c.adx_excellent),
            ("atr curve", t.atr_ratio_min, c.atr_excellent),
            ("higher lows curve", t.higher_lows_min, c.higher_lows_excellent),
            ("risk reward curve", t.min_risk_reward, c.rr_excellent),
        ];
        for (name, low, high) in bands {
            if low.is_nan() || high.is_nan() || low >= high {
                return Err(ConfigError::InvalidBand { name, low, high });
            }
        }

        let positive = [
            ("slope_excellent_pct", c.slope_excellent_pct),
            ("rs_full_margin", c.rs_full_margin),
            ("volume_full_margin", c.volume_full_margin),
            ("atr_multiplier", self.setup.atr_multiplier),
            ("target_r_multiple", self.setup.target_r_multiple),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name });
            }
        }

        let p = &self.periods;
        let s = &self.setup;
        let counts = [
            ("ema_fast", p.ema_fast),
            ("ema_mid", p.ema_mid),
            ("ema_slow", p.ema_slow),
            ("slope_window", p.slope_window),
            ("rsi", p.rsi),
            ("adx", p.adx),
            ("atr", p.atr),
            ("atr_avg", p.atr_avg),
            ("volume_avg", p.volume_avg),
            ("weekly_ema_fast", p.weekly_ema_fast),
            ("weekly_ema_slow", p.weekly_ema_slow),
            ("weekly_rsi", p.weekly_rsi),
            ("vwap_candles", self.intraday.vwap_candles),
            ("intraday volume_avg", self.intraday.volume_avg),
            ("ema_entry", s.ema_entry),
            ("ema_pullback", s.ema_pullback),
            ("setup atr_period", s.atr_period),
            ("swing_window", s.swing_window),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(ConfigError::NonPositive { name });
            }
        }
        if p.relative_strength < 2 {
            return Err(ConfigError::NonPositive {
                name: "relative_strength window",
            });
        }

        if self.intraday.window_start > self.intraday.window_end {
            return Err(ConfigError::IntradayWindow {
                start: self.intraday.window_start,
                end: self.intraday.window_end,
            });
        }

        let max = self.selection.max_selections;
        if !(1..=3).contains(&max) {
            return Err(ConfigError::MaxSelections(max));
        }

        Ok(())
    }

    /// Numeric bound a filter compares against.
    pub fn threshold(&self, key: Threshold) -> f64 {
        let t = &self.thresholds;
        match key {
            Threshold::AdxMin => t.adx_min,
            Threshold::RsiMin => t.rsi_min,
            Threshold::RsiMax => t.rsi_max,
            Threshold::AtrRatioMin => t.atr_ratio_min,
            Threshold::VolumeRatioMin => t.volume_ratio_min,
            Threshold::RelativeStrengthMin => t.relative_strength_min,
            Threshold::HigherLowsMin => t.higher_lows_min,
            Threshold::WeeklyRsiMin => t.weekly_rsi_min,
            Threshold::WeeklyRsiMax => t.weekly_rsi_max,
            Threshold::MaxUpperWick => t.max_upper_wick,
            Threshold::IntradayVolumeMin => t.intraday_volume_min,
            Threshold::VwapHoldCandles => self.intraday.vwap_candles as f64,
        }
    }

    /// Deterministic content hash of the full configuration.
    ///
    /// Two runs with identical configs share a fingerprint, which is recorded
    /// alongside results.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("ScreenConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
