//! SwingScreen Core: indicators, multi-timeframe filter cascade, trade-quality
//! validation, weighted scoring and selection.
//!
//! Everything here is a pure function of candles and configuration:
//! - Candle domain type and series validation
//! - Indicator library (EMA, RSI, ADX, ATR, VWAP, relative strength, price action)
//! - Per-timeframe indicator snapshots
//! - Filter cascade with strict and exhaustive evaluation
//! - Market context, trade setup and quality validation
//! - Scoring curves and the top-K selector

pub mod candidate;
pub mod cascade;
pub mod config;
pub mod domain;
pub mod indicators;
pub mod market;
pub mod quality;
pub mod scoring;
pub mod selector;
pub mod setup;
pub mod snapshot;

pub use candidate::{evaluate_symbol, Candidate, CandidateStatus, DiscardReason, SymbolData};
pub use cascade::{Cascade, CascadeOptions, EvaluationMode, FilterOutcome, StageRequirement};
pub use config::{ConfigError, ScreenConfig};
pub use domain::{Candle, CandleError, Symbol, Timeframe};
pub use quality::{QualityCheck, QualityReport};
pub use scoring::ScoreBreakdown;
pub use selector::select;
pub use snapshot::{BenchmarkSnapshot, IndicatorSnapshot, TimeframeSnapshots};
