//! Domain types for the swing screen

pub mod candle;

pub use candle::{validate_series, Candle, CandleError, Timeframe};

/// Symbol type alias
pub type Symbol = String;
