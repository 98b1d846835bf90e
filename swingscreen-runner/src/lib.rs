//! Swingscreen runner: screen orchestration on top of `swingscreen-core`.
//!
//! This crate provides:
//! - Data loading from a CSV directory or seeded synthetic series
//! - The parallel screen pipeline and stage funnel
//! - Filter diagnostics for exhaustive runs
//! - Published result records and their daily JSON files
//! - Console rendering

pub mod data_loader;
pub mod diagnostics;
pub mod persist;
pub mod pipeline;
pub mod record;
pub mod render;

pub use data_loader::{load_universe, DataSource, LoadError, LoadOptions, LoadedData};
pub use diagnostics::{Diagnostics, FilterStats};
pub use persist::{load_results, results_path, save_results};
pub use pipeline::{run_screen, PipelineError, PipelineOptions, ScreenReport, StageFunnel};
pub use record::{DailyResults, StockRecord, ENTRY_REASON};
pub use render::{render_diagnostics, render_report};
