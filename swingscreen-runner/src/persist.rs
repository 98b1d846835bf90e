//! Result file persistence: `<output_dir>/<YYYY-MM-DD>.json`.
//!
//! A rerun on the same date overwrites that day's file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::record::DailyResults;

pub fn results_path(output_dir: &Path, results: &DailyResults) -> PathBuf {
    output_dir.join(format!("{}.json", results.date.format("%Y-%m-%d")))
}

/// Write pretty JSON, creating the directory if needed.
pub fn save_results(results: &DailyResults, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("failed to create results dir: {}", output_dir.display())
    })?;
    let path = results_path(output_dir, results);
    let json =
        serde_json::to_string_pretty(results).context("failed to serialize daily results")?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub fn load_results(path: &Path) -> Result<DailyResults> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}
