//! Usage summary persistence (`token_usage_<YYYYmmdd_HHMMSS>.json`).

use crate::storage::{JsonFileError, write_json_atomic};
use chrono::{DateTime, Local};
use socialsim_application::UsageSummary;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn usage_report_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
    dir.join(format!("token_usage_{}.json", at.format("%Y%m%d_%H%M%S")))
}

/// Write `summary` into `dir`, returning the file path.
pub fn write_usage_report(dir: &Path, summary: &UsageSummary) -> Result<PathBuf, JsonFileError> {
    let path = usage_report_path(dir, Local::now());
    write_json_atomic(&path, summary)?;
    info!(
        path = %path.display(),
        calls = summary.total_calls,
        tokens = summary.total_tokens,
        "Usage summary written"
    );
    Ok(path)
}

/// Best-effort variant: failures are logged and swallowed.
pub fn try_write_usage_report(dir: &Path, summary: &UsageSummary) -> Option<PathBuf> {
    match write_usage_report(dir, summary) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Could not write usage summary");
            None
        }
    }
}
