//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the rolling diagnostic log. Console only when unset.
    pub dir: Option<PathBuf>,
    /// Write the JSONL conversation event log to the outputs directory.
    pub event_log: bool,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            event_log: true,
        }
    }
}
