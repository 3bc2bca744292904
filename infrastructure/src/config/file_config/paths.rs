//! Filesystem layout from TOML (`[paths]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where personas are read from and run artifacts are written to.
///
/// # Example
///
/// ```toml
/// [paths]
/// agents_dir = "agents"
/// outputs_dir = "outputs"
/// memory_dir = "memory"
/// bingo_board_dir = "bingo_boards"
/// bingo_master_file = "master_bingo.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePathsConfig {
    /// One `<name>.txt` persona per agent.
    pub agents_dir: PathBuf,
    /// Conversation logs and usage summaries.
    pub outputs_dir: PathBuf,
    /// Holds `short_term/`, `long_term/` and `archive/`.
    pub memory_dir: PathBuf,
    /// One `<agent>.json` board per agent.
    pub bingo_board_dir: PathBuf,
    /// Master board file consumed by `--split-boards`.
    pub bingo_master_file: Option<PathBuf>,
}

impl Default for FilePathsConfig {
    fn default() -> Self {
        Self {
            agents_dir: PathBuf::from("agents"),
            outputs_dir: PathBuf::from("outputs"),
            memory_dir: PathBuf::from("memory"),
            bingo_board_dir: PathBuf::from("bingo_boards"),
            bingo_master_file: None,
        }
    }
}
