//! Master board splitter
//!
//! Turns a master file holding every agent's board (squares grouped in rows)
//! into one flat, unfilled `<owner>.json` board per agent.

use crate::error::ConfigurationError;
use crate::storage::{JsonFileError, read_json, write_json_atomic};
use socialsim_domain::MasterBoard;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Split `master_path` into per-agent boards under `board_dir`.
///
/// Boards without an owner are skipped. Returns owner → written path.
pub fn split_master_boards(
    master_path: &Path,
    board_dir: &Path,
) -> Result<BTreeMap<String, PathBuf>, ConfigurationError> {
    let invalid = |message: String| ConfigurationError::InvalidMasterBoard {
        path: master_path.to_path_buf(),
        message,
    };

    let boards: Vec<MasterBoard> = match read_json(master_path) {
        Ok(Some(boards)) => boards,
        Ok(None) => return Err(invalid("file not found".to_string())),
        Err(JsonFileError::Io(source)) => {
            return Err(ConfigurationError::Unreadable {
                path: master_path.to_path_buf(),
                source,
            });
        }
        Err(JsonFileError::Json(e)) => return Err(invalid(e.to_string())),
    };

    std::fs::create_dir_all(board_dir).map_err(|source| ConfigurationError::Directory {
        path: board_dir.to_path_buf(),
        source,
    })?;

    let mut written = BTreeMap::new();
    for board in boards {
        let Some(board) = board.into_board() else {
            warn!("Skipping bingo board without an owner");
            continue;
        };
        let Some(owner) = board.owner.clone() else {
            continue;
        };

        let path = board_dir.join(format!("{}.json", owner));
        write_json_atomic(&path, &board).map_err(|e| invalid(e.to_string()))?;
        written.insert(owner, path);
    }

    info!(
        boards = written.len(),
        dir = %board_dir.display(),
        "Split master bingo boards"
    );
    Ok(written)
}
