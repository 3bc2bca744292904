//! Bingo boards stored as one JSON document per agent.

use crate::storage::{JsonFileError, read_json, write_json_atomic};
use socialsim_application::{BingoError, BingoEvaluator, SquareFilled};
use socialsim_domain::{BingoBoard, BoardSummary};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Keyword evaluator over `<board_dir>/<agent>.json`.
///
/// Agents without a board file are skipped silently.
pub struct JsonBingoBoards {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonBingoBoards {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn board_path(&self, agent: &str) -> PathBuf {
        self.dir.join(format!("{}.json", agent))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(&self, agent: &str) -> Result<Option<BingoBoard>, BingoError> {
        read_json(&self.board_path(agent)).map_err(|e| bingo_error(agent, e))
    }

    /// Board for `agent`, or `None` when absent or unreadable.
    fn load_lenient(&self, agent: &str) -> Option<BingoBoard> {
        match self.load(agent) {
            Ok(board) => board,
            Err(e) => {
                warn!(agent, error = %e, "Ignoring unreadable bingo board");
                None
            }
        }
    }
}

fn bingo_error(agent: &str, error: JsonFileError) -> BingoError {
    match error {
        JsonFileError::Io(e) => BingoError::Io {
            agent: agent.to_string(),
            message: e.to_string(),
        },
        JsonFileError::Json(e) => BingoError::Malformed {
            agent: agent.to_string(),
            message: e.to_string(),
        },
    }
}

impl BingoEvaluator for JsonBingoBoards {
    fn evaluate(
        &self,
        agent: &str,
        utterance: &str,
        partner: &str,
    ) -> Result<Option<SquareFilled>, BingoError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let Some(mut board) = self.load(agent)? else {
            return Ok(None);
        };
        let Some(index) = board.try_fill(utterance, partner) else {
            return Ok(None);
        };

        write_json_atomic(&self.board_path(agent), &board).map_err(|e| bingo_error(agent, e))?;

        let clue = board.squares[index].text.clone();
        debug!(agent, partner, clue = %clue, "Bingo square filled");
        Ok(Some(SquareFilled {
            agent: agent.to_string(),
            index,
            clue,
            partner: partner.to_string(),
        }))
    }

    fn open_goals(&self, agent: &str) -> Vec<String> {
        self.load_lenient(agent)
            .map(|board| board.unfilled_clues())
            .unwrap_or_default()
    }

    fn summary(&self, agent: &str) -> Option<BoardSummary> {
        self.load_lenient(agent).map(|board| board.summary())
    }
}
