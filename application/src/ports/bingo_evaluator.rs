//! Bingo evaluator port
//!
//! Invoked once per utterance to progress the speaker's goal board.
//! Evaluation is best-effort: callers log failures and carry on.

use serde::Serialize;
use socialsim_domain::BoardSummary;
use thiserror::Error;

/// Errors raised while reading or rewriting a bingo board
#[derive(Error, Debug)]
pub enum BingoError {
    #[error("Bingo board I/O error for {agent}: {message}")]
    Io { agent: String, message: String },

    #[error("Bingo board for {agent} is malformed: {message}")]
    Malformed { agent: String, message: String },
}

/// A square filled by an utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquareFilled {
    pub agent: String,
    pub index: usize,
    pub clue: String,
    pub partner: String,
}

/// Evaluates utterances against per-agent bingo boards.
pub trait BingoEvaluator: Send + Sync {
    /// Fill at most one square on `agent`'s board matched by `utterance`.
    ///
    /// Agents without a board are a no-op.
    fn evaluate(
        &self,
        agent: &str,
        utterance: &str,
        partner: &str,
    ) -> Result<Option<SquareFilled>, BingoError>;

    /// Clues still open on `agent`'s board.
    fn open_goals(&self, _agent: &str) -> Vec<String> {
        Vec::new()
    }

    /// Filled/unfilled counts, if `agent` has a board.
    fn summary(&self, _agent: &str) -> Option<BoardSummary> {
        None
    }
}

/// Evaluator for runs without bingo boards.
pub struct NoBingo;

impl BingoEvaluator for NoBingo {
    fn evaluate(
        &self,
        _agent: &str,
        _utterance: &str,
        _partner: &str,
    ) -> Result<Option<SquareFilled>, BingoError> {
        Ok(None)
    }
}
