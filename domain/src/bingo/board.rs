//! Bingo board entities

use super::matcher::clue_satisfied;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One goal on a board.
///
/// Unknown fields from the source file are kept so rewriting a board does
/// not drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BingoSquare {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub filled: bool,
    #[serde(default)]
    pub matched_with: Option<String>,
    #[serde(default)]
    pub response_snippet: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BingoSquare {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn reset(&mut self) {
        self.filled = false;
        self.matched_with = None;
        self.response_snippet = None;
    }
}

/// Filled/unfilled counts for a board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub filled_squares: usize,
    pub unfilled_squares: usize,
}

impl BoardSummary {
    pub fn total(&self) -> usize {
        self.filled_squares + self.unfilled_squares
    }
}

/// A single agent's board, stored as a flat list of squares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BingoBoard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub squares: Vec<BingoSquare>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BingoBoard {
    pub fn new(owner: impl Into<String>, squares: Vec<BingoSquare>) -> Self {
        Self {
            owner: Some(owner.into()),
            squares,
            extra: Map::new(),
        }
    }

    /// Fill the first unfilled square satisfied by `utterance`.
    ///
    /// At most one square is filled per utterance. Returns its index.
    pub fn try_fill(&mut self, utterance: &str, partner: &str) -> Option<usize> {
        let index = self
            .squares
            .iter()
            .position(|sq| !sq.filled && clue_satisfied(&sq.text, utterance))?;

        let square = &mut self.squares[index];
        square.filled = true;
        square.matched_with = Some(partner.to_string());
        square.response_snippet = Some(utterance.to_string());
        Some(index)
    }

    pub fn unfilled_clues(&self) -> Vec<String> {
        self.squares
            .iter()
            .filter(|sq| !sq.filled)
            .map(|sq| sq.text.clone())
            .collect()
    }

    pub fn summary(&self) -> BoardSummary {
        let filled_squares = self.squares.iter().filter(|sq| sq.filled).count();
        BoardSummary {
            filled_squares,
            unfilled_squares: self.squares.len() - filled_squares,
        }
    }
}

/// A board as written in the master file: squares grouped in rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterBoard {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub squares: Vec<Vec<BingoSquare>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MasterBoard {
    /// Flatten into a fresh per-agent board with every square unfilled.
    ///
    /// Returns `None` for boards without an owner.
    pub fn into_board(self) -> Option<BingoBoard> {
        let owner = self.owner.filter(|o| !o.trim().is_empty())?;
        let mut squares: Vec<BingoSquare> = self.squares.into_iter().flatten().collect();
        squares.iter_mut().for_each(BingoSquare::reset);
        Some(BingoBoard {
            owner: Some(owner),
            squares,
            extra: self.extra,
        })
    }
}
