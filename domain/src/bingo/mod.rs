//! Bingo domain
//!
//! Per-agent boards of social goals, filled as conversations touch on them.

pub mod board;
pub mod matcher;
