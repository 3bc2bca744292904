//! Bingo board persistence and master-file splitting.

mod json_boards;
mod splitter;

pub use json_boards::JsonBingoBoards;
pub use splitter::split_master_boards;
