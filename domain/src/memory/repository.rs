//! Memory repository trait

use super::entities::{ArchivedConversation, Exchange, LongTermMemory, ShortTermMemory};
use thiserror::Error;

/// Errors raised when a memory record cannot be written.
///
/// Reads never fail: an absent or unparsable record is treated as empty.
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Memory I/O error for agent {agent}: {source}")]
    Io {
        agent: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Memory serialization error for agent {agent}: {source}")]
    Serialization {
        agent: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Repository trait for per-agent memory
///
/// Every operation touches exactly one agent's record and must be atomic with
/// respect to it: readers never observe a partially written record.
/// Implementations live in the infrastructure layer.
pub trait MemoryRepository: Send + Sync {
    /// Current short-term record, or the empty default when absent.
    fn get_short_term(&self, agent: &str) -> ShortTermMemory;

    /// Append `exchange` to the agent's current conversation with `partner`.
    ///
    /// Callers decide whether a pairing is a resume or a fresh start before
    /// calling. If the stored record names a different partner, that record
    /// is archived first and a new conversation with `partner` begins.
    fn update_short_term(
        &self,
        agent: &str,
        partner: &str,
        exchange: Exchange,
    ) -> Result<(), MemoryError>;

    /// Archive the live record and reset it to the empty default.
    ///
    /// Returns the archived record, or `None` if there was nothing to archive.
    fn clear_short_term(&self, agent: &str) -> Result<Option<ArchivedConversation>, MemoryError>;

    /// Long-term record, or the empty default when absent.
    fn get_long_term(&self, agent: &str) -> LongTermMemory;

    /// Idempotent upsert of the relationship summary about `partner`.
    fn update_long_term(&self, agent: &str, partner: &str, summary: &str)
    -> Result<(), MemoryError>;
}
