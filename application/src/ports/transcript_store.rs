//! Transcript store port
//!
//! Persists the dialogue of every completed conversation, both per pair and
//! as one document for the whole run.

use serde::Serialize;
use socialsim_domain::{Exchange, PairKey, PairOutcome};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Failed to write transcript {target}: {message}")]
pub struct TranscriptError {
    pub target: String,
    pub message: String,
}

/// A concluded conversation and its full dialogue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedConversation {
    /// Unique conversation id (UUID v4).
    pub id: String,
    pub pair: PairKey,
    pub dialogue: Vec<Exchange>,
    pub outcome: PairOutcome,
    /// Time step in which the conversation concluded.
    pub step: usize,
}

impl CompletedConversation {
    /// Key used in per-pair log files: `alice_bob_1a2b3c4d`.
    pub fn log_key(&self) -> String {
        let short: String = self.id.chars().filter(|c| *c != '-').take(8).collect();
        format!("{}_{}", self.pair.slug(), short)
    }
}

/// Port for persisting conversation transcripts.
pub trait TranscriptStore: Send + Sync {
    /// Persist one completed conversation.
    fn record_conversation(&self, conversation: &CompletedConversation)
    -> Result<(), TranscriptError>;

    /// Persist every completed conversation of a run under `experiment_id`.
    fn record_run(
        &self,
        experiment_id: &str,
        conversations: &[CompletedConversation],
    ) -> Result<(), TranscriptError>;
}

/// No-op store for tests and dry runs.
pub struct NoTranscriptStore;

impl TranscriptStore for NoTranscriptStore {
    fn record_conversation(
        &self,
        _conversation: &CompletedConversation,
    ) -> Result<(), TranscriptError> {
        Ok(())
    }

    fn record_run(
        &self,
        _experiment_id: &str,
        _conversations: &[CompletedConversation],
    ) -> Result<(), TranscriptError> {
        Ok(())
    }
}
