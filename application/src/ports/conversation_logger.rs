//! Port for the structured simulation event log.
//!
//! Defines the [`ConversationLogger`] trait for recording simulation events
//! (steps, pairings, utterances, digests) to a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures what happened in the
//! run in a form that can be replayed or analysed (JSONL).

use serde_json::Value;

/// Event type identifiers written by the use cases.
pub mod events {
    pub const SIMULATION_STARTED: &str = "simulation_started";
    pub const STEP_STARTED: &str = "step_started";
    pub const PAIR_STARTED: &str = "pair_started";
    pub const PAIR_RESUMED: &str = "pair_resumed";
    pub const UTTERANCE: &str = "utterance";
    pub const MODEL_DEGRADED: &str = "model_degraded";
    pub const PAIR_COMPLETED: &str = "pair_completed";
    pub const DIGEST_STORED: &str = "digest_stored";
    pub const STEP_COMPLETED: &str = "step_completed";
    pub const SIMULATION_FINISHED: &str = "simulation_finished";
}

/// A structured simulation event.
///
/// The logger adds the UTC timestamp when the event is written.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// One of the identifiers in [`events`].
    pub event_type: &'static str,
    /// JSON object with event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging simulation events.
///
/// `log` is synchronous and non-fallible so a broken log never disturbs the
/// run; write failures are dropped by implementations.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when the event log is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
