//! Application layer for socialsim
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod telemetry;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{RetryPolicy, SimulationParams};
pub use ports::{
    bingo_evaluator::{BingoError, BingoEvaluator, NoBingo, SquareFilled},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger, events},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoProgress, SimulationProgress},
    transcript_store::{CompletedConversation, NoTranscriptStore, TranscriptError, TranscriptStore},
};
pub use telemetry::{CallKind, CallRecord, UsageSummary, UsageTelemetry, estimate_tokens};
pub use use_cases::run_conversation::{ConversationOrchestrator, TurnResult};
pub use use_cases::run_simulation::{
    RunSimulationError, RunSimulationUseCase, SimulationReport, TerminationReason,
};
pub use use_cases::shared::{Invocation, RetryExhausted, invoke_with_retry};
