//! Domain layer for socialsim
//!
//! This crate contains the core simulation logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Pairing scheduler
//!
//! Agents move through an `idle → conversing → idle` lifecycle. Each discrete
//! time step the [`PairingScheduler`] forms disjoint pairs, hands out message
//! budgets, and records which pairs have completed a conversation. A run is
//! complete once every one of the `n(n-1)/2` pairs has talked.
//!
//! ## Two-tier memory
//!
//! - **Short-term**: the transcript of the conversation in progress
//! - **Long-term**: one digested summary per past partner
//!
//! ## Bingo boards
//!
//! Each agent carries a board of social goals; utterances that match a clue
//! fill a square.

pub mod agent;
pub mod bingo;
pub mod core;
pub mod memory;
pub mod prompt;
pub mod scheduling;

// Re-export commonly used types
pub use agent::{entities::Agent, registry::AgentRegistry};
pub use bingo::{
    board::{BingoBoard, BingoSquare, BoardSummary, MasterBoard},
    matcher::{clue_satisfied, keyword_match},
};
pub use core::{END_OF_CONVERSATION, contains_sentinel, error::DomainError};
pub use memory::{
    entities::{
        ArchivedConversation, CurrentConversation, Exchange, LongTermMemory, ShortTermMemory,
        render_transcript,
    },
    repository::{MemoryError, MemoryRepository},
};
pub use prompt::{
    DEGRADED_PLACEHOLDER, DIGEST_PREAMBLE, NO_CONVERSATION_YET, NO_PREVIOUS_MEMORY, PromptTemplate,
    TurnPrompt,
};
pub use scheduling::{
    budget::ConversationBudget,
    context::{PromptContext, RoundInfo},
    pair::{ActivePair, PairKey, PairOrigin},
    policy::{PolicyKind, SchedulingPolicy},
    scheduler::{PairOutcome, PairingScheduler, ResumeHint, StepPlan},
    state::{AgentSnapshot, AgentState, AgentStatus},
};
