//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No agents loaded")]
    NoAgents,

    #[error("Duplicate agent name: {0}")]
    DuplicateAgent(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Agent {0} cannot be paired with itself")]
    SelfPair(String),

    #[error("Pair {0} is not conversing")]
    PairNotActive(String),

    #[error("Unknown scheduling policy: {0} (expected one of: time_dependent, round_robin, random_pairs)")]
    UnknownPolicy(String),
}

impl DomainError {
    /// Check if this error refers to an agent missing from the registry
    pub fn is_unknown_agent(&self) -> bool {
        matches!(self, DomainError::UnknownAgent(_))
    }
}
