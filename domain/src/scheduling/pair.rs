//! Pair keys and active pairings

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Unordered pair of two distinct agents, canonicalized lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Result<Self, DomainError> {
        if a == b {
            return Err(DomainError::SelfPair(a.to_string()));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self {
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }

    /// The other member of the pair, if `name` belongs to it.
    pub fn partner_of(&self, name: &str) -> Option<&str> {
        if self.first == name {
            Some(&self.second)
        } else if self.second == name {
            Some(&self.first)
        } else {
            None
        }
    }

    /// File-name friendly form: `alice_bob`.
    pub fn slug(&self) -> String {
        format!("{}_{}", self.first, self.second)
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// How a pair came to be active in the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairOrigin {
    /// Matched this step from two idle agents.
    New,
    /// Matched this step from a partner recorded in short-term memory.
    Resumed,
    /// Still conversing from a previous step.
    CarriedOver,
}

/// A pair scheduled to talk during the current step.
///
/// `first_speaker` talks whenever the number of messages already exchanged
/// is even, so turns alternate strictly even across step boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePair {
    pub key: PairKey,
    pub first_speaker: String,
    pub second_speaker: String,
    pub origin: PairOrigin,
}

impl ActivePair {
    pub fn new(
        first_speaker: impl Into<String>,
        second_speaker: impl Into<String>,
        origin: PairOrigin,
    ) -> Result<Self, DomainError> {
        let first_speaker = first_speaker.into();
        let second_speaker = second_speaker.into();
        let key = PairKey::new(&first_speaker, &second_speaker)?;
        Ok(Self {
            key,
            first_speaker,
            second_speaker,
            origin,
        })
    }

    /// `(speaker, listener)` for the next message.
    pub fn turn(&self, messages_exchanged: usize) -> (&str, &str) {
        if messages_exchanged % 2 == 0 {
            (&self.first_speaker, &self.second_speaker)
        } else {
            (&self.second_speaker, &self.first_speaker)
        }
    }
}
