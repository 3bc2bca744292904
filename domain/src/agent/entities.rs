//! Agent domain entities

use serde::{Deserialize, Serialize};

/// An agent taking part in the simulation (Entity)
///
/// Identity is the unique `name`; `personality` is the free-text persona
/// the language model is asked to play. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    name: String,
    personality: String,
}

impl Agent {
    pub fn new(name: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: personality.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn personality(&self) -> &str {
        &self.personality
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
