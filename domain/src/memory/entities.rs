//! Memory records

use crate::core::contains_sentinel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One turn of a conversation: speaker name → utterance.
///
/// Serialized as a plain JSON object (`{"alice": "Hi Bob!"}`), matching the
/// on-disk memory and transcript formats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Exchange(BTreeMap<String, String>);

impl Exchange {
    /// An exchange holding a single utterance.
    pub fn single(speaker: impl Into<String>, utterance: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(speaker.into(), utterance.into());
        Self(map)
    }

    pub fn insert(&mut self, speaker: impl Into<String>, utterance: impl Into<String>) {
        self.0.insert(speaker.into(), utterance.into());
    }

    pub fn utterance(&self, speaker: &str) -> Option<&str> {
        self.0.get(speaker).map(String::as_str)
    }

    pub fn speakers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any utterance in this exchange carries the sentinel.
    pub fn ends_conversation(&self) -> bool {
        self.0.values().any(|u| contains_sentinel(u))
    }
}

/// Renders exchanges as `speaker: utterance` lines.
pub fn render_transcript(exchanges: &[Exchange]) -> String {
    exchanges
        .iter()
        .flat_map(|e| e.iter().map(|(s, u)| format!("{}: {}", s, u)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The conversation an agent is currently part of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentConversation {
    pub partner: Option<String>,
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
}

/// Short-term memory: `{"current_conversation": {"partner": ..., "exchanges": [...]}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTermMemory {
    #[serde(default)]
    pub current_conversation: CurrentConversation,
}

impl ShortTermMemory {
    pub fn with_partner(partner: impl Into<String>) -> Self {
        Self {
            current_conversation: CurrentConversation {
                partner: Some(partner.into()),
                exchanges: Vec::new(),
            },
        }
    }

    pub fn partner(&self) -> Option<&str> {
        self.current_conversation.partner.as_deref()
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.current_conversation.exchanges
    }

    /// No partner and no exchanges.
    pub fn is_empty(&self) -> bool {
        self.current_conversation.partner.is_none() && self.current_conversation.exchanges.is_empty()
    }

    pub fn transcript(&self) -> String {
        render_transcript(&self.current_conversation.exchanges)
    }

    /// Append `exchange` to the conversation with `partner`.
    ///
    /// A record belonging to another conversation is replaced by a fresh one
    /// and returned so the caller can archive it.
    pub fn record(&mut self, partner: &str, exchange: Exchange) -> Option<ShortTermMemory> {
        let displaced = if self.partner() == Some(partner) {
            None
        } else if self.is_empty() {
            self.current_conversation.partner = Some(partner.to_string());
            None
        } else {
            Some(std::mem::replace(self, Self::with_partner(partner)))
        };
        self.current_conversation.exchanges.push(exchange);
        displaced
    }
}

/// Long-term memory: `{"agent_insights": {"bob": "summary..."}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermMemory {
    #[serde(default)]
    pub agent_insights: BTreeMap<String, String>,
}

impl LongTermMemory {
    pub fn insight_about(&self, partner: &str) -> Option<&str> {
        self.agent_insights.get(partner).map(String::as_str)
    }

    /// Last write wins.
    pub fn upsert(&mut self, partner: impl Into<String>, summary: impl Into<String>) {
        self.agent_insights.insert(partner.into(), summary.into());
    }
}

/// A short-term record moved aside when the live record is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedConversation {
    pub agent: String,
    pub archived_at: DateTime<Utc>,
    pub current_conversation: CurrentConversation,
}

impl ArchivedConversation {
    pub fn new(agent: impl Into<String>, memory: ShortTermMemory) -> Self {
        Self {
            agent: agent.into(),
            archived_at: Utc::now(),
            current_conversation: memory.current_conversation,
        }
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.current_conversation.exchanges
    }
}
