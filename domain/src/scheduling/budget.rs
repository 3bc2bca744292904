//! Conversation budgets

use serde::{Deserialize, Serialize};

/// Message budgets bounding a conversation.
///
/// A message is one utterance by one speaker. Both limits are at least 1 so
/// that every active pair makes progress each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationBudget {
    messages_per_time_step: usize,
    messages_per_conversation: usize,
}

impl ConversationBudget {
    pub fn new(messages_per_time_step: usize, messages_per_conversation: usize) -> Self {
        Self {
            messages_per_time_step: messages_per_time_step.max(1),
            messages_per_conversation: messages_per_conversation.max(1),
        }
    }

    pub fn messages_per_time_step(&self) -> usize {
        self.messages_per_time_step
    }

    pub fn messages_per_conversation(&self) -> usize {
        self.messages_per_conversation
    }
}

impl Default for ConversationBudget {
    fn default() -> Self {
        Self::new(2, 10)
    }
}
