//! Scheduling context handed to prompt assembly

use serde::{Deserialize, Serialize};

/// Position within a round-robin schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    /// 1-based index of the round the pair belongs to.
    pub index: usize,
    pub total: usize,
}

/// Everything the scheduler knows that a speaker's prompt may mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptContext {
    pub time_step: usize,
    pub max_time_steps: usize,
    pub messages_exchanged: usize,
    pub max_messages: usize,
    pub speaker_past_partners: Vec<String>,
    pub listener_past_partners: Vec<String>,
    pub speaker_total_conversations: usize,
    pub listener_total_conversations: usize,
    pub speaker_available_partners: usize,
    pub listener_available_partners: usize,
    pub experiment_complete: bool,
    pub total_possible_conversations: usize,
    pub completed_conversations: usize,
    pub round: Option<RoundInfo>,
}

impl PromptContext {
    pub fn remaining_messages(&self) -> usize {
        self.max_messages.saturating_sub(self.messages_exchanged)
    }

    /// True when the next message is the last one the budget allows.
    pub fn is_final_message(&self) -> bool {
        self.remaining_messages() <= 1
    }
}
