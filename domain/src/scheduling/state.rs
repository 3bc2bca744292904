//! Per-agent scheduling state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle status of an agent within the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Conversing,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Conversing => "conversing",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scheduling record for a single agent.
///
/// Invariants held by [`PairingScheduler`](super::scheduler::PairingScheduler):
/// an idle agent has no partner and zero conversation messages; a conversing
/// agent's partner is conversing with it in return; `past_partners` never
/// contains the agent itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentState {
    name: String,
    status: AgentStatus,
    current_partner: Option<String>,
    messages_in_current_conversation: usize,
    messages_this_time_step: usize,
    past_partners: BTreeSet<String>,
    total_conversations: usize,
}

impl AgentState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: AgentStatus::Idle,
            current_partner: None,
            messages_in_current_conversation: 0,
            messages_this_time_step: 0,
            past_partners: BTreeSet::new(),
            total_conversations: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_idle(&self) -> bool {
        self.status == AgentStatus::Idle
    }

    pub fn current_partner(&self) -> Option<&str> {
        self.current_partner.as_deref()
    }

    pub fn messages_in_current_conversation(&self) -> usize {
        self.messages_in_current_conversation
    }

    pub fn messages_this_time_step(&self) -> usize {
        self.messages_this_time_step
    }

    pub fn past_partners(&self) -> &BTreeSet<String> {
        &self.past_partners
    }

    pub fn has_talked_to(&self, other: &str) -> bool {
        self.past_partners.contains(other)
    }

    pub fn total_conversations(&self) -> usize {
        self.total_conversations
    }

    pub(crate) fn start_conversation(&mut self, partner: &str, already_exchanged: usize) {
        self.status = AgentStatus::Conversing;
        self.current_partner = Some(partner.to_string());
        self.messages_in_current_conversation = already_exchanged;
    }

    pub(crate) fn record_message(&mut self) {
        self.messages_in_current_conversation += 1;
        self.messages_this_time_step += 1;
    }

    pub(crate) fn reset_step_counter(&mut self) {
        self.messages_this_time_step = 0;
    }

    pub(crate) fn finish_conversation(&mut self) {
        if let Some(partner) = self.current_partner.take() {
            self.past_partners.insert(partner);
        }
        self.total_conversations += 1;
        self.status = AgentStatus::Idle;
        self.messages_in_current_conversation = 0;
    }
}

/// Read-only view of an agent for reports and progress output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub status: AgentStatus,
    pub current_partner: Option<String>,
    pub total_conversations: usize,
    pub past_partners: Vec<String>,
    pub available_partners: usize,
}
