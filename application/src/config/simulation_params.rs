//! Simulation parameters: run loop control.
//!
//! [`SimulationParams`] groups the static parameters that control the step
//! loop in [`RunSimulationUseCase`](crate::use_cases::run_simulation::RunSimulationUseCase).

use serde::{Deserialize, Serialize};
use socialsim_domain::{ConversationBudget, PolicyKind};
use std::time::Duration;

/// Run loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Which scheduling environment forms pairs.
    pub policy: PolicyKind,
    /// Per-step and per-conversation message budgets.
    pub budget: ConversationBudget,
    /// Hard upper bound on time steps.
    pub max_time_steps: usize,
    /// Stop once this many conversations have completed.
    pub max_total_conversations: Option<usize>,
    /// Seed for the random pairing order.
    pub seed: Option<u64>,
    /// Pause after every successful model call.
    pub inter_call_delay: Duration,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            policy: PolicyKind::TimeDependent,
            budget: ConversationBudget::default(),
            max_time_steps: 50,
            max_total_conversations: None,
            seed: None,
            inter_call_delay: Duration::ZERO,
        }
    }
}

impl SimulationParams {
    // ==================== Builder Methods ====================

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_budget(mut self, budget: ConversationBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_max_time_steps(mut self, max: usize) -> Self {
        self.max_time_steps = max;
        self
    }

    pub fn with_max_total_conversations(mut self, cap: Option<usize>) -> Self {
        self.max_total_conversations = cap;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_inter_call_delay(mut self, delay: Duration) -> Self {
        self.inter_call_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SimulationParams::default();
        assert_eq!(params.policy, PolicyKind::TimeDependent);
        assert_eq!(params.budget.messages_per_time_step(), 2);
        assert_eq!(params.budget.messages_per_conversation(), 10);
        assert_eq!(params.max_time_steps, 50);
        assert!(params.max_total_conversations.is_none());
        assert_eq!(params.inter_call_delay, Duration::ZERO);
    }

    #[test]
    fn test_builder_chain() {
        let params = SimulationParams::default()
            .with_policy(PolicyKind::RoundRobin)
            .with_budget(ConversationBudget::new(1, 4))
            .with_max_time_steps(7)
            .with_max_total_conversations(Some(3))
            .with_seed(Some(9))
            .with_inter_call_delay(Duration::from_millis(250));

        assert_eq!(params.policy, PolicyKind::RoundRobin);
        assert_eq!(params.budget.messages_per_conversation(), 4);
        assert_eq!(params.max_time_steps, 7);
        assert_eq!(params.max_total_conversations, Some(3));
        assert_eq!(params.seed, Some(9));
        assert_eq!(params.inter_call_delay, Duration::from_millis(250));
    }
}
