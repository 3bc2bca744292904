//! Simulation configuration from TOML (`[simulation]` section)

use super::validation::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use socialsim_application::SimulationParams;
use socialsim_domain::{ConversationBudget, PolicyKind};
use std::time::Duration;

/// Raw simulation settings.
///
/// # Example
///
/// ```toml
/// [simulation]
/// environment = "round_robin"
/// messages_per_time_step = 2
/// messages_per_conversation = 10
/// max_time_steps = 50
/// seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSimulationConfig {
    /// `time_dependent`, `round_robin` or `random_pairs`
    pub environment: String,
    pub messages_per_time_step: usize,
    pub messages_per_conversation: usize,
    pub max_time_steps: usize,
    pub max_total_conversations: Option<usize>,
    pub seed: Option<u64>,
    pub inter_call_delay_ms: u64,
}

impl Default for FileSimulationConfig {
    fn default() -> Self {
        let params = SimulationParams::default();
        Self {
            environment: params.policy.as_str().to_string(),
            messages_per_time_step: params.budget.messages_per_time_step(),
            messages_per_conversation: params.budget.messages_per_conversation(),
            max_time_steps: params.max_time_steps,
            max_total_conversations: params.max_total_conversations,
            seed: params.seed,
            inter_call_delay_ms: params.inter_call_delay.as_millis() as u64,
        }
    }
}

impl FileSimulationConfig {
    /// Parse `environment`, reporting unknown names as errors.
    pub fn parse_environment(&self) -> (Option<PolicyKind>, Vec<ConfigIssue>) {
        match self.environment.parse::<PolicyKind>() {
            Ok(kind) => (Some(kind), vec![]),
            Err(_) => {
                let valid_values: Vec<String> = PolicyKind::ALL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect();
                let message = format!(
                    "simulation.environment: unknown environment '{}' (valid: {})",
                    self.environment,
                    valid_values.join(", ")
                );
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "simulation.environment".to_string(),
                        value: self.environment.clone(),
                        valid_values,
                    },
                    message,
                );
                (None, vec![issue])
            }
        }
    }

    /// Convert to [`SimulationParams`], returning validation issues.
    ///
    /// Zero budgets are clamped to 1 with a warning; an unknown environment
    /// falls back to the default policy and is reported as an error.
    pub fn to_params(&self) -> (SimulationParams, Vec<ConfigIssue>) {
        let (policy, mut issues) = self.parse_environment();

        for (field, value) in [
            ("simulation.messages_per_time_step", self.messages_per_time_step),
            (
                "simulation.messages_per_conversation",
                self.messages_per_conversation,
            ),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidConstraint {
                        field: field.to_string(),
                    },
                    format!("{}: must be at least 1, using 1", field),
                ));
            }
        }

        if self.max_time_steps == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidConstraint {
                    field: "simulation.max_time_steps".to_string(),
                },
                "simulation.max_time_steps: must be at least 1",
            ));
        }

        if self.messages_per_time_step > self.messages_per_conversation {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint {
                    field: "simulation.messages_per_time_step".to_string(),
                },
                format!(
                    "simulation.messages_per_time_step ({}) exceeds messages_per_conversation ({}); conversations will never span steps",
                    self.messages_per_time_step, self.messages_per_conversation
                ),
            ));
        }

        let params = SimulationParams::default()
            .with_policy(policy.unwrap_or_default())
            .with_budget(ConversationBudget::new(
                self.messages_per_time_step,
                self.messages_per_conversation,
            ))
            .with_max_time_steps(self.max_time_steps.max(1))
            .with_max_total_conversations(self.max_total_conversations)
            .with_seed(self.seed)
            .with_inter_call_delay(Duration::from_millis(self.inter_call_delay_ms));

        (params, issues)
    }
}
