//! Model configuration from TOML (`[model]` section)

use super::validation::{ConfigIssue, ConfigIssueCode};
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};

/// Raw model settings.
///
/// # Example
///
/// ```toml
/// [model]
/// provider = "gemini"
/// name = "gemma-3-27b-it"
/// temperature = 0.1
/// api_key_env = "GOOGLE_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub provider: String,
    pub name: String,
    pub temperature: f32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Offline provider only: emit the end marker after this many replies.
    pub offline_end_after: Option<usize>,
}

pub const DEFAULT_MODEL_NAME: &str = "gemma-3-27b-it";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default().as_str().to_string(),
            name: DEFAULT_MODEL_NAME.to_string(),
            temperature: 0.1,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
            offline_end_after: None,
        }
    }
}

impl FileModelConfig {
    pub fn parse_provider(&self) -> (Option<ProviderKind>, Vec<ConfigIssue>) {
        match self.provider.parse::<ProviderKind>() {
            Ok(kind) => (Some(kind), vec![]),
            Err(value) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "model.provider".to_string(),
                        value: value.clone(),
                        valid_values: vec!["gemini".to_string(), "offline".to_string()],
                    },
                    format!(
                        "model.provider: unknown provider '{}' (valid: gemini, offline)",
                        value
                    ),
                );
                (None, vec![issue])
            }
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_provider().1;

        if self.name.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyValue {
                    field: "model.name".to_string(),
                },
                "model.name cannot be empty",
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint {
                    field: "model.temperature".to_string(),
                },
                format!(
                    "model.temperature: {} is outside 0.0..=2.0 and may be rejected by the provider",
                    self.temperature
                ),
            ));
        }

        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidConstraint {
                    field: "model.timeout_secs".to_string(),
                },
                "model.timeout_secs cannot be 0",
            ));
        }

        issues
    }
}
