//! Retry configuration from TOML (`[retry]` section)

use super::validation::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use socialsim_application::RetryPolicy;
use std::time::Duration;

/// Raw retry settings, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub rate_limit_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            rate_limit_delay_ms: policy.rate_limit_delay.as_millis() as u64,
            multiplier: policy.multiplier,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl FileRetryConfig {
    /// Convert to [`RetryPolicy`], returning validation issues.
    ///
    /// Out-of-range values are replaced by the defaults with a warning.
    pub fn to_retry_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let defaults = RetryPolicy::default();
        let mut issues = Vec::new();

        let max_attempts = if self.max_attempts == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint {
                    field: "retry.max_attempts".to_string(),
                },
                format!(
                    "retry.max_attempts: must be at least 1, using {}",
                    defaults.max_attempts
                ),
            ));
            defaults.max_attempts
        } else {
            self.max_attempts
        };

        let multiplier = if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint {
                    field: "retry.multiplier".to_string(),
                },
                format!(
                    "retry.multiplier: {} is below 1.0, using {}",
                    self.multiplier, defaults.multiplier
                ),
            ));
            defaults.multiplier
        } else {
            self.multiplier
        };

        let policy = RetryPolicy::default()
            .with_max_attempts(max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_rate_limit_delay(Duration::from_millis(self.rate_limit_delay_ms))
            .with_multiplier(multiplier)
            .with_max_delay(Duration::from_millis(self.max_delay_ms));

        (policy, issues)
    }
}
