//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types with
//! their validation issues.

mod logging;
mod model;
mod paths;
mod retry;
mod simulation;
mod validation;

pub use logging::FileLoggingConfig;
pub use model::{DEFAULT_BASE_URL, DEFAULT_MODEL_NAME, FileModelConfig};
pub use paths::FilePathsConfig;
pub use retry::FileRetryConfig;
pub use simulation::FileSimulationConfig;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity, has_errors};

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub paths: FilePathsConfig,
    pub simulation: FileSimulationConfig,
    pub retry: FileRetryConfig,
    pub model: FileModelConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.simulation.to_params().1);
        issues.extend(self.retry.to_retry_policy().1);
        issues.extend(self.model.validate());

        if self.paths.agents_dir.as_os_str().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyValue {
                    field: "paths.agents_dir".to_string(),
                },
                "paths.agents_dir cannot be empty",
            ));
        }

        issues
    }
}
