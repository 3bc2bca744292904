//! Configuration file loading for socialsim
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SOCIALSIM_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./socialsim.toml` or `./.socialsim.toml`
//! 4. Global: `$XDG_CONFIG_HOME/socialsim/config.toml`
//! 5. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigIssueCode, DEFAULT_BASE_URL, DEFAULT_MODEL_NAME, FileConfig,
    FileLoggingConfig, FileModelConfig, FilePathsConfig, FileRetryConfig, FileSimulationConfig,
    Severity, has_errors,
};
pub use loader::ConfigLoader;
