//! Infrastructure layer for socialsim
//!
//! This crate contains adapters that implement the ports defined
//! in the application and domain layers: JSON file stores, model providers,
//! persona loading and configuration file loading.

pub mod bingo;
pub mod config;
pub mod error;
pub mod logging;
pub mod memory;
pub mod personas;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use bingo::{JsonBingoBoards, split_master_boards};
pub use config::{
    ConfigIssue, ConfigLoader, FileConfig, FileLoggingConfig, FileModelConfig, FilePathsConfig,
    FileRetryConfig, FileSimulationConfig, Severity, has_errors,
};
pub use error::ConfigurationError;
pub use logging::{
    JsonTranscriptStore, JsonlConversationLogger, try_write_usage_report, write_usage_report,
};
pub use memory::JsonMemoryStore;
pub use personas::PersonaLoader;
pub use providers::{
    ProviderKind, build_gateway,
    gemini::{GeminiConfig, GeminiGateway},
    offline::OfflineGateway,
};
