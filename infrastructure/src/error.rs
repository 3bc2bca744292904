//! Startup errors raised by the infrastructure adapters

use socialsim_domain::DomainError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems detected before any simulation state exists.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Agents directory not found: {}", .0.display())]
    AgentsDirMissing(PathBuf),

    #[error("No agent personas (*.txt) found in {}", .0.display())]
    NoPersonas(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bingo master file {}: {message}", .path.display())]
    InvalidMasterBoard { path: PathBuf, message: String },

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
