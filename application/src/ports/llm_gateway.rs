//! LLM Gateway port
//!
//! Defines the interface for the language model that voices every agent.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// HTTP 429 or a quota-exceeded response.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Delay suggested by the provider, if it sent one.
        retry_after: Option<Duration>,
    },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Bad or missing credentials. Retrying cannot help.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl GatewayError {
    /// Classify a free-form provider error message.
    ///
    /// Messages mentioning `429`, quota or rate limits become
    /// [`GatewayError::RateLimited`]; everything else is a request failure.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if Self::looks_rate_limited(&message) {
            GatewayError::RateLimited {
                message,
                retry_after: None,
            }
        } else {
            GatewayError::RequestFailed(message)
        }
    }

    pub fn looks_rate_limited(message: &str) -> bool {
        let lower = message.to_lowercase();
        lower.contains("429")
            || lower.contains("quota")
            || lower.contains("rate limit")
            || lower.contains("resource_exhausted")
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::RateLimited { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GatewayError::Unauthorized(_))
    }
}

/// Gateway for LLM communication
///
/// One call per utterance or digest: the prompt carries all context, so
/// implementations keep no conversation state. Adapters live in the
/// infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Model identifier, for logs and telemetry.
    fn model(&self) -> &str;

    /// Complete `prompt` and return the generated text.
    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError>;
}
