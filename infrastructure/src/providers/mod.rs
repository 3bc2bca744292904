//! Language model providers.

pub mod gemini;
pub mod offline;

use crate::config::FileModelConfig;
use crate::error::ConfigurationError;
use gemini::{GeminiConfig, GeminiGateway};
use offline::OfflineGateway;
use socialsim_application::LlmGateway;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Which backend answers prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    /// Google Generative Language API.
    #[default]
    Gemini,
    /// Deterministic canned replies, no network.
    Offline,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Offline => "offline",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "offline" | "scripted" => Ok(ProviderKind::Offline),
            other => Err(other.to_string()),
        }
    }
}

/// Build the gateway selected by `[model]`.
///
/// `kind` overrides `model.provider` (the CLI's `--offline`). The Gemini
/// API key is read from the environment variable named by `api_key_env`.
pub fn build_gateway(
    model: &FileModelConfig,
    kind: ProviderKind,
) -> Result<Arc<dyn LlmGateway>, ConfigurationError> {
    match kind {
        ProviderKind::Offline => {
            info!("Using offline model");
            Ok(Arc::new(OfflineGateway::new(model.offline_end_after)))
        }
        ProviderKind::Gemini => {
            let api_key = std::env::var(&model.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| ConfigurationError::MissingApiKey(model.api_key_env.clone()))?;

            let gateway = GeminiGateway::new(GeminiConfig {
                api_key,
                model: model.name.clone(),
                base_url: model.base_url.clone(),
                temperature: model.temperature,
                timeout: Duration::from_secs(model.timeout_secs.max(1)),
            })
            .map_err(|e| ConfigurationError::Invalid(e.to_string()))?;

            info!(model = %model.name, "Using Gemini model");
            Ok(Arc::new(gateway))
        }
    }
}
