//! Google Generative Language API gateway
//!
//! One `generateContent` call per prompt. HTTP 429 and quota errors map to
//! [`GatewayError::RateLimited`] carrying the server's suggested delay when
//! the response includes one.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use socialsim_application::{GatewayError, LlmGateway};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Connection settings for [`GeminiGateway`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

pub struct GeminiGateway {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiGateway {
    pub fn new(config: GeminiConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

// ==================== Response handling ====================

fn extract_text(response: GenerateResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

static RETRY_IN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)retry in (\d+(?:\.\d+)?)\s*s").ok());

/// Parse `"13s"` / `"1.5s"` durations as used by `RetryInfo.retryDelay`.
fn parse_seconds(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().trim_end_matches('s').parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}

/// Server-suggested delay from `RetryInfo` details or a "retry in Ns" message.
pub(crate) fn suggested_retry_delay(body: &str) -> Option<Duration> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let from_details = envelope
            .error
            .details
            .iter()
            .filter_map(|d| d.get("retryDelay").and_then(|v| v.as_str()))
            .find_map(parse_seconds);
        if from_details.is_some() {
            return from_details;
        }
    }

    let captures = RETRY_IN.as_ref()?.captures(body)?;
    parse_seconds(captures.get(1)?.as_str())
}

/// Map a non-success HTTP response to a gateway error.
pub(crate) fn classify_failure(status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| {
            if e.error.status.is_empty() {
                e.error.message
            } else {
                format!("{}: {}", e.error.status, e.error.message)
            }
        })
        .unwrap_or_else(|_| body.trim().to_string());
    let message = format!("HTTP {}: {}", status, message);

    if status == 429 || GatewayError::looks_rate_limited(&message) {
        return GatewayError::RateLimited {
            retry_after: suggested_retry_delay(body),
            message,
        };
    }

    match status {
        401 | 403 => GatewayError::Unauthorized(message),
        408 | 504 => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(message),
    }
}

fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        extract_text(parsed)
            .ok_or_else(|| GatewayError::InvalidResponse("response contained no text".to_string()))
    }
}
