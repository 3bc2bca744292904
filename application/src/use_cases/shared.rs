//! Shared utilities for use cases.
//!
//! Contains the retrying model call used for both conversation turns and
//! digestion.

use crate::config::RetryPolicy;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use tracing::{debug, warn};

/// A successful model call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub text: String,
    pub attempts: u32,
}

/// Every attempt failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_error: GatewayError,
}

/// Invoke the gateway, retrying failures according to `policy`.
///
/// Empty completions count as invalid responses and are retried. No delay
/// follows the final attempt.
pub async fn invoke_with_retry(
    gateway: &dyn LlmGateway,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<Invocation, RetryExhausted> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = match gateway.invoke(prompt).await {
            Ok(text) if text.trim().is_empty() => Err(GatewayError::InvalidResponse(
                "empty completion".to_string(),
            )),
            other => other,
        };

        let error = match result {
            Ok(text) => {
                debug!(model = gateway.model(), attempt, "Model call succeeded");
                return Ok(Invocation {
                    text,
                    attempts: attempt,
                });
            }
            Err(error) => error,
        };

        if !policy.should_retry(attempt, &error) {
            warn!(model = gateway.model(), attempt, error = %error, "Model call failed, giving up");
            return Err(RetryExhausted {
                attempts: attempt,
                last_error: error,
            });
        }

        let delay = policy.delay_for(attempt, &error);
        if error.is_rate_limited() {
            warn!(
                model = gateway.model(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Rate limited, backing off"
            );
        } else {
            warn!(
                model = gateway.model(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Model call failed, retrying"
            );
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
