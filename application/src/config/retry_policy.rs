//! Retry policy for model calls.
//!
//! One policy is shared by the per-turn call and the digestion call.

use crate::ports::llm_gateway::GatewayError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempt ceiling and backoff schedule.
///
/// Ordinary failures wait `base_delay * multiplier^(attempt-1)`. Rate-limit
/// failures use the provider's suggested delay when present, otherwise
/// `rate_limit_delay * multiplier^(attempt-1)`. Every delay is capped at
/// `max_delay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub rate_limit_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            rate_limit_delay: Duration::from_millis(5000),
            multiplier: 2.0,
            max_delay: Duration::from_millis(60_000),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries `max_attempts` times without sleeping.
    pub fn without_delays(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    /// Attempts actually made; a zero ceiling still makes one call.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether to try again after `attempt` (1-based) failed with `error`.
    pub fn should_retry(&self, attempt: u32, error: &GatewayError) -> bool {
        error.is_retryable() && attempt < self.attempts()
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32, error: &GatewayError) -> Duration {
        if let Some(suggested) = error.retry_after() {
            return suggested.min(self.max_delay);
        }

        let base = if error.is_rate_limited() {
            self.rate_limit_delay
        } else {
            self.base_delay
        };
        let exponent = attempt.saturating_sub(1).min(16) as i32;
        let factor = self.multiplier.max(1.0).powi(exponent);
        let millis = base.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    // ==================== Builder Methods ====================

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}
