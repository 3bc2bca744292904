//! Usage telemetry
//!
//! An explicit collector passed to the use cases that make model calls.
//! Token counts are estimates (four characters per token); the provider's
//! own accounting is not consulted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

/// What a model call was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Turn,
    Digest,
}

/// One model call, successful or degraded.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: CallKind,
    pub model: String,
    pub attempts: u32,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub degraded: bool,
}

/// Totals plus the per-call list, as written to `token_usage_*.json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageSummary {
    pub total_calls: usize,
    pub turn_calls: usize,
    pub digest_calls: usize,
    pub degraded_calls: usize,
    pub total_prompt_tokens: usize,
    pub total_completion_tokens: usize,
    pub total_tokens: usize,
    pub calls: Vec<CallRecord>,
}

/// Rough token estimate: one token per four characters.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Thread-safe collector of [`CallRecord`]s.
#[derive(Debug, Default)]
pub struct UsageTelemetry {
    records: Mutex<Vec<CallRecord>>,
}

impl UsageTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call. `completion` is `None` for degraded calls.
    pub fn record(
        &self,
        kind: CallKind,
        model: &str,
        prompt: &str,
        completion: Option<&str>,
        attempts: u32,
    ) {
        let record = CallRecord {
            timestamp: Utc::now(),
            kind,
            model: model.to_string(),
            attempts,
            prompt_tokens: estimate_tokens(prompt),
            completion_tokens: completion.map(estimate_tokens).unwrap_or(0),
            degraded: completion.is_none(),
        };
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> UsageSummary {
        let calls = self
            .records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default();

        let count = |kind: CallKind| calls.iter().filter(|c| c.kind == kind).count();
        let total_prompt_tokens = calls.iter().map(|c| c.prompt_tokens).sum();
        let total_completion_tokens = calls.iter().map(|c| c.completion_tokens).sum();

        UsageSummary {
            total_calls: calls.len(),
            turn_calls: count(CallKind::Turn),
            digest_calls: count(CallKind::Digest),
            degraded_calls: calls.iter().filter(|c| c.degraded).count(),
            total_prompt_tokens,
            total_completion_tokens,
            total_tokens: total_prompt_tokens + total_completion_tokens,
            calls,
        }
    }
}
