//! Offline gateway with deterministic canned replies.
//!
//! Lets the scheduler and stores be exercised without network access. Turn
//! prompts get a rotating small-talk line; digestion prompts get a short note.

use async_trait::async_trait;
use regex::Regex;
use socialsim_application::{GatewayError, LlmGateway};
use socialsim_domain::{DIGEST_PREAMBLE, END_OF_CONVERSATION};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const OFFLINE_MODEL: &str = "offline";

const LINES: [&str; 6] = [
    "It's lovely to meet you, what brings you to this event tonight?",
    "I've been hoping to find people who enjoy travelling and long walks.",
    "That sounds fascinating, tell me more about how you got into it.",
    "I spent last summer learning to cook dishes from my grandmother's village.",
    "We should compare notes on good books sometime, I read a lot of history.",
    "Honestly the best part of these evenings is hearing everyone's stories.",
];

static SPEAKER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^You are ([^.\n]+)\.").ok());
static MESSAGE_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Message (\d+) of at most").ok());

pub struct OfflineGateway {
    calls: AtomicUsize,
    /// Append the end marker from this message number onwards.
    end_after: Option<usize>,
}

impl OfflineGateway {
    pub fn new(end_after: Option<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            end_after,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn capture<'a>(regex: &LazyLock<Option<Regex>>, prompt: &'a str) -> Option<&'a str> {
        Some(regex.as_ref()?.captures(prompt)?.get(1)?.as_str())
    }

    fn turn_reply(&self, prompt: &str, call: usize) -> String {
        let speaker = Self::capture(&SPEAKER, prompt).unwrap_or("someone");
        let line = LINES[call % LINES.len()];
        let mut reply = format!("({}) {}", speaker, line);

        let message = Self::capture(&MESSAGE_NUMBER, prompt).and_then(|n| n.parse::<usize>().ok());
        if let (Some(limit), Some(message)) = (self.end_after, message)
            && message >= limit
        {
            reply.push(' ');
            reply.push_str(END_OF_CONVERSATION);
        }
        reply
    }
}

impl Default for OfflineGateway {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl LlmGateway for OfflineGateway {
    fn model(&self) -> &str {
        OFFLINE_MODEL
    }

    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if prompt.starts_with(DIGEST_PREAMBLE) {
            let lines = prompt.lines().filter(|l| l.contains(": ")).count();
            return Ok(format!(
                "Friendly chat covering {} remarks; would enjoy talking again.",
                lines
            ));
        }

        Ok(self.turn_reply(prompt, call))
    }
}
