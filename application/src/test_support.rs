//! In-memory port implementations shared by the use case tests.

use crate::ports::bingo_evaluator::{BingoError, BingoEvaluator, SquareFilled};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use async_trait::async_trait;
use socialsim_domain::{
    Agent, AgentRegistry, ArchivedConversation, Exchange, LongTermMemory, MemoryError,
    MemoryRepository, ShortTermMemory,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

pub fn registry(names: &[&str]) -> AgentRegistry {
    AgentRegistry::new(
        names
            .iter()
            .map(|n| Agent::new(*n, format!("{n} is friendly")))
            .collect(),
    )
    .unwrap()
}

/// Replies from a queue, then falls back to a fixed reply (or an error).
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    fallback: Result<String, GatewayError>,
    pub prompts: Mutex<Vec<String>>,
    calls: AtomicU32,
}

impl ScriptedGateway {
    pub fn replying(text: &str) -> Self {
        Self::new(vec![], Ok(text.to_string()))
    }

    pub fn failing(error: GatewayError) -> Self {
        Self::new(vec![], Err(error))
    }

    pub fn new(
        replies: Vec<Result<String, GatewayError>>,
        fallback: Result<String, GatewayError>,
    ) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    short_term: Mutex<HashMap<String, ShortTermMemory>>,
    long_term: Mutex<HashMap<String, LongTermMemory>>,
    pub archived: Mutex<Vec<ArchivedConversation>>,
}

impl InMemoryStore {
    pub fn seed_short_term(&self, agent: &str, memory: ShortTermMemory) {
        self.short_term.lock().unwrap().insert(agent.to_string(), memory);
    }
}

impl MemoryRepository for InMemoryStore {
    fn get_short_term(&self, agent: &str) -> ShortTermMemory {
        self.short_term
            .lock()
            .unwrap()
            .get(agent)
            .cloned()
            .unwrap_or_default()
    }

    fn update_short_term(
        &self,
        agent: &str,
        partner: &str,
        exchange: Exchange,
    ) -> Result<(), MemoryError> {
        let mut map = self.short_term.lock().unwrap();
        let record = map.entry(agent.to_string()).or_default();
        if let Some(displaced) = record.record(partner, exchange) {
            self.archived
                .lock()
                .unwrap()
                .push(ArchivedConversation::new(agent, displaced));
        }
        Ok(())
    }

    fn clear_short_term(&self, agent: &str) -> Result<Option<ArchivedConversation>, MemoryError> {
        let record = self.short_term.lock().unwrap().remove(agent);
        let archived = record
            .filter(|r| !r.is_empty())
            .map(|r| ArchivedConversation::new(agent, r));
        if let Some(archived) = &archived {
            self.archived.lock().unwrap().push(archived.clone());
        }
        Ok(archived)
    }

    fn get_long_term(&self, agent: &str) -> LongTermMemory {
        self.long_term
            .lock()
            .unwrap()
            .get(agent)
            .cloned()
            .unwrap_or_default()
    }

    fn update_long_term(&self, agent: &str, partner: &str, summary: &str) -> Result<(), MemoryError> {
        self.long_term
            .lock()
            .unwrap()
            .entry(agent.to_string())
            .or_default()
            .upsert(partner, summary);
        Ok(())
    }
}

/// Records every evaluation and fills nothing.
#[derive(Default)]
pub struct RecordingBingo {
    pub evaluated: Mutex<Vec<(String, String, String)>>,
}

impl BingoEvaluator for RecordingBingo {
    fn evaluate(
        &self,
        agent: &str,
        utterance: &str,
        partner: &str,
    ) -> Result<Option<SquareFilled>, BingoError> {
        self.evaluated.lock().unwrap().push((
            agent.to_string(),
            utterance.to_string(),
            partner.to_string(),
        ));
        Ok(None)
    }

    fn open_goals(&self, _agent: &str) -> Vec<String> {
        vec!["Find someone who sails".to_string()]
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<ConversationEvent>>,
}

impl RecordingLogger {
    pub fn types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.event_type).collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
