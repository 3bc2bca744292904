//! Conversation orchestrator
//!
//! Drives one active pair through its share of a time step: prompt assembly,
//! the model call with retry, sentinel detection, memory updates and bingo
//! evaluation. When a conversation concludes it digests the dialogue into
//! each agent's long-term memory and clears their short-term memory.

use crate::config::RetryPolicy;
use crate::ports::bingo_evaluator::{BingoEvaluator, NoBingo};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, events,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::SimulationProgress;
use crate::ports::transcript_store::CompletedConversation;
use crate::telemetry::{CallKind, UsageTelemetry};
use crate::use_cases::shared::invoke_with_retry;
use serde_json::json;
use socialsim_domain::{
    ActivePair, AgentRegistry, DEGRADED_PLACEHOLDER, DomainError, Exchange, MemoryRepository,
    NO_CONVERSATION_YET, NO_PREVIOUS_MEMORY, PairOutcome, PairingScheduler, PromptTemplate,
    TurnPrompt, contains_sentinel,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of a single utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub speaker: String,
    pub utterance: String,
    /// The model failed every attempt and the placeholder was used.
    pub degraded: bool,
    pub ends_conversation: bool,
}

/// Runs conversations between scheduled pairs.
pub struct ConversationOrchestrator {
    gateway: Arc<dyn LlmGateway>,
    registry: Arc<AgentRegistry>,
    memory: Arc<dyn MemoryRepository>,
    bingo: Arc<dyn BingoEvaluator>,
    logger: Arc<dyn ConversationLogger>,
    telemetry: Arc<UsageTelemetry>,
    retry: RetryPolicy,
    inter_call_delay: Duration,
}

impl ConversationOrchestrator {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        registry: Arc<AgentRegistry>,
        memory: Arc<dyn MemoryRepository>,
    ) -> Self {
        Self {
            gateway,
            registry,
            memory,
            bingo: Arc::new(NoBingo),
            logger: Arc::new(NoConversationLogger),
            telemetry: Arc::new(UsageTelemetry::new()),
            retry: RetryPolicy::default(),
            inter_call_delay: Duration::ZERO,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_bingo(mut self, bingo: Arc<dyn BingoEvaluator>) -> Self {
        self.bingo = bingo;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<UsageTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_inter_call_delay(mut self, delay: Duration) -> Self {
        self.inter_call_delay = delay;
        self
    }

    // ==================== Accessors ====================

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn memory(&self) -> &Arc<dyn MemoryRepository> {
        &self.memory
    }

    pub fn bingo(&self) -> &Arc<dyn BingoEvaluator> {
        &self.bingo
    }

    pub fn logger(&self) -> &Arc<dyn ConversationLogger> {
        &self.logger
    }

    pub fn telemetry(&self) -> &Arc<UsageTelemetry> {
        &self.telemetry
    }

    // ==================== Conversation ====================

    /// Exchange messages for `pair` until its step budget is spent, the
    /// conversation budget runs out, or a speaker emits the sentinel.
    ///
    /// Speakers strictly alternate. Model failures never abort the pair: a
    /// degraded turn still counts as a message so the pair keeps moving.
    pub async fn run_step(
        &self,
        scheduler: &mut PairingScheduler,
        pair: &ActivePair,
        progress: &dyn SimulationProgress,
    ) -> Result<PairOutcome, DomainError> {
        loop {
            if scheduler.conversation_budget_exhausted(&pair.key)? {
                return Ok(PairOutcome::EndedByBudget);
            }
            if scheduler.remaining_step_budget(&pair.key)? == 0 {
                return Ok(PairOutcome::Suspended);
            }

            let exchanged = scheduler.messages_exchanged(&pair.key)?;
            let (speaker, listener) = pair.turn(exchanged);
            let turn = self.take_turn(scheduler, speaker, listener).await?;
            scheduler.record_message(&pair.key)?;
            progress.on_utterance(speaker, listener, turn.degraded);

            if turn.ends_conversation {
                debug!(pair = %pair.key, "Sentinel received");
                return Ok(PairOutcome::EndedBySentinel);
            }
        }
    }

    /// Produce one utterance from `speaker` to `listener` and record it.
    pub async fn take_turn(
        &self,
        scheduler: &PairingScheduler,
        speaker: &str,
        listener: &str,
    ) -> Result<TurnResult, DomainError> {
        let agent = self.registry.get(speaker)?;
        let context = scheduler.prompt_context(speaker, listener)?;

        let short_term = self.memory.get_short_term(speaker);
        let transcript = if short_term.partner() == Some(listener) {
            short_term.transcript()
        } else {
            String::new()
        };
        let long_term = self.memory.get_long_term(speaker);
        let goals = self.bingo.open_goals(speaker);

        let prompt = PromptTemplate::conversation_turn(&TurnPrompt {
            speaker: agent,
            listener,
            transcript: &transcript,
            insight: long_term.insight_about(listener),
            open_goals: &goals,
            context: &context,
        });

        let (utterance, degraded) =
            match invoke_with_retry(self.gateway.as_ref(), &prompt, &self.retry).await {
                Ok(invocation) => {
                    self.telemetry.record(
                        CallKind::Turn,
                        self.gateway.model(),
                        &prompt,
                        Some(&invocation.text),
                        invocation.attempts,
                    );
                    (invocation.text.trim().to_string(), false)
                }
                Err(exhausted) => {
                    warn!(
                        speaker,
                        listener,
                        attempts = exhausted.attempts,
                        error = %exhausted.last_error,
                        "Model unavailable, using placeholder utterance"
                    );
                    self.telemetry.record(
                        CallKind::Turn,
                        self.gateway.model(),
                        &prompt,
                        None,
                        exhausted.attempts,
                    );
                    self.logger.log(ConversationEvent::new(
                        events::MODEL_DEGRADED,
                        json!({
                            "speaker": speaker,
                            "listener": listener,
                            "attempts": exhausted.attempts,
                            "error": exhausted.last_error.to_string(),
                        }),
                    ));
                    (DEGRADED_PLACEHOLDER.to_string(), true)
                }
            };

        let ends_conversation = contains_sentinel(&utterance);
        let exchange = Exchange::single(speaker, utterance.as_str());
        for (agent, partner) in [(speaker, listener), (listener, speaker)] {
            if let Err(e) = self.memory.update_short_term(agent, partner, exchange.clone()) {
                warn!(agent, partner, error = %e, "Failed to update short-term memory");
            }
        }

        if !degraded {
            match self.bingo.evaluate(speaker, &utterance, listener) {
                Ok(Some(filled)) => {
                    info!(agent = speaker, partner = listener, clue = %filled.clue, "Bingo square filled");
                }
                Ok(None) => {}
                Err(e) => warn!(agent = speaker, error = %e, "Bingo evaluation failed"),
            }
        }

        self.logger.log(ConversationEvent::new(
            events::UTTERANCE,
            json!({
                "step": context.time_step,
                "speaker": speaker,
                "listener": listener,
                "message_index": context.messages_exchanged + 1,
                "text": utterance,
                "degraded": degraded,
            }),
        ));

        if !degraded {
            self.pause().await;
        }

        Ok(TurnResult {
            speaker: speaker.to_string(),
            utterance,
            degraded,
            ends_conversation,
        })
    }

    /// Digest the finished conversation into both agents' long-term memory
    /// and archive their short-term memory.
    pub async fn conclude(
        &self,
        pair: &ActivePair,
        outcome: PairOutcome,
        step: usize,
    ) -> CompletedConversation {
        let mut dialogue: Vec<Exchange> = Vec::new();

        for (agent, partner) in [
            (pair.key.first(), pair.key.second()),
            (pair.key.second(), pair.key.first()),
        ] {
            let short_term = self.memory.get_short_term(agent);
            let exchanges = if short_term.partner() == Some(partner) {
                short_term.exchanges().to_vec()
            } else {
                Vec::new()
            };
            if exchanges.len() > dialogue.len() {
                dialogue = exchanges.clone();
            }

            let history = socialsim_domain::render_transcript(&exchanges);
            let previous = self
                .memory
                .get_long_term(agent)
                .insight_about(partner)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(NO_CONVERSATION_YET)
                .to_string();

            let digest = self.digest(&previous, &history, exchanges.len()).await;
            match self.memory.update_long_term(agent, partner, &digest) {
                Ok(()) => self.logger.log(ConversationEvent::new(
                    events::DIGEST_STORED,
                    json!({ "agent": agent, "partner": partner, "digest": digest }),
                )),
                Err(e) => warn!(agent, partner, error = %e, "Failed to store long-term memory"),
            }

            if let Err(e) = self.memory.clear_short_term(agent) {
                warn!(agent, error = %e, "Failed to clear short-term memory");
            }
        }

        info!(pair = %pair.key, ?outcome, messages = dialogue.len(), "Conversation concluded");

        CompletedConversation {
            id: Uuid::new_v4().to_string(),
            pair: pair.key.clone(),
            dialogue,
            outcome,
            step,
        }
    }

    /// Fold `history` into `previous` with one model call.
    ///
    /// Empty input skips the call and yields [`NO_PREVIOUS_MEMORY`]; a failed
    /// call yields a templated summary.
    pub async fn digest(&self, previous: &str, history: &str, exchanges: usize) -> String {
        if previous.trim().is_empty() || history.trim().is_empty() {
            return NO_PREVIOUS_MEMORY.to_string();
        }

        let prompt = PromptTemplate::digest(previous, history);
        match invoke_with_retry(self.gateway.as_ref(), &prompt, &self.retry).await {
            Ok(invocation) => {
                self.telemetry.record(
                    CallKind::Digest,
                    self.gateway.model(),
                    &prompt,
                    Some(&invocation.text),
                    invocation.attempts,
                );
                self.pause().await;
                invocation.text.trim().to_string()
            }
            Err(exhausted) => {
                warn!(
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "Digestion failed, storing fallback summary"
                );
                self.telemetry.record(
                    CallKind::Digest,
                    self.gateway.model(),
                    &prompt,
                    None,
                    exhausted.attempts,
                );
                PromptTemplate::fallback_digest(exchanges)
            }
        }
    }

    async fn pause(&self) {
        if !self.inter_call_delay.is_zero() {
            tokio::time::sleep(self.inter_call_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::progress::NoProgress;
    use crate::test_support::{InMemoryStore, RecordingBingo, RecordingLogger, ScriptedGateway, registry};
    use socialsim_domain::{ConversationBudget, PolicyKind, SchedulingPolicy, StepPlan};
    use std::collections::BTreeMap;

    struct Fixture {
        gateway: Arc<ScriptedGateway>,
        memory: Arc<InMemoryStore>,
        bingo: Arc<RecordingBingo>,
        logger: Arc<RecordingLogger>,
        telemetry: Arc<UsageTelemetry>,
        orchestrator: ConversationOrchestrator,
        scheduler: PairingScheduler,
    }

    fn fixture(gateway: ScriptedGateway, budget: ConversationBudget) -> Fixture {
        let registry = Arc::new(registry(&["alice", "bob"]));
        let gateway = Arc::new(gateway);
        let memory = Arc::new(InMemoryStore::default());
        let bingo = Arc::new(RecordingBingo::default());
        let logger = Arc::new(RecordingLogger::default());
        let telemetry = Arc::new(UsageTelemetry::new());

        let orchestrator =
            ConversationOrchestrator::new(gateway.clone(), registry.clone(), memory.clone())
                .with_bingo(bingo.clone())
                .with_logger(logger.clone())
                .with_telemetry(telemetry.clone())
                .with_retry_policy(RetryPolicy::without_delays(3));

        let policy = SchedulingPolicy::build(PolicyKind::TimeDependent, &registry.names(), None);
        let scheduler = PairingScheduler::new(&registry, policy, budget, 10);

        Fixture {
            gateway,
            memory,
            bingo,
            logger,
            telemetry,
            orchestrator,
            scheduler,
        }
    }

    fn first_pair(fx: &mut Fixture) -> (StepPlan, ActivePair) {
        let plan = fx.scheduler.begin_step(&BTreeMap::new());
        let pair = plan.pairs[0].clone();
        (plan, pair)
    }

    #[tokio::test]
    async fn test_step_budget_suspends_and_alternates_speakers() {
        let mut fx = fixture(ScriptedGateway::replying("Nice weather today."), ConversationBudget::new(2, 4));
        let (_, pair) = first_pair(&mut fx);

        let outcome = fx
            .orchestrator
            .run_step(&mut fx.scheduler, &pair, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcome, PairOutcome::Suspended);
        assert_eq!(fx.scheduler.messages_exchanged(&pair.key).unwrap(), 2);

        let alice = fx.memory.get_short_term("alice");
        assert_eq!(alice.partner(), Some("bob"));
        let speakers: Vec<&str> = alice.exchanges().iter().flat_map(|e| e.speakers()).collect();
        assert_eq!(speakers, vec!["alice", "bob"]);
        assert_eq!(fx.memory.get_short_term("bob").exchanges(), alice.exchanges());
        assert_eq!(fx.telemetry.summary().turn_calls, 2);
    }

    #[tokio::test]
    async fn test_sentinel_ends_conversation() {
        let gateway = ScriptedGateway::new(
            vec![
                Ok("Hello Bob!".to_string()),
                Ok("Gotta run. <END OF CONVERSATION>".to_string()),
            ],
            Ok("unused".to_string()),
        );
        let mut fx = fixture(gateway, ConversationBudget::new(10, 10));
        let (_, pair) = first_pair(&mut fx);

        let outcome = fx
            .orchestrator
            .run_step(&mut fx.scheduler, &pair, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcome, PairOutcome::EndedBySentinel);
        assert_eq!(fx.scheduler.messages_exchanged(&pair.key).unwrap(), 2);
        assert_eq!(fx.gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_ends_conversation() {
        let mut fx = fixture(ScriptedGateway::replying("Tell me more."), ConversationBudget::new(5, 3));
        let (_, pair) = first_pair(&mut fx);

        let outcome = fx
            .orchestrator
            .run_step(&mut fx.scheduler, &pair, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcome, PairOutcome::EndedByBudget);
        assert_eq!(fx.scheduler.messages_exchanged(&pair.key).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_placeholder() {
        let gateway = ScriptedGateway::failing(GatewayError::RateLimited {
            message: "quota exceeded".to_string(),
            retry_after: None,
        });
        let mut fx = fixture(gateway, ConversationBudget::new(1, 10));
        let (_, pair) = first_pair(&mut fx);

        let outcome = fx
            .orchestrator
            .run_step(&mut fx.scheduler, &pair, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcome, PairOutcome::Suspended);
        assert_eq!(fx.gateway.calls(), 3);
        let alice = fx.memory.get_short_term("alice");
        assert_eq!(alice.exchanges()[0].utterance("alice"), Some(DEGRADED_PLACEHOLDER));

        let summary = fx.telemetry.summary();
        assert_eq!(summary.degraded_calls, 1);
        assert_eq!(summary.calls[0].attempts, 3);
        assert!(fx.bingo.evaluated.lock().unwrap().is_empty());
        assert!(fx.logger.types().contains(&events::MODEL_DEGRADED));
    }

    #[tokio::test]
    async fn test_turn_prompt_includes_goals_and_transcript() {
        let mut fx = fixture(ScriptedGateway::replying("I love sailing boats on weekends."), ConversationBudget::new(2, 10));
        let (_, pair) = first_pair(&mut fx);

        fx.orchestrator
            .run_step(&mut fx.scheduler, &pair, &NoProgress)
            .await
            .unwrap();

        let prompts = fx.gateway.prompts.lock().unwrap();
        assert!(prompts[0].contains("Find someone who sails"));
        assert!(prompts[0].contains(NO_CONVERSATION_YET));
        assert!(prompts[1].contains("alice: I love sailing boats on weekends."));

        let evaluated = fx.bingo.evaluated.lock().unwrap();
        assert_eq!(evaluated.len(), 2);
        assert_eq!(evaluated[0].0, "alice");
        assert_eq!(evaluated[0].2, "bob");
    }

    #[tokio::test]
    async fn test_conclude_digests_and_clears_memory() {
        let mut fx = fixture(ScriptedGateway::replying("Bob likes chess."), ConversationBudget::new(2, 2));
        let (_, pair) = first_pair(&mut fx);
        let outcome = fx
            .orchestrator
            .run_step(&mut fx.scheduler, &pair, &NoProgress)
            .await
            .unwrap();
        assert_eq!(outcome, PairOutcome::EndedByBudget);

        let conversation = fx.orchestrator.conclude(&pair, outcome, 1).await;

        assert_eq!(conversation.pair, pair.key);
        assert_eq!(conversation.dialogue.len(), 2);
        assert_eq!(conversation.step, 1);
        assert_eq!(
            fx.memory.get_long_term("alice").insight_about("bob"),
            Some("Bob likes chess.")
        );
        assert!(fx.memory.get_long_term("bob").insight_about("alice").is_some());
        assert!(fx.memory.get_short_term("alice").is_empty());
        assert!(fx.memory.get_short_term("bob").is_empty());
        assert_eq!(fx.memory.archived.lock().unwrap().len(), 2);
        assert_eq!(fx.telemetry.summary().digest_calls, 2);

        let prompts = fx.gateway.prompts.lock().unwrap();
        assert!(prompts[2].contains(NO_CONVERSATION_YET));
    }

    #[tokio::test]
    async fn test_digest_skips_degenerate_input() {
        let fx = fixture(ScriptedGateway::replying("unused"), ConversationBudget::default());
        assert_eq!(fx.orchestrator.digest("", "alice: hi", 1).await, NO_PREVIOUS_MEMORY);
        assert_eq!(fx.orchestrator.digest("Likes tea", "  ", 0).await, NO_PREVIOUS_MEMORY);
        assert_eq!(fx.gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_digest_failure_uses_fallback() {
        let fx = fixture(ScriptedGateway::failing(GatewayError::Timeout), ConversationBudget::default());
        let digest = fx.orchestrator.digest("Likes tea", "alice: hi\nbob: hey\nalice: bye", 3).await;
        assert_eq!(digest, "Conversation summary: 3 exchanges have occurred.");
        assert_eq!(fx.gateway.calls(), 3);
        assert_eq!(fx.telemetry.summary().degraded_calls, 1);
    }
}
