//! Run Simulation use case
//!
//! Drives the pairing scheduler step by step until every pair has talked,
//! the step limit is hit, the conversation cap is reached, or no pair can
//! be formed.

use crate::config::SimulationParams;
use crate::ports::conversation_logger::{ConversationEvent, events};
use crate::ports::progress::{NoProgress, SimulationProgress};
use crate::ports::transcript_store::{CompletedConversation, NoTranscriptStore, TranscriptStore};
use crate::use_cases::run_conversation::ConversationOrchestrator;
use serde::Serialize;
use serde_json::json;
use socialsim_domain::{
    AgentSnapshot, BoardSummary, DomainError, PairOrigin, PairingScheduler, PolicyKind,
    ResumeHint, SchedulingPolicy,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors that can occur during a simulation run
#[derive(Error, Debug)]
pub enum RunSimulationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    AllPairsCompleted,
    StepBudgetExhausted,
    ConversationCapReached,
    Deadlock,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::AllPairsCompleted => "all pairs completed",
            TerminationReason::StepBudgetExhausted => "time step budget exhausted",
            TerminationReason::ConversationCapReached => "conversation cap reached",
            TerminationReason::Deadlock => "no pair could be formed",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub experiment_id: String,
    pub policy: PolicyKind,
    pub steps_executed: usize,
    pub completed_conversations: usize,
    pub total_possible_conversations: usize,
    pub termination: TerminationReason,
    pub agents: Vec<AgentSnapshot>,
    pub bingo: BTreeMap<String, BoardSummary>,
    pub conversations: Vec<CompletedConversation>,
    pub elapsed: Duration,
}

impl SimulationReport {
    pub fn is_complete(&self) -> bool {
        self.termination == TerminationReason::AllPairsCompleted
    }
}

/// Use case for running a full simulation
pub struct RunSimulationUseCase {
    orchestrator: ConversationOrchestrator,
    transcripts: Arc<dyn TranscriptStore>,
    params: SimulationParams,
    experiment_id: String,
}

impl RunSimulationUseCase {
    pub fn new(orchestrator: ConversationOrchestrator, params: SimulationParams) -> Self {
        Self {
            orchestrator,
            transcripts: Arc::new(NoTranscriptStore),
            params,
            experiment_id: Uuid::new_v4().to_string(),
        }
    }

    /// Use a caller-chosen run identifier instead of a fresh UUID
    pub fn with_experiment_id(mut self, experiment_id: impl Into<String>) -> Self {
        self.experiment_id = experiment_id.into();
        self
    }

    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    pub fn with_transcripts(mut self, transcripts: Arc<dyn TranscriptStore>) -> Self {
        self.transcripts = transcripts;
        self
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self) -> Result<SimulationReport, RunSimulationError> {
        self.execute_with_progress(&NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        progress: &dyn SimulationProgress,
    ) -> Result<SimulationReport, RunSimulationError> {
        let started = Instant::now();
        let experiment_id = self.experiment_id.clone();
        let registry = self.orchestrator.registry();
        let logger = self.orchestrator.logger();

        let policy = SchedulingPolicy::build(self.params.policy, &registry.names(), self.params.seed);
        let mut scheduler = PairingScheduler::new(
            registry,
            policy,
            self.params.budget,
            self.params.max_time_steps,
        );

        info!(
            experiment_id = %experiment_id,
            agents = registry.len(),
            policy = %self.params.policy,
            total_pairs = scheduler.total_possible_conversations(),
            "Starting simulation"
        );
        logger.log(ConversationEvent::new(
            events::SIMULATION_STARTED,
            json!({
                "experiment_id": experiment_id,
                "policy": self.params.policy.as_str(),
                "agents": registry.names(),
                "messages_per_time_step": self.params.budget.messages_per_time_step(),
                "messages_per_conversation": self.params.budget.messages_per_conversation(),
                "max_time_steps": self.params.max_time_steps,
            }),
        ));
        progress.on_simulation_start(
            registry.len(),
            scheduler.total_possible_conversations(),
            self.params.max_time_steps,
        );

        let mut conversations: Vec<CompletedConversation> = Vec::new();
        let termination = loop {
            if scheduler.is_complete() {
                break TerminationReason::AllPairsCompleted;
            }
            if self.cap_reached(conversations.len()) {
                break TerminationReason::ConversationCapReached;
            }
            if scheduler.step_limit_reached() {
                break TerminationReason::StepBudgetExhausted;
            }

            let hints = self.resume_hints(&scheduler);
            let plan = scheduler.begin_step(&hints);
            if scheduler.is_deadlocked() {
                warn!(step = plan.step, "No pair could be formed, stopping");
                break TerminationReason::Deadlock;
            }
            if plan.is_empty() {
                continue;
            }

            debug!(step = plan.step, pairs = plan.len(), "Step started");
            logger.log(ConversationEvent::new(
                events::STEP_STARTED,
                json!({
                    "step": plan.step,
                    "pairs": plan.pairs.iter().map(|p| p.key.to_string()).collect::<Vec<_>>(),
                }),
            ));
            progress.on_step_start(&plan);

            for pair in &plan.pairs {
                if self.cap_reached(conversations.len()) {
                    break;
                }

                let event = match pair.origin {
                    PairOrigin::New => Some(events::PAIR_STARTED),
                    PairOrigin::Resumed => Some(events::PAIR_RESUMED),
                    PairOrigin::CarriedOver => None,
                };
                if let Some(event) = event {
                    logger.log(ConversationEvent::new(
                        event,
                        json!({
                            "step": plan.step,
                            "pair": [pair.key.first(), pair.key.second()],
                            "messages_exchanged": scheduler.messages_exchanged(&pair.key)?,
                        }),
                    ));
                }

                let outcome = self
                    .orchestrator
                    .run_step(&mut scheduler, pair, progress)
                    .await?;
                if !outcome.is_concluded() {
                    continue;
                }

                let conversation = self.orchestrator.conclude(pair, outcome, plan.step).await;
                scheduler.complete_conversation(&pair.key)?;

                if let Err(e) = self.transcripts.record_conversation(&conversation) {
                    warn!(pair = %pair.key, error = %e, "Failed to write conversation log");
                }
                logger.log(ConversationEvent::new(
                    events::PAIR_COMPLETED,
                    json!({
                        "step": plan.step,
                        "pair": [pair.key.first(), pair.key.second()],
                        "conversation_id": conversation.id,
                        "outcome": outcome,
                        "messages": conversation.dialogue.len(),
                    }),
                ));
                progress.on_pair_complete(
                    &pair.key,
                    outcome,
                    scheduler.completed_conversations(),
                    scheduler.total_possible_conversations(),
                );
                conversations.push(conversation);
            }

            logger.log(ConversationEvent::new(
                events::STEP_COMPLETED,
                json!({
                    "step": plan.step,
                    "completed_conversations": scheduler.completed_conversations(),
                }),
            ));
            progress.on_step_complete(
                plan.step,
                scheduler.completed_conversations(),
                scheduler.total_possible_conversations(),
            );
        };

        if let Err(e) = self.transcripts.record_run(&experiment_id, &conversations) {
            warn!(error = %e, "Failed to write run transcript");
        }

        let bingo = registry
            .names()
            .into_iter()
            .filter_map(|name| {
                let summary = self.orchestrator.bingo().summary(&name)?;
                Some((name, summary))
            })
            .collect();

        let report = SimulationReport {
            experiment_id,
            policy: self.params.policy,
            steps_executed: scheduler.current_step(),
            completed_conversations: scheduler.completed_conversations(),
            total_possible_conversations: scheduler.total_possible_conversations(),
            termination,
            agents: scheduler.snapshots(),
            bingo,
            conversations,
            elapsed: started.elapsed(),
        };

        info!(
            steps = report.steps_executed,
            completed = report.completed_conversations,
            total = report.total_possible_conversations,
            termination = %report.termination,
            "Simulation finished"
        );
        logger.log(ConversationEvent::new(
            events::SIMULATION_FINISHED,
            json!({
                "experiment_id": report.experiment_id,
                "steps_executed": report.steps_executed,
                "completed_conversations": report.completed_conversations,
                "total_possible_conversations": report.total_possible_conversations,
                "termination": report.termination,
            }),
        ));
        progress.on_simulation_complete(
            report.completed_conversations,
            report.total_possible_conversations,
        );

        Ok(report)
    }

    fn cap_reached(&self, completed: usize) -> bool {
        self.params
            .max_total_conversations
            .is_some_and(|cap| completed >= cap)
    }

    /// Unfinished conversations recorded in idle agents' short-term memory.
    fn resume_hints(&self, scheduler: &PairingScheduler) -> BTreeMap<String, ResumeHint> {
        let memory = self.orchestrator.memory();
        scheduler
            .idle_agents()
            .into_iter()
            .filter_map(|name| {
                let short_term = memory.get_short_term(name);
                let partner = short_term.partner()?;
                Some((
                    name.to_string(),
                    ResumeHint::new(partner, short_term.exchanges().len()),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::transcript_store::TranscriptError;
    use crate::telemetry::UsageTelemetry;
    use crate::test_support::{InMemoryStore, RecordingLogger, ScriptedGateway, registry};
    use socialsim_domain::{
        AgentStatus, ConversationBudget, END_OF_CONVERSATION, Exchange, MemoryRepository,
        PairOutcome, ShortTermMemory,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTranscripts {
        conversations: Mutex<Vec<String>>,
        runs: Mutex<Vec<(String, usize)>>,
    }

    impl TranscriptStore for RecordingTranscripts {
        fn record_conversation(
            &self,
            conversation: &CompletedConversation,
        ) -> Result<(), TranscriptError> {
            self.conversations.lock().unwrap().push(conversation.log_key());
            Ok(())
        }

        fn record_run(
            &self,
            experiment_id: &str,
            conversations: &[CompletedConversation],
        ) -> Result<(), TranscriptError> {
            self.runs
                .lock()
                .unwrap()
                .push((experiment_id.to_string(), conversations.len()));
            Ok(())
        }
    }

    struct Harness {
        memory: Arc<InMemoryStore>,
        logger: Arc<RecordingLogger>,
        telemetry: Arc<UsageTelemetry>,
        transcripts: Arc<RecordingTranscripts>,
        use_case: RunSimulationUseCase,
    }

    fn harness(agents: &[&str], gateway: ScriptedGateway, params: SimulationParams) -> Harness {
        harness_with_memory(agents, gateway, params, InMemoryStore::default())
    }

    fn harness_with_memory(
        agents: &[&str],
        gateway: ScriptedGateway,
        params: SimulationParams,
        memory: InMemoryStore,
    ) -> Harness {
        let memory = Arc::new(memory);
        let logger = Arc::new(RecordingLogger::default());
        let telemetry = Arc::new(UsageTelemetry::new());
        let transcripts = Arc::new(RecordingTranscripts::default());

        let orchestrator = ConversationOrchestrator::new(
            Arc::new(gateway),
            Arc::new(registry(agents)),
            memory.clone(),
        )
        .with_logger(logger.clone())
        .with_telemetry(telemetry.clone())
        .with_retry_policy(RetryPolicy::without_delays(2));

        let use_case =
            RunSimulationUseCase::new(orchestrator, params).with_transcripts(transcripts.clone());

        Harness {
            memory,
            logger,
            telemetry,
            transcripts,
            use_case,
        }
    }

    fn params(per_step: usize, per_conversation: usize) -> SimulationParams {
        SimulationParams::default().with_budget(ConversationBudget::new(per_step, per_conversation))
    }

    #[tokio::test]
    async fn test_four_agents_complete_every_pair() {
        let h = harness(
            &["A", "B", "C", "D"],
            ScriptedGateway::replying("Pleasure to chat."),
            params(2, 4),
        );

        let report = h.use_case.execute().await.unwrap();

        assert_eq!(report.termination, TerminationReason::AllPairsCompleted);
        assert!(report.is_complete());
        assert_eq!(report.completed_conversations, 6);
        assert_eq!(report.total_possible_conversations, 6);
        assert_eq!(report.steps_executed, 6);
        assert_eq!(report.conversations.len(), 6);
        assert!(report.conversations.iter().all(|c| c.dialogue.len() == 4));
        for agent in &report.agents {
            assert_eq!(agent.total_conversations, 3);
            assert_eq!(agent.available_partners, 0);
        }

        assert_eq!(h.transcripts.conversations.lock().unwrap().len(), 6);
        let runs = h.transcripts.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0], (report.experiment_id.clone(), 6));
    }

    #[tokio::test]
    async fn test_sentinel_frees_both_agents_within_the_step() {
        let gateway = ScriptedGateway::new(
            vec![
                Ok("Nice to meet you.".to_string()),
                Ok(format!("Lovely chatting. {END_OF_CONVERSATION}")),
            ],
            Ok("Pleasant first meeting.".to_string()),
        );
        let h = harness(&["A", "B", "C"], gateway, params(4, 10).with_max_time_steps(1));

        let report = h.use_case.execute().await.unwrap();

        assert_eq!(report.steps_executed, 1);
        assert_eq!(report.completed_conversations, 1);
        assert_eq!(report.conversations[0].outcome, PairOutcome::EndedBySentinel);
        assert_eq!(report.conversations[0].dialogue.len(), 2);
        assert_eq!(report.conversations[0].step, 1);
        for agent in &report.agents {
            assert_eq!(agent.status, AgentStatus::Idle);
            assert!(agent.current_partner.is_none());
        }
        assert!(h.memory.get_short_term("A").exchanges().is_empty());
        assert!(h.memory.get_short_term("B").exchanges().is_empty());
    }

    #[tokio::test]
    async fn test_step_limit_stops_mid_conversation() {
        let h = harness(
            &["A", "B", "C", "D"],
            ScriptedGateway::replying("Still talking."),
            params(2, 4).with_max_time_steps(1),
        );

        let report = h.use_case.execute().await.unwrap();

        assert_eq!(report.termination, TerminationReason::StepBudgetExhausted);
        assert_eq!(report.steps_executed, 1);
        assert_eq!(report.completed_conversations, 0);
        assert_eq!(h.memory.get_short_term("A").exchanges().len(), 2);
        assert_eq!(h.memory.get_short_term("A").partner(), Some("B"));
    }

    #[tokio::test]
    async fn test_conversation_cap() {
        let h = harness(
            &["A", "B", "C", "D"],
            ScriptedGateway::replying("Hi."),
            params(10, 2).with_max_total_conversations(Some(1)),
        );

        let report = h.use_case.execute().await.unwrap();

        assert_eq!(report.termination, TerminationReason::ConversationCapReached);
        assert_eq!(report.conversations.len(), 1);
    }

    #[tokio::test]
    async fn test_resumes_conversation_from_memory() {
        let memory = InMemoryStore::default();
        for (agent, partner) in [("alice", "bob"), ("bob", "alice")] {
            let mut record = ShortTermMemory::with_partner(partner);
            for speaker in ["alice", "bob", "alice"] {
                record.record(partner, Exchange::single(speaker, "earlier words"));
            }
            memory.seed_short_term(agent, record);
        }

        let h = harness_with_memory(
            &["alice", "bob", "carol"],
            ScriptedGateway::replying("Where were we?"),
            params(10, 4).with_max_time_steps(1),
            memory,
        );

        let report = h.use_case.execute().await.unwrap();

        assert_eq!(report.conversations.len(), 1);
        let conversation = &report.conversations[0];
        assert_eq!(conversation.dialogue.len(), 4);
        assert_eq!(conversation.dialogue[3].utterance("bob"), Some("Where were we?"));
        assert!(h.logger.types().contains(&events::PAIR_RESUMED));
    }

    #[tokio::test]
    async fn test_event_log_brackets_run() {
        let h = harness(&["A", "B"], ScriptedGateway::replying("Hello."), params(2, 2));

        h.use_case.execute().await.unwrap();

        let types = h.logger.types();
        assert_eq!(types.first(), Some(&events::SIMULATION_STARTED));
        assert_eq!(types.last(), Some(&events::SIMULATION_FINISHED));
        assert!(types.contains(&events::PAIR_STARTED));
        assert!(types.contains(&events::PAIR_COMPLETED));
        assert_eq!(types.iter().filter(|t| **t == events::UTTERANCE).count(), 2);
        assert_eq!(types.iter().filter(|t| **t == events::DIGEST_STORED).count(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_model_still_terminates() {
        let gateway = ScriptedGateway::failing(GatewayError::RateLimited {
            message: "429".to_string(),
            retry_after: None,
        });
        let h = harness(&["A", "B", "C"], gateway, params(2, 2));

        let report = h.use_case.execute().await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.completed_conversations, 3);
        let summary = h.telemetry.summary();
        assert_eq!(summary.degraded_calls, summary.total_calls);
        assert_eq!(summary.turn_calls, 6);
        assert_eq!(summary.digest_calls, 6);
        assert_eq!(
            h.memory.get_long_term("A").insight_about("B"),
            Some("Conversation summary: 2 exchanges have occurred.")
        );
    }

    #[tokio::test]
    async fn test_single_agent_has_nothing_to_do() {
        let h = harness(&["solo"], ScriptedGateway::replying("..."), params(2, 2));
        let report = h.use_case.execute().await.unwrap();
        assert_eq!(report.termination, TerminationReason::AllPairsCompleted);
        assert_eq!(report.steps_executed, 0);
        assert_eq!(report.total_possible_conversations, 0);
    }

    #[tokio::test]
    async fn test_round_robin_policy() {
        let h = harness(
            &["A", "B", "C", "D", "E"],
            ScriptedGateway::replying("Hi there."),
            params(1, 2).with_policy(PolicyKind::RoundRobin),
        );
        let report = h.use_case.execute().await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.steps_executed, 5);
        assert_eq!(report.completed_conversations, 10);
    }

    #[tokio::test]
    async fn test_random_pairs_policy() {
        let h = harness(
            &["A", "B", "C", "D"],
            ScriptedGateway::replying("Hi there."),
            params(1, 2).with_policy(PolicyKind::RandomPairs).with_seed(Some(3)),
        );
        let report = h.use_case.execute().await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.completed_conversations, 6);
    }
}
