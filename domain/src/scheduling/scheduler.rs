//! Pairing scheduler state machine
//!
//! One scheduler instance owns the state of every agent for a run. Each
//! time step the caller asks for a [`StepPlan`], drives the listed pairs
//! through their messages via [`PairingScheduler::record_message`], and
//! concludes finished conversations with
//! [`PairingScheduler::complete_conversation`].

use super::budget::ConversationBudget;
use super::context::{PromptContext, RoundInfo};
use super::pair::{ActivePair, PairKey, PairOrigin};
use super::policy::{PolicyKind, SchedulingPolicy};
use super::state::{AgentSnapshot, AgentState};
use crate::agent::registry::AgentRegistry;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Unfinished pairing recovered from an idle agent's short-term memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeHint {
    pub partner: String,
    /// Messages already exchanged in the interrupted conversation.
    pub exchanged: usize,
}

impl ResumeHint {
    pub fn new(partner: impl Into<String>, exchanged: usize) -> Self {
        Self {
            partner: partner.into(),
            exchanged,
        }
    }
}

/// Pairs that talk during one time step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepPlan {
    pub step: usize,
    pub pairs: Vec<ActivePair>,
}

impl StepPlan {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// How a pair's turn within a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairOutcome {
    /// Step budget spent; the conversation continues next step.
    Suspended,
    /// A speaker produced the end-of-conversation sentinel.
    EndedBySentinel,
    /// The per-conversation message budget was reached.
    EndedByBudget,
}

impl PairOutcome {
    pub fn is_concluded(&self) -> bool {
        !matches!(self, PairOutcome::Suspended)
    }
}

/// The scheduling state machine for a whole run.
#[derive(Debug, Clone)]
pub struct PairingScheduler {
    order: Vec<String>,
    states: HashMap<String, AgentState>,
    policy: SchedulingPolicy,
    budget: ConversationBudget,
    max_time_steps: usize,
    current_step: usize,
    total_possible: usize,
    experiment_complete: bool,
    deadlocked: bool,
    rounds: HashMap<PairKey, usize>,
}

impl PairingScheduler {
    pub fn new(
        registry: &AgentRegistry,
        policy: SchedulingPolicy,
        budget: ConversationBudget,
        max_time_steps: usize,
    ) -> Self {
        let order = registry.names();
        let states = order
            .iter()
            .map(|name| (name.clone(), AgentState::new(name.clone())))
            .collect();
        let total_possible = registry.total_possible_pairs();

        Self {
            order,
            states,
            policy,
            budget,
            max_time_steps,
            current_step: 0,
            total_possible,
            experiment_complete: total_possible == 0,
            deadlocked: false,
            rounds: HashMap::new(),
        }
    }

    // ==================== Queries ====================

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    pub fn budget(&self) -> ConversationBudget {
        self.budget
    }

    pub fn max_time_steps(&self) -> usize {
        self.max_time_steps
    }

    /// 1-based index of the step most recently begun (0 before the first).
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_limit_reached(&self) -> bool {
        self.current_step >= self.max_time_steps
    }

    /// Every distinct pair has completed a conversation.
    pub fn is_complete(&self) -> bool {
        self.experiment_complete
    }

    /// The last step formed no pairs although conversations remain.
    pub fn is_deadlocked(&self) -> bool {
        self.deadlocked
    }

    pub fn total_possible_conversations(&self) -> usize {
        self.total_possible
    }

    pub fn completed_conversations(&self) -> usize {
        let endpoints: usize = self.states.values().map(|s| s.past_partners().len()).sum();
        endpoints / 2
    }

    pub fn state(&self, name: &str) -> Result<&AgentState, DomainError> {
        self.states
            .get(name)
            .ok_or_else(|| DomainError::UnknownAgent(name.to_string()))
    }

    pub fn idle_agents(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.is_idle(name))
            .map(String::as_str)
            .collect()
    }

    /// Pairs currently conversing, in registry order.
    pub fn active_pairs(&self) -> Vec<PairKey> {
        self.collect_active(&HashMap::new())
            .into_iter()
            .map(|pair| pair.key)
            .collect()
    }

    /// Partners `name` has not yet completed a conversation with.
    pub fn available_partners(&self, name: &str) -> usize {
        self.states
            .get(name)
            .map(|s| (self.order.len() - 1).saturating_sub(s.past_partners().len()))
            .unwrap_or(0)
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.order
            .iter()
            .filter_map(|name| self.states.get(name))
            .map(|s| AgentSnapshot {
                name: s.name().to_string(),
                status: s.status(),
                current_partner: s.current_partner().map(str::to_string),
                total_conversations: s.total_conversations(),
                past_partners: s.past_partners().iter().cloned().collect(),
                available_partners: self.available_partners(s.name()),
            })
            .collect()
    }

    // ==================== Step lifecycle ====================

    /// Advance to the next time step and decide which pairs talk.
    ///
    /// Per-step counters are reset first. Idle agents whose short-term memory
    /// names an eligible partner are re-paired with it before the policy
    /// forms new pairs; pairs still conversing from the previous step are
    /// carried over.
    pub fn begin_step(&mut self, resume_hints: &BTreeMap<String, ResumeHint>) -> StepPlan {
        self.current_step += 1;
        self.deadlocked = false;
        for state in self.states.values_mut() {
            state.reset_step_counter();
        }

        let step = self.current_step;
        if self.refresh_completion() {
            return StepPlan {
                step,
                pairs: Vec::new(),
            };
        }

        let mut formed = HashMap::new();
        self.resume_from_hints(resume_hints, &mut formed);
        match self.policy.kind() {
            PolicyKind::TimeDependent => self.first_fit(&mut formed),
            PolicyKind::RoundRobin | PolicyKind::RandomPairs => self.take_from_queue(&mut formed),
        }

        let pairs = self.collect_active(&formed);
        if pairs.is_empty() && !self.refresh_completion() {
            self.deadlocked = true;
        }

        StepPlan { step, pairs }
    }

    /// Messages the pair may still exchange in the current step.
    ///
    /// Time-dependent runs cap this by the per-step budget; the other
    /// policies run each conversation to completion within its step.
    pub fn remaining_step_budget(&self, key: &PairKey) -> Result<usize, DomainError> {
        let (a, b) = self.ensure_active(key)?;
        let conversation_left = self
            .budget
            .messages_per_conversation()
            .saturating_sub(a.messages_in_current_conversation());

        if self.policy.kind().spans_steps() {
            let used = a.messages_this_time_step().max(b.messages_this_time_step());
            let step_left = self.budget.messages_per_time_step().saturating_sub(used);
            Ok(conversation_left.min(step_left))
        } else {
            Ok(conversation_left)
        }
    }

    pub fn messages_exchanged(&self, key: &PairKey) -> Result<usize, DomainError> {
        let (a, _) = self.ensure_active(key)?;
        Ok(a.messages_in_current_conversation())
    }

    pub fn conversation_budget_exhausted(&self, key: &PairKey) -> Result<bool, DomainError> {
        Ok(self.messages_exchanged(key)? >= self.budget.messages_per_conversation())
    }

    /// Count one message for both members of the pair.
    ///
    /// Returns the number of messages exchanged so far in the conversation.
    pub fn record_message(&mut self, key: &PairKey) -> Result<usize, DomainError> {
        self.ensure_active(key)?;
        for name in [key.first(), key.second()] {
            if let Some(state) = self.states.get_mut(name) {
                state.record_message();
            }
        }
        self.messages_exchanged(key)
    }

    /// Conclude the pair's conversation and return both agents to idle.
    ///
    /// Each agent records the other as a past partner, so the pair is never
    /// formed again.
    pub fn complete_conversation(&mut self, key: &PairKey) -> Result<(), DomainError> {
        self.ensure_active(key)?;
        for name in [key.first(), key.second()] {
            if let Some(state) = self.states.get_mut(name) {
                state.finish_conversation();
            }
        }
        self.refresh_completion();
        Ok(())
    }

    /// Scheduling facts for the prompt of `speaker` addressing `listener`.
    pub fn prompt_context(&self, speaker: &str, listener: &str) -> Result<PromptContext, DomainError> {
        let key = PairKey::new(speaker, listener)?;
        self.ensure_active(&key)?;
        let s = self.state(speaker)?;
        let l = self.state(listener)?;

        let round = self
            .rounds
            .get(&key)
            .copied()
            .zip(self.policy.total_rounds())
            .map(|(index, total)| RoundInfo {
                index: index + 1,
                total,
            });

        Ok(PromptContext {
            time_step: self.current_step,
            max_time_steps: self.max_time_steps,
            messages_exchanged: s.messages_in_current_conversation(),
            max_messages: self.budget.messages_per_conversation(),
            speaker_past_partners: s.past_partners().iter().cloned().collect(),
            listener_past_partners: l.past_partners().iter().cloned().collect(),
            speaker_total_conversations: s.total_conversations(),
            listener_total_conversations: l.total_conversations(),
            speaker_available_partners: self.available_partners(speaker),
            listener_available_partners: self.available_partners(listener),
            experiment_complete: self.experiment_complete,
            total_possible_conversations: self.total_possible,
            completed_conversations: self.completed_conversations(),
            round,
        })
    }

    // ==================== Internals ====================

    fn is_idle(&self, name: &str) -> bool {
        self.states.get(name).is_some_and(AgentState::is_idle)
    }

    fn can_pair(&self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        match (self.states.get(a), self.states.get(b)) {
            (Some(sa), Some(sb)) => sa.is_idle() && sb.is_idle() && !sa.has_talked_to(b),
            _ => false,
        }
    }

    fn pair_finished(&self, key: &PairKey) -> bool {
        self.states
            .get(key.first())
            .is_some_and(|s| s.has_talked_to(key.second()))
    }

    fn ensure_active(&self, key: &PairKey) -> Result<(&AgentState, &AgentState), DomainError> {
        let a = self.state(key.first())?;
        let b = self.state(key.second())?;
        if a.current_partner() == Some(key.second()) && b.current_partner() == Some(key.first()) {
            Ok((a, b))
        } else {
            Err(DomainError::PairNotActive(key.to_string()))
        }
    }

    fn refresh_completion(&mut self) -> bool {
        if self.completed_conversations() >= self.total_possible {
            self.experiment_complete = true;
        }
        self.experiment_complete
    }

    fn start_pair(&mut self, key: &PairKey, already_exchanged: usize) {
        if let Some(state) = self.states.get_mut(key.first()) {
            state.start_conversation(key.second(), already_exchanged);
        }
        if let Some(state) = self.states.get_mut(key.second()) {
            state.start_conversation(key.first(), already_exchanged);
        }
    }

    /// Remove `key` from a queue-based policy, remembering its round.
    fn claim_from_queue(&mut self, key: &PairKey) {
        let Some(queue) = self.policy.queue_mut() else {
            return;
        };
        if let Some(pos) = queue.iter().position(|q| &q.key == key) {
            let queued = queue.remove(pos);
            self.rounds.insert(queued.key, queued.round);
        }
    }

    fn resume_from_hints(
        &mut self,
        hints: &BTreeMap<String, ResumeHint>,
        formed: &mut HashMap<PairKey, PairOrigin>,
    ) {
        for name in self.order.clone() {
            let Some(hint) = hints.get(&name) else {
                continue;
            };
            if !self.can_pair(&name, &hint.partner) {
                continue;
            }
            let Ok(key) = PairKey::new(&name, &hint.partner) else {
                continue;
            };

            let exchanged = match hints.get(&hint.partner) {
                Some(back) if back.partner == name => hint.exchanged.max(back.exchanged),
                _ => hint.exchanged,
            };

            self.start_pair(&key, exchanged);
            self.claim_from_queue(&key);
            formed.insert(key, PairOrigin::Resumed);
        }
    }

    /// Pair idle agents in registry order with the first eligible later agent.
    fn first_fit(&mut self, formed: &mut HashMap<PairKey, PairOrigin>) {
        let idle: Vec<String> = self.idle_agents().into_iter().map(str::to_string).collect();
        for (i, a) in idle.iter().enumerate() {
            if !self.is_idle(a) {
                continue;
            }
            let partner = idle[i + 1..].iter().find(|b| self.can_pair(a, b));
            if let Some(b) = partner
                && let Ok(key) = PairKey::new(a, b)
            {
                self.start_pair(&key, 0);
                formed.insert(key, PairOrigin::New);
            }
        }
    }

    /// Start every pending queued pair whose agents are both idle.
    ///
    /// Round-robin only considers the earliest unfinished round so rounds
    /// are played in order.
    fn take_from_queue(&mut self, formed: &mut HashMap<PairKey, PairOrigin>) {
        let mut queue = match self.policy.queue_mut() {
            Some(queue) => std::mem::take(queue),
            None => return,
        };
        queue.retain(|q| !self.pair_finished(&q.key));

        let restrict = self.policy.restricts_to_round();
        let current_round = queue.first().map(|q| q.round);
        let mut remaining = Vec::with_capacity(queue.len());

        for queued in queue {
            let in_round = !restrict || Some(queued.round) == current_round;
            if in_round && self.can_pair(queued.key.first(), queued.key.second()) {
                self.start_pair(&queued.key, 0);
                self.rounds.insert(queued.key.clone(), queued.round);
                formed.insert(queued.key, PairOrigin::New);
            } else {
                remaining.push(queued);
            }
        }

        if let Some(slot) = self.policy.queue_mut() {
            *slot = remaining;
        }
    }

    fn collect_active(&self, formed: &HashMap<PairKey, PairOrigin>) -> Vec<ActivePair> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut pairs = Vec::new();

        for name in &self.order {
            if seen.contains(name.as_str()) {
                continue;
            }
            let Some(partner) = self.states.get(name).and_then(AgentState::current_partner) else {
                continue;
            };
            seen.insert(name);
            seen.insert(partner);

            let Ok(key) = PairKey::new(name, partner) else {
                continue;
            };
            let origin = formed.get(&key).copied().unwrap_or(PairOrigin::CarriedOver);
            if let Ok(pair) = ActivePair::new(name.as_str(), partner, origin) {
                pairs.push(pair);
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::Agent;
    use crate::scheduling::state::AgentStatus;

    fn registry(names: &[&str]) -> AgentRegistry {
        AgentRegistry::new(
            names
                .iter()
                .map(|n| Agent::new(*n, format!("{n} likes trains")))
                .collect(),
        )
        .unwrap()
    }

    fn scheduler(names: &[&str], kind: PolicyKind, budget: ConversationBudget) -> PairingScheduler {
        let registry = registry(names);
        let policy = SchedulingPolicy::build(kind, &registry.names(), Some(11));
        PairingScheduler::new(&registry, policy, budget, 100)
    }

    /// Drive every pair in the plan through its step budget, concluding
    /// conversations whose budget runs out.
    fn drive(scheduler: &mut PairingScheduler, plan: &StepPlan) -> Vec<(PairKey, PairOutcome)> {
        let mut outcomes = Vec::new();
        for pair in &plan.pairs {
            let budget = scheduler.remaining_step_budget(&pair.key).unwrap();
            for _ in 0..budget {
                scheduler.record_message(&pair.key).unwrap();
            }
            let outcome = if scheduler.conversation_budget_exhausted(&pair.key).unwrap() {
                PairOutcome::EndedByBudget
            } else {
                PairOutcome::Suspended
            };
            outcomes.push((pair.key.clone(), outcome));
        }
        for (key, outcome) in &outcomes {
            if outcome.is_concluded() {
                scheduler.complete_conversation(key).unwrap();
            }
        }
        outcomes
    }

    fn assert_invariants(scheduler: &PairingScheduler) {
        for snapshot in scheduler.snapshots() {
            assert!(!snapshot.past_partners.contains(&snapshot.name));
            for partner in &snapshot.past_partners {
                let other = scheduler.state(partner).unwrap();
                assert!(other.has_talked_to(&snapshot.name), "past_partners not symmetric");
            }
            match snapshot.status {
                AgentStatus::Idle => {
                    assert_eq!(snapshot.current_partner, None);
                    let state = scheduler.state(&snapshot.name).unwrap();
                    assert_eq!(state.messages_in_current_conversation(), 0);
                }
                AgentStatus::Conversing => {
                    let partner = snapshot.current_partner.as_deref().unwrap();
                    let other = scheduler.state(partner).unwrap();
                    assert_eq!(other.current_partner(), Some(snapshot.name.as_str()));
                }
            }
        }
    }

    fn assert_disjoint(plan: &StepPlan) {
        let mut busy = HashSet::new();
        for pair in &plan.pairs {
            assert!(busy.insert(pair.key.first().to_string()));
            assert!(busy.insert(pair.key.second().to_string()));
        }
    }

    fn run_to_end(scheduler: &mut PairingScheduler) -> usize {
        let hints = BTreeMap::new();
        let mut steps = 0;
        while !scheduler.is_complete() && !scheduler.step_limit_reached() {
            let plan = scheduler.begin_step(&hints);
            assert!(!scheduler.is_deadlocked());
            assert_disjoint(&plan);
            drive(scheduler, &plan);
            assert_invariants(scheduler);
            steps += 1;
        }
        steps
    }

    #[test]
    fn test_conversation_spans_two_steps() {
        let mut s = scheduler(&["A", "B", "C", "D"], PolicyKind::TimeDependent, ConversationBudget::new(2, 4));
        let hints = BTreeMap::new();

        let plan = s.begin_step(&hints);
        let keys: Vec<String> = plan.pairs.iter().map(|p| p.key.to_string()).collect();
        assert_eq!(keys, vec!["A <-> B", "C <-> D"]);
        assert!(plan.pairs.iter().all(|p| p.origin == PairOrigin::New));

        let outcomes = drive(&mut s, &plan);
        assert!(outcomes.iter().all(|(_, o)| *o == PairOutcome::Suspended));
        for name in ["A", "B", "C", "D"] {
            let state = s.state(name).unwrap();
            assert_eq!(state.status(), AgentStatus::Conversing);
            assert_eq!(state.messages_in_current_conversation(), 2);
        }

        let plan = s.begin_step(&hints);
        assert_eq!(plan.len(), 2);
        assert!(plan.pairs.iter().all(|p| p.origin == PairOrigin::CarriedOver));
        assert_eq!(s.state("A").unwrap().messages_this_time_step(), 0);

        let outcomes = drive(&mut s, &plan);
        assert!(outcomes.iter().all(|(_, o)| *o == PairOutcome::EndedByBudget));
        assert_eq!(s.idle_agents(), vec!["A", "B", "C", "D"]);
        assert_eq!(s.completed_conversations(), 2);
        assert_invariants(&s);
    }

    #[test]
    fn test_time_dependent_runs_to_completion() {
        for n in 2..=7 {
            let names: Vec<String> = (0..n).map(|i| format!("agent{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut s = scheduler(&refs, PolicyKind::TimeDependent, ConversationBudget::new(2, 3));

            run_to_end(&mut s);

            assert!(s.is_complete(), "{n} agents did not finish");
            assert_eq!(s.completed_conversations(), n * (n - 1) / 2);
            for snapshot in s.snapshots() {
                assert_eq!(snapshot.past_partners.len(), n - 1);
                assert_eq!(snapshot.total_conversations, n - 1);
                assert_eq!(snapshot.available_partners, 0);
            }
        }
    }

    #[test]
    fn test_sentinel_conclusion_is_symmetric_and_final() {
        let mut s = scheduler(&["A", "B", "C"], PolicyKind::TimeDependent, ConversationBudget::new(2, 10));
        let hints = BTreeMap::new();
        let plan = s.begin_step(&hints);
        let key = plan.pairs[0].key.clone();

        s.record_message(&key).unwrap();
        s.complete_conversation(&key).unwrap();

        assert!(s.state("A").unwrap().has_talked_to("B"));
        assert!(s.state("B").unwrap().has_talked_to("A"));
        assert_eq!(s.state("A").unwrap().total_conversations(), 1);

        for _ in 0..20 {
            let plan = s.begin_step(&hints);
            assert!(plan.pairs.iter().all(|p| p.key != key));
            drive(&mut s, &plan);
            if s.is_complete() {
                break;
            }
        }
        assert!(s.is_complete());
    }

    #[test]
    fn test_resume_hint_takes_precedence() {
        let mut s = scheduler(&["A", "B", "C"], PolicyKind::TimeDependent, ConversationBudget::new(2, 10));
        let mut hints = BTreeMap::new();
        hints.insert("C".to_string(), ResumeHint::new("B", 3));

        let plan = s.begin_step(&hints);

        assert_eq!(plan.len(), 1);
        let pair = &plan.pairs[0];
        assert_eq!(pair.key, PairKey::new("B", "C").unwrap());
        assert_eq!(pair.origin, PairOrigin::Resumed);
        assert_eq!(pair.first_speaker, "B");
        assert_eq!(s.messages_exchanged(&pair.key).unwrap(), 3);
        assert_eq!(pair.turn(3), ("C", "B"));
        assert_eq!(s.state("A").unwrap().status(), AgentStatus::Idle);
    }

    #[test]
    fn test_resume_hint_to_past_partner_is_ignored() {
        let mut s = scheduler(&["A", "B"], PolicyKind::TimeDependent, ConversationBudget::new(10, 2));
        let plan = s.begin_step(&BTreeMap::new());
        drive(&mut s, &plan);
        assert!(s.is_complete());

        let mut hints = BTreeMap::new();
        hints.insert("A".to_string(), ResumeHint::new("B", 1));
        let plan = s.begin_step(&hints);
        assert!(plan.is_empty());
        assert!(!s.is_deadlocked());
    }

    #[test]
    fn test_resume_hint_for_unknown_partner_is_ignored() {
        let mut s = scheduler(&["A", "B"], PolicyKind::TimeDependent, ConversationBudget::default());
        let mut hints = BTreeMap::new();
        hints.insert("A".to_string(), ResumeHint::new("Zed", 4));
        let plan = s.begin_step(&hints);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.pairs[0].origin, PairOrigin::New);
        assert_eq!(s.messages_exchanged(&plan.pairs[0].key).unwrap(), 0);
    }

    #[test]
    fn test_round_robin_plays_one_round_per_step() {
        let mut s = scheduler(&["A", "B", "C", "D"], PolicyKind::RoundRobin, ConversationBudget::new(2, 4));
        let hints = BTreeMap::new();

        let plan = s.begin_step(&hints);
        assert_eq!(plan.len(), 2);
        let pair = &plan.pairs[0];
        let ctx = s.prompt_context(&pair.first_speaker, &pair.second_speaker).unwrap();
        assert_eq!(ctx.round, Some(RoundInfo { index: 1, total: 3 }));

        // conversations finish within their step regardless of the step budget
        assert_eq!(s.remaining_step_budget(&pair.key).unwrap(), 4);
        drive(&mut s, &plan);
        assert!(s.active_pairs().is_empty());

        let steps = 1 + run_to_end(&mut s);
        assert_eq!(steps, 3);
        assert!(s.is_complete());
    }

    #[test]
    fn test_round_robin_odd_agents() {
        let mut s = scheduler(&["A", "B", "C", "D", "E"], PolicyKind::RoundRobin, ConversationBudget::new(1, 2));
        let steps = run_to_end(&mut s);
        assert_eq!(steps, 5);
        assert_eq!(s.completed_conversations(), 10);
    }

    #[test]
    fn test_random_pairs_complete() {
        let mut s = scheduler(&["A", "B", "C", "D", "E", "F"], PolicyKind::RandomPairs, ConversationBudget::new(1, 2));
        run_to_end(&mut s);
        assert!(s.is_complete());
        assert_eq!(s.completed_conversations(), 15);
        assert!(s.current_step() <= 15);
    }

    #[test]
    fn test_single_agent_is_complete_immediately() {
        let mut s = scheduler(&["solo"], PolicyKind::TimeDependent, ConversationBudget::default());
        assert!(s.is_complete());
        let plan = s.begin_step(&BTreeMap::new());
        assert!(plan.is_empty());
        assert!(!s.is_deadlocked());
        assert_eq!(s.total_possible_conversations(), 0);
    }

    #[test]
    fn test_inactive_pair_is_rejected() {
        let mut s = scheduler(&["A", "B", "C"], PolicyKind::TimeDependent, ConversationBudget::default());
        s.begin_step(&BTreeMap::new());
        let key = PairKey::new("A", "C").unwrap();
        assert_eq!(
            s.record_message(&key).unwrap_err(),
            DomainError::PairNotActive("A <-> C".to_string())
        );
        assert!(s.complete_conversation(&key).is_err());
        assert!(s.prompt_context("A", "C").is_err());
    }

    #[test]
    fn test_step_budget_caps_messages() {
        let mut s = scheduler(&["A", "B"], PolicyKind::TimeDependent, ConversationBudget::new(3, 4));
        let plan = s.begin_step(&BTreeMap::new());
        let key = plan.pairs[0].key.clone();
        assert_eq!(s.remaining_step_budget(&key).unwrap(), 3);
        drive(&mut s, &plan);
        assert_eq!(s.messages_exchanged(&key).unwrap(), 3);

        s.begin_step(&BTreeMap::new());
        // only one message left in the conversation
        assert_eq!(s.remaining_step_budget(&key).unwrap(), 1);
    }

    #[test]
    fn test_prompt_context_reports_progress() {
        let mut s = scheduler(&["A", "B", "C"], PolicyKind::TimeDependent, ConversationBudget::new(2, 2));
        let plan = s.begin_step(&BTreeMap::new());
        drive(&mut s, &plan);

        let plan = s.begin_step(&BTreeMap::new());
        let pair = &plan.pairs[0];
        assert_eq!(pair.key, PairKey::new("A", "C").unwrap());
        let ctx = s.prompt_context("A", "C").unwrap();
        assert_eq!(ctx.time_step, 2);
        assert_eq!(ctx.max_time_steps, 100);
        assert_eq!(ctx.speaker_past_partners, vec!["B".to_string()]);
        assert!(ctx.listener_past_partners.is_empty());
        assert_eq!(ctx.speaker_available_partners, 1);
        assert_eq!(ctx.completed_conversations, 1);
        assert_eq!(ctx.total_possible_conversations, 3);
        assert_eq!(ctx.round, None);
        assert!(!ctx.experiment_complete);
    }
}
