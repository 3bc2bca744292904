//! Scheduling policies
//!
//! A policy only decides which *new* pairs to form from idle agents. Budget
//! accounting, resume preference and completion are handled uniformly by the
//! [`PairingScheduler`](super::scheduler::PairingScheduler).

use super::pair::PairKey;
use super::round_robin::build_schedule;
use crate::core::error::DomainError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Selectable scheduling environments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// First-fit pairing of idle agents; conversations may span several steps.
    #[default]
    TimeDependent,
    /// Circle-method rounds; each step runs one round to completion.
    RoundRobin,
    /// Shuffled list of all pairs; each step runs a disjoint batch to completion.
    RandomPairs,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [
        PolicyKind::TimeDependent,
        PolicyKind::RoundRobin,
        PolicyKind::RandomPairs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::TimeDependent => "time_dependent",
            PolicyKind::RoundRobin => "round_robin",
            PolicyKind::RandomPairs => "random_pairs",
        }
    }

    /// Whether a conversation may be interrupted by the per-step budget and
    /// carried into the next step.
    pub fn spans_steps(&self) -> bool {
        matches!(self, PolicyKind::TimeDependent)
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "time_dependent" | "timedependent" => Ok(PolicyKind::TimeDependent),
            "round_robin" | "roundrobin" | "time_independent" => Ok(PolicyKind::RoundRobin),
            "random_pairs" | "randompairs" | "random" => Ok(PolicyKind::RandomPairs),
            _ => Err(DomainError::UnknownPolicy(s.to_string())),
        }
    }
}

/// A pair waiting in a queue-based policy, tagged with the round it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedPair {
    pub key: PairKey,
    /// 0-based round index; random batches all share round 0.
    pub round: usize,
}

/// Policy state for a run.
#[derive(Debug, Clone)]
pub enum SchedulingPolicy {
    TimeDependent,
    RoundRobin {
        queue: Vec<QueuedPair>,
        total_rounds: usize,
    },
    RandomPairs {
        queue: Vec<QueuedPair>,
    },
}

impl SchedulingPolicy {
    /// Build the policy for `kind` over the agents in registry order.
    pub fn build(kind: PolicyKind, names: &[String], seed: Option<u64>) -> Self {
        match kind {
            PolicyKind::TimeDependent => SchedulingPolicy::TimeDependent,
            PolicyKind::RoundRobin => Self::round_robin(names),
            PolicyKind::RandomPairs => Self::random_pairs(names, seed),
        }
    }

    pub fn round_robin(names: &[String]) -> Self {
        let rounds = build_schedule(names);
        let total_rounds = rounds.len();
        let queue = rounds
            .into_iter()
            .enumerate()
            .flat_map(|(round, keys)| keys.into_iter().map(move |key| QueuedPair { key, round }))
            .collect();
        SchedulingPolicy::RoundRobin {
            queue,
            total_rounds,
        }
    }

    pub fn random_pairs(names: &[String], seed: Option<u64>) -> Self {
        let mut keys: Vec<PairKey> = Vec::new();
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                if let Ok(key) = PairKey::new(a, b) {
                    keys.push(key);
                }
            }
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        keys.shuffle(&mut rng);

        SchedulingPolicy::RandomPairs {
            queue: keys
                .into_iter()
                .map(|key| QueuedPair { key, round: 0 })
                .collect(),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            SchedulingPolicy::TimeDependent => PolicyKind::TimeDependent,
            SchedulingPolicy::RoundRobin { .. } => PolicyKind::RoundRobin,
            SchedulingPolicy::RandomPairs { .. } => PolicyKind::RandomPairs,
        }
    }

    /// Pairs not yet started, in the order the policy will try them.
    pub fn pending(&self) -> &[QueuedPair] {
        match self {
            SchedulingPolicy::TimeDependent => &[],
            SchedulingPolicy::RoundRobin { queue, .. } | SchedulingPolicy::RandomPairs { queue } => {
                queue
            }
        }
    }

    /// Number of rounds in a round-robin schedule.
    pub fn total_rounds(&self) -> Option<usize> {
        match self {
            SchedulingPolicy::RoundRobin { total_rounds, .. } => Some(*total_rounds),
            _ => None,
        }
    }

    pub(crate) fn queue_mut(&mut self) -> Option<&mut Vec<QueuedPair>> {
        match self {
            SchedulingPolicy::TimeDependent => None,
            SchedulingPolicy::RoundRobin { queue, .. } | SchedulingPolicy::RandomPairs { queue } => {
                Some(queue)
            }
        }
    }

    /// Whether only the earliest pending round may start this step.
    pub(crate) fn restricts_to_round(&self) -> bool {
        matches!(self, SchedulingPolicy::RoundRobin { .. })
    }
}
