//! Agent registry: the fixed population for one run.

use super::entities::Agent;
use crate::core::error::DomainError;
use std::collections::HashMap;

/// Holds every agent loaded at startup.
///
/// Agents are kept sorted by name so that [`names`](Self::names) is stable
/// for the whole run (and across runs over the same persona directory).
/// The pairing scheduler iterates candidates in this order.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    /// Build a registry, rejecting an empty population and duplicate names.
    pub fn new(mut agents: Vec<Agent>) -> Result<Self, DomainError> {
        if agents.is_empty() {
            return Err(DomainError::NoAgents);
        }

        agents.sort_by(|a, b| a.name().cmp(b.name()));

        let mut index = HashMap::with_capacity(agents.len());
        for (i, agent) in agents.iter().enumerate() {
            if index.insert(agent.name().to_string(), i).is_some() {
                return Err(DomainError::DuplicateAgent(agent.name().to_string()));
            }
        }

        Ok(Self { agents, index })
    }

    /// Agent names in registry order.
    pub fn names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn get(&self, name: &str) -> Result<&Agent, DomainError> {
        self.index
            .get(name)
            .map(|&i| &self.agents[i])
            .ok_or_else(|| DomainError::UnknownAgent(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of `name` in registry order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// `n·(n−1)/2`: the number of unique unordered pairs.
    pub fn total_possible_pairs(&self) -> usize {
        let n = self.agents.len();
        n * n.saturating_sub(1) / 2
    }
}
