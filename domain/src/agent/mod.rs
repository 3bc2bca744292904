//! Agent domain.
//!
//! - [`entities::Agent`]: a named persona taking part in the simulation
//! - [`registry::AgentRegistry`]: the immutable, ordered population of agents

pub mod entities;
pub mod registry;
