//! Pairing scheduler domain.
//!
//! Decides which agents converse during each discrete time step and tracks
//! every agent through the `idle → conversing → idle` lifecycle.
//!
//! - [`pair::PairKey`]: canonical unordered pair of agent names
//! - [`state::AgentState`]: per-agent scheduling record
//! - [`policy::SchedulingPolicy`]: how new pairs are formed each step
//! - [`scheduler::PairingScheduler`]: the state machine driving a run

pub mod budget;
pub mod context;
pub mod pair;
pub mod policy;
pub mod round_robin;
pub mod scheduler;
pub mod state;
