//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`SimulationParams`]: run loop control (budgets, step limit, conversation cap)
//! - [`RetryPolicy`]: attempt ceiling and backoff for model calls

pub mod retry_policy;
pub mod simulation_params;

pub use retry_policy::RetryPolicy;
pub use simulation_params::SimulationParams;
