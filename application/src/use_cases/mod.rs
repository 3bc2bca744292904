//! Use cases (application services)
//!
//! Use cases orchestrate domain logic and coordinate with external systems
//! through ports.

pub mod run_conversation;
pub mod run_simulation;
pub mod shared;
