//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! The memory repository port lives in the domain crate next to the records
//! it stores.

pub mod bingo_evaluator;
pub mod conversation_logger;
pub mod llm_gateway;
pub mod progress;
pub mod transcript_store;
