//! Two-tier agent memory.
//!
//! - [`entities::ShortTermMemory`]: the transcript of the conversation in progress
//! - [`entities::LongTermMemory`]: one relationship summary per past partner
//! - [`repository::MemoryRepository`]: trait for memory persistence

pub mod entities;
pub mod repository;
