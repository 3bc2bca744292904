//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`END_OF_CONVERSATION`]: the sentinel an agent emits to close a conversation

pub mod error;

/// Marker substring that ends a conversation as soon as any utterance contains it.
pub const END_OF_CONVERSATION: &str = "<END OF CONVERSATION>";

/// Returns `true` if `utterance` carries the end-of-conversation sentinel.
pub fn contains_sentinel(utterance: &str) -> bool {
    utterance.contains(END_OF_CONVERSATION)
}
