//! Prompt domain
//!
//! Templates for the per-turn conversation prompt and the digestion prompt.

mod template;

pub use template::{
    DEGRADED_PLACEHOLDER, DIGEST_PREAMBLE, NO_CONVERSATION_YET, NO_PREVIOUS_MEMORY, PromptTemplate,
    TurnPrompt,
};
