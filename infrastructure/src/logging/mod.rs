//! Logging infrastructure: run artifacts written next to the simulation.
//!
//! - [`JsonlConversationLogger`]: JSONL event log implementing the
//!   [`ConversationLogger`](socialsim_application::ConversationLogger) port
//! - [`JsonTranscriptStore`]: per-pair and per-run conversation transcripts
//! - usage summaries written at the end of a run

mod jsonl_logger;
mod transcripts;
mod usage_report;

pub use jsonl_logger::JsonlConversationLogger;
pub use transcripts::JsonTranscriptStore;
pub use usage_report::{try_write_usage_report, usage_report_path, write_usage_report};
