//! JSON transcript files.
//!
//! - `conversation_<A>_<B>_<id8>.json` per completed pair: `{"<A>_<B>_<id8>": [exchanges]}`
//! - `conversation_<experiment_id>.json` per run: `{"<experiment_id>": [{pair, dialogue, ...}]}`
//!
//! Writes merge into an existing document; keys already present are left untouched.

use crate::storage::{read_json, write_json_atomic};
use serde_json::{Map, Value, json};
use socialsim_application::{CompletedConversation, TranscriptError, TranscriptStore};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub struct JsonTranscriptStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonTranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn conversation_path(&self, conversation: &CompletedConversation) -> PathBuf {
        self.dir
            .join(format!("conversation_{}.json", conversation.log_key()))
    }

    pub fn run_path(&self, experiment_id: &str) -> PathBuf {
        self.dir.join(format!("conversation_{}.json", experiment_id))
    }

    /// Insert `key → value` into the JSON object at `path` unless the key exists.
    fn merge_entry(&self, path: &Path, key: &str, value: Value) -> Result<(), TranscriptError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let fail = |message: String| TranscriptError {
            target: path.display().to_string(),
            message,
        };

        let mut document: Map<String, Value> = match read_json(path) {
            Ok(Some(document)) => document,
            Ok(None) => Map::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Replacing unreadable transcript file");
                Map::new()
            }
        };

        if document.contains_key(key) {
            debug!(key, "Transcript entry already present; leaving it untouched");
            return Ok(());
        }
        document.insert(key.to_string(), value);

        write_json_atomic(path, &document).map_err(|e| fail(e.to_string()))
    }
}

fn run_entry(conversation: &CompletedConversation) -> Value {
    json!({
        "id": conversation.id,
        "pair": [conversation.pair.first(), conversation.pair.second()],
        "dialogue": conversation.dialogue,
        "outcome": conversation.outcome,
        "step": conversation.step,
    })
}

impl TranscriptStore for JsonTranscriptStore {
    fn record_conversation(
        &self,
        conversation: &CompletedConversation,
    ) -> Result<(), TranscriptError> {
        let path = self.conversation_path(conversation);
        let dialogue = serde_json::to_value(&conversation.dialogue).map_err(|e| TranscriptError {
            target: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.merge_entry(&path, &conversation.log_key(), dialogue)?;
        debug!(pair = %conversation.pair, path = %path.display(), "Conversation transcript saved");
        Ok(())
    }

    fn record_run(
        &self,
        experiment_id: &str,
        conversations: &[CompletedConversation],
    ) -> Result<(), TranscriptError> {
        let path = self.run_path(experiment_id);
        let entries: Vec<Value> = conversations.iter().map(run_entry).collect();
        self.merge_entry(&path, experiment_id, Value::Array(entries))
    }
}
