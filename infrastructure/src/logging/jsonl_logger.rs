//! Per-run JSONL event log.
//!
//! One file per experiment, `events_<experiment_id>.jsonl`. Every line is a
//! flat JSON object: the event payload plus `seq`, `experiment_id`, `type`,
//! `timestamp` and, once the first step has started, `step`.

use serde_json::{Map, Value};
use socialsim_application::{ConversationEvent, ConversationLogger, events};
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

struct EventSink {
    writer: LineWriter<File>,
    seq: u64,
    /// Step of the most recent `step_started`, stamped onto later events.
    step: Option<u64>,
}

/// Append-only event log for one simulation run.
pub struct JsonlConversationLogger {
    sink: Mutex<EventSink>,
    experiment_id: String,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or append to) `path`, creating parent directories.
    pub fn create(
        path: impl Into<PathBuf>,
        experiment_id: impl Into<String>,
    ) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            sink: Mutex::new(EventSink {
                writer: LineWriter::new(file),
                seq: 0,
                step: None,
            }),
            experiment_id: experiment_id.into(),
            path,
        })
    }

    /// `<outputs_dir>/events_<experiment_id>.jsonl`
    pub fn for_run(outputs_dir: impl AsRef<Path>, experiment_id: &str) -> std::io::Result<Self> {
        let path = outputs_dir
            .as_ref()
            .join(format!("events_{}.jsonl", experiment_id));
        Self::create(path, experiment_id)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Lines written so far.
    pub fn events_written(&self) -> u64 {
        self.sink.lock().map(|sink| sink.seq).unwrap_or(0)
    }
}

/// Flatten `event` into one log record.
///
/// Object payloads are merged at the top level; anything else lands under
/// `data`. The bookkeeping fields always win over payload keys.
fn stamp(
    event: ConversationEvent,
    experiment_id: &str,
    seq: u64,
    step: Option<u64>,
    timestamp: String,
) -> Value {
    let mut record = match event.payload {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => Map::from_iter([("data".to_string(), other)]),
    };

    if let Some(step) = step {
        record.entry("step").or_insert(Value::from(step));
    }
    record.insert("seq".to_string(), Value::from(seq));
    record.insert("experiment_id".to_string(), Value::from(experiment_id));
    record.insert("type".to_string(), Value::from(event.event_type));
    record.insert("timestamp".to_string(), Value::from(timestamp));
    Value::Object(record)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };

        if event.event_type == events::STEP_STARTED {
            sink.step = event.payload.get("step").and_then(Value::as_u64);
        }

        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let seq = sink.seq + 1;
        let record = stamp(event, &self.experiment_id, seq, sink.step, timestamp);

        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Dropping unserializable event");
                return;
            }
        };
        match writeln!(sink.writer, "{}", line) {
            Ok(()) => sink.seq = seq,
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to write event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_records_are_sequenced_and_tagged_with_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let logger = JsonlConversationLogger::for_run(dir.path(), "exp1").unwrap();
        assert!(logger.path().ends_with("events_exp1.jsonl"));

        logger.log(ConversationEvent::new(
            events::SIMULATION_STARTED,
            json!({"agents": ["alice", "bob"]}),
        ));
        logger.log(ConversationEvent::new(
            events::UTTERANCE,
            json!({"speaker": "alice", "text": "Hello Bob"}),
        ));
        assert_eq!(logger.events_written(), 2);

        let records = read_lines(logger.path());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["seq"], 1);
        assert_eq!(records[1]["seq"], 2);
        for record in &records {
            assert_eq!(record["experiment_id"], "exp1");
            assert!(record["timestamp"].is_string());
        }
        assert_eq!(records[0]["type"], "simulation_started");
        assert!(records[0].get("step").is_none());
        assert_eq!(records[1]["text"], "Hello Bob");
    }

    #[test]
    fn test_step_started_stamps_following_events() {
        let dir = tempfile::tempdir().unwrap();
        let logger = JsonlConversationLogger::for_run(dir.path(), "exp2").unwrap();

        logger.log(ConversationEvent::new(
            events::STEP_STARTED,
            json!({"step": 3, "pairs": ["alice <-> bob"]}),
        ));
        logger.log(ConversationEvent::new(
            events::UTTERANCE,
            json!({"speaker": "bob", "text": "Hi"}),
        ));
        logger.log(ConversationEvent::new(
            events::PAIR_COMPLETED,
            json!({"step": 4, "pair": ["alice", "bob"]}),
        ));

        let records = read_lines(logger.path());
        assert_eq!(records[0]["step"], 3);
        assert_eq!(records[1]["step"], 3);
        // an explicit payload step is kept
        assert_eq!(records[2]["step"], 4);
    }

    #[test]
    fn test_payload_cannot_override_bookkeeping() {
        let record = stamp(
            ConversationEvent::new(events::UTTERANCE, json!({"type": "forged", "seq": 99})),
            "exp",
            7,
            None,
            "2026-01-01T00:00:00.000Z".to_string(),
        );
        assert_eq!(record["type"], "utterance");
        assert_eq!(record["seq"], 7);

        let wrapped = stamp(
            ConversationEvent::new(events::SIMULATION_FINISHED, json!("done")),
            "exp",
            1,
            Some(2),
            "2026-01-01T00:00:00.000Z".to_string(),
        );
        assert_eq!(wrapped["data"], "done");
        assert_eq!(wrapped["step"], 2);
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        for _ in 0..2 {
            let logger = JsonlConversationLogger::for_run(dir.path(), "exp3").unwrap();
            logger.log(ConversationEvent::new(events::STEP_COMPLETED, json!({})));
        }
        let records = read_lines(&dir.path().join("events_exp3.jsonl"));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        assert!(JsonlConversationLogger::create(blocker.join("events.jsonl"), "exp").is_err());
    }
}
