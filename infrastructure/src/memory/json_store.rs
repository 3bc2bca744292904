//! File-backed agent memory.
//!
//! Layout under the memory root:
//!
//! ```text
//! short_term/<agent>.json   {"current_conversation": {"partner": ..., "exchanges": [...]}}
//! long_term/<agent>.json    {"agent_insights": {"<partner>": "<summary>"}}
//! archive/<agent>_<timestamp>.json
//! ```

use crate::storage::{JsonFileError, read_json_or_default, write_json_atomic};
use socialsim_domain::{
    ArchivedConversation, Exchange, LongTermMemory, MemoryError, MemoryRepository,
    ShortTermMemory,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// JSON-file implementation of [`MemoryRepository`].
///
/// Corrupt documents are logged and read as empty. Read-modify-write cycles
/// are serialized through an internal lock.
pub struct JsonMemoryStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonMemoryStore {
    /// Open a store rooted at `root`, creating its subdirectories.
    pub fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        for dir in ["short_term", "long_term", "archive"] {
            std::fs::create_dir_all(root.join(dir))?;
        }
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn short_term_path(&self, agent: &str) -> PathBuf {
        self.root.join("short_term").join(format!("{}.json", agent))
    }

    fn long_term_path(&self, agent: &str) -> PathBuf {
        self.root.join("long_term").join(format!("{}.json", agent))
    }

    fn archive_path(&self, archived: &ArchivedConversation) -> PathBuf {
        let stamp = archived.archived_at.format("%Y%m%d_%H%M%S_%6f");
        self.root
            .join("archive")
            .join(format!("{}_{}.json", archived.agent, stamp))
    }

    fn write<T: serde::Serialize>(
        &self,
        agent: &str,
        path: &Path,
        value: &T,
    ) -> Result<(), MemoryError> {
        write_json_atomic(path, value).map_err(|e| memory_error(agent, e))
    }

    fn archive(&self, archived: &ArchivedConversation) -> Result<(), MemoryError> {
        let path = self.archive_path(archived);
        self.write(&archived.agent, &path, archived)?;
        debug!(
            agent = %archived.agent,
            exchanges = archived.exchanges().len(),
            path = %path.display(),
            "Archived short-term memory"
        );
        Ok(())
    }
}

fn memory_error(agent: &str, error: JsonFileError) -> MemoryError {
    match error {
        JsonFileError::Io(source) => MemoryError::Io {
            agent: agent.to_string(),
            source,
        },
        JsonFileError::Json(source) => MemoryError::Serialization {
            agent: agent.to_string(),
            source,
        },
    }
}

impl MemoryRepository for JsonMemoryStore {
    fn get_short_term(&self, agent: &str) -> ShortTermMemory {
        read_json_or_default(&self.short_term_path(agent))
    }

    fn update_short_term(
        &self,
        agent: &str,
        partner: &str,
        exchange: Exchange,
    ) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let path = self.short_term_path(agent);
        let mut record: ShortTermMemory = read_json_or_default(&path);
        if let Some(displaced) = record.record(partner, exchange) {
            warn!(
                agent,
                previous = displaced.partner().unwrap_or("<none>"),
                partner,
                "Short-term memory belonged to another conversation; archiving it"
            );
            self.archive(&ArchivedConversation::new(agent, displaced))?;
        }
        self.write(agent, &path, &record)
    }

    fn clear_short_term(&self, agent: &str) -> Result<Option<ArchivedConversation>, MemoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let path = self.short_term_path(agent);
        let record: ShortTermMemory = read_json_or_default(&path);

        let archived = if record.is_empty() {
            None
        } else {
            let archived = ArchivedConversation::new(agent, record);
            self.archive(&archived)?;
            Some(archived)
        };

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(MemoryError::Io {
                    agent: agent.to_string(),
                    source,
                });
            }
        }

        Ok(archived)
    }

    fn get_long_term(&self, agent: &str) -> LongTermMemory {
        read_json_or_default(&self.long_term_path(agent))
    }

    fn update_long_term(&self, agent: &str, partner: &str, summary: &str) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let path = self.long_term_path(agent);
        let mut record: LongTermMemory = read_json_or_default(&path);
        record.upsert(partner, summary);
        self.write(agent, &path, &record)
    }
}
