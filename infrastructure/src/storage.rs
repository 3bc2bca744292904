//! JSON document helpers shared by the file-backed stores.
//!
//! Writes go to a temporary file in the target directory and are renamed
//! over the destination, so readers never see a half-written document.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum JsonFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read and parse `path`. A missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, JsonFileError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Like [`read_json`], but unreadable or unparsable documents are logged and
/// treated as absent.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt JSON document");
            T::default()
        }
    }
}

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), JsonFileError> {
    let contents = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &contents)?;
    Ok(())
}

/// Atomically replace `path` with `contents`, creating parent directories.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::Builder::new()
        .prefix(".socialsim")
        .tempfile_in(parent)?;
    temp_file.write_all(contents)?;
    temp_file.as_file_mut().sync_all()?;
    temp_file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
