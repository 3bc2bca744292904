//! Persona directory loader
//!
//! Each `<name>.txt` file in the agents directory defines one agent: the file
//! stem is the agent name and the trimmed contents are its personality.
//! Other files are ignored.

use crate::error::ConfigurationError;
use socialsim_domain::{Agent, AgentRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PersonaLoader {
    dir: PathBuf,
}

impl PersonaLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read every persona into a registry.
    ///
    /// Fails if the directory is missing, unreadable, or holds no personas.
    pub fn load(&self) -> Result<AgentRegistry, ConfigurationError> {
        if !self.dir.is_dir() {
            return Err(ConfigurationError::AgentsDirMissing(self.dir.clone()));
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| ConfigurationError::Unreadable {
            path: self.dir.clone(),
            source,
        })?;

        let mut agents = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigurationError::Unreadable {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if let Some(agent) = Self::load_persona(&path)? {
                agents.push(agent);
            }
        }

        if agents.is_empty() {
            return Err(ConfigurationError::NoPersonas(self.dir.clone()));
        }

        let registry = AgentRegistry::new(agents)?;
        debug!(
            count = registry.len(),
            dir = %self.dir.display(),
            "Loaded agent personas"
        );
        Ok(registry)
    }

    fn load_persona(path: &Path) -> Result<Option<Agent>, ConfigurationError> {
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("txt") {
            return Ok(None);
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!(path = %path.display(), "Skipping persona with non UTF-8 file name");
            return Ok(None);
        };

        let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let personality = content.trim();
        if personality.is_empty() {
            warn!(agent = name, "Persona file is empty");
        }

        Ok(Some(Agent::new(name, personality)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_txt_personas() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bob.txt"), "  A retired sailor.\n").unwrap();
        fs::write(dir.path().join("alice.txt"), "A chemist who loves puzzles.").unwrap();
        fs::write(dir.path().join("notes.md"), "not a persona").unwrap();
        fs::create_dir(dir.path().join("drafts.txt")).unwrap();

        let registry = PersonaLoader::new(dir.path()).load().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("bob").unwrap().personality(),
            "A retired sailor."
        );
        assert!(registry.contains("alice"));
        assert!(!registry.contains("notes"));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PersonaLoader::new(dir.path().join("nope")).load().unwrap_err();
        assert!(matches!(err, ConfigurationError::AgentsDirMissing(_)));
    }

    #[test]
    fn test_empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), "hi").unwrap();
        let err = PersonaLoader::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ConfigurationError::NoPersonas(_)));
    }
}
