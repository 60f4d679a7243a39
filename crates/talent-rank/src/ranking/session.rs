use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::domain::RankingResult;

/// Fixed key naming the single persisted session slot.
pub const SESSION_KEY: &str = "rankingResult";

/// Storage abstraction for the most recent ranking result.
///
/// `load` must treat malformed content as an absent session and erase it.
pub trait SessionStore: Send + Sync {
    fn save(&self, result: &RankingResult) -> Result<(), SessionError>;
    fn load(&self) -> Result<Option<RankingResult>, SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Error enumeration for session persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("session storage unavailable: {0}")]
    Io(#[from] io::Error),
    #[error("session storage lock poisoned")]
    Poisoned,
}

fn encode(result: &RankingResult) -> Result<String, SessionError> {
    Ok(serde_json::to_string(result)?)
}

fn decode(raw: &str) -> Option<RankingResult> {
    match serde_json::from_str(raw) {
        Ok(result) => Some(result),
        Err(err) => {
            warn!(error = %err, key = SESSION_KEY, "discarding corrupt saved session");
            None
        }
    }
}

/// In-process slot holding the serialized session.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySessionStore {
    /// Seed the slot with raw stored text, bypassing serialization.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Result<Option<String>, SessionError> {
        let guard = self.slot.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(guard.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, result: &RankingResult) -> Result<(), SessionError> {
        let encoded = encode(result)?;
        let mut guard = self.slot.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = Some(encoded);
        Ok(())
    }

    fn load(&self) -> Result<Option<RankingResult>, SessionError> {
        let mut guard = self.slot.lock().map_err(|_| SessionError::Poisoned)?;
        let Some(raw) = guard.as_deref() else {
            return Ok(None);
        };

        let decoded = decode(raw);
        if decoded.is_none() {
            *guard = None;
        }
        Ok(decoded)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.slot.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Durable slot backed by one JSON file inside a profile directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SESSION_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, result: &RankingResult) -> Result<(), SessionError> {
        let encoded = encode(result)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, encoded)?;
        debug!(path = %self.path.display(), "session written");
        Ok(())
    }

    fn load(&self) -> Result<Option<RankingResult>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                warn!(path = %self.path.display(), "saved session is not valid UTF-8");
                self.remove()?;
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let decoded = decode(&raw);
        if decoded.is_none() {
            self.remove()?;
        }
        Ok(decoded)
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.remove()
    }
}
