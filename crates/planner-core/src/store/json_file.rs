//! JSON-file backed [`EventStore`].
//!
//! The whole collection is one pretty-printed JSON array with camelCase
//! property names. Each save writes its own sibling temp file and renames it
//! over the target, so readers never observe a half-written file.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use super::{EventStore, StoreError};
use crate::models::Event;

/// Stores events in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl EventStore for JsonFileStore {
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<Event>, StoreError> {
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            read = tokio::fs::read(&self.path) => read,
        };

        let bytes = match read {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no data file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        // A literal `null` payload is treated like an empty file.
        let events: Option<Vec<Event>> =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Deserialize {
                path: self.path.clone(),
                source,
            })?;

        Ok(events.unwrap_or_default())
    }

    async fn save(&self, events: &[Event], cancel: &CancellationToken) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let payload =
            serde_json::to_vec_pretty(events).map_err(|source| StoreError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        let bytes = payload.len();

        // The write is not raced against the token: once started it runs to
        // completion, and the token is checked again before the rename.
        let store = self.clone();
        let token = cancel.clone();
        tokio::task::spawn_blocking(move || store.write_atomically(&payload, &token))
            .await
            .map_err(|e| self.io_error(std::io::Error::other(e)))??;

        tracing::debug!(
            path = %self.path.display(),
            events = events.len(),
            bytes,
            "saved event data"
        );
        Ok(())
    }
}

impl JsonFileStore {
    /// Write `payload` to a fresh temp file beside the target, then rename it
    /// into place. The temp file is removed on every early return.
    fn write_atomically(&self, payload: &[u8], cancel: &CancellationToken) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(payload).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;

        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}
