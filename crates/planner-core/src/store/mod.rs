//! Persistent storage for the full event collection.
//!
//! A store holds every [`Event`] as one blob: there is no partial update API.
//! The planning service loads it once and rewrites it after each mutation.

pub mod json_file;
pub mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::models::Event;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors raised by an [`EventStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming the backing file failed.
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a valid event array.
    #[error("failed to parse event data in {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize event data for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The store is not reachable (used by non-file implementations).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The caller's cancellation token fired while waiting on I/O.
    #[error("store operation cancelled")]
    Cancelled,
}

/// Load-all / save-all persistence contract.
///
/// Implementations must be total: a store that has never been written to
/// loads as an empty collection, never as an error.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Load every stored event, in stored order.
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<Event>, StoreError>;

    /// Replace the stored collection with `events`.
    async fn save(&self, events: &[Event], cancel: &CancellationToken) -> Result<(), StoreError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn EventStore) {}
};
