//! SnapshotStore port - durable tier behind the snapshot cache.

use async_trait::async_trait;

use crate::domain::person::Snapshot;

/// Errors that can occur while loading or saving a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotStoreError {
    #[error("Failed to serialize snapshot: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize snapshot: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Snapshot backend unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for the latest complete snapshot.
///
/// `save` must replace the stored document atomically: a concurrent or
/// subsequent `load` sees either the previous document or the new one.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Loads the stored snapshot, `None` if nothing was ever saved.
    async fn load(&self) -> Result<Option<Snapshot>, SnapshotStoreError>;

    /// Replaces the stored snapshot.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotStoreError>;
}
