//! In-Memory Snapshot Store Adapter
//!
//! Keeps the snapshot in memory. Useful for testing and development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::person::Snapshot;
use crate::ports::{SnapshotStore, SnapshotStoreError};

/// In-memory storage for the rating snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    snapshot: Arc<RwLock<Option<Snapshot>>>,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
    fail_loads: Arc<AtomicBool>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(snapshot))),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail (useful for tests)
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent load fail
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> Option<Snapshot> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, SnapshotStoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(SnapshotStoreError::IoError("simulated read failure".to_string()));
        }
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotStoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SnapshotStoreError::IoError("simulated write failure".to_string()));
        }
        *self.snapshot.write().await = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
