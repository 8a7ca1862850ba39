//! File-based Snapshot Store Adapter
//!
//! Stores the rating snapshot as a single JSON document on disk. Writes go
//! to a sibling temporary file which is then renamed over the target, so a
//! reader never sees a half-written document.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::person::Snapshot;
use crate::ports::{SnapshotStore, SnapshotStoreError};

/// File-based storage for the rating snapshot
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store backed by the given file
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSnapshotStore::new("./data/ratings.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, SnapshotStoreError> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SnapshotStoreError::IoError(e.to_string())),
        };

        let snapshot = serde_json::from_str(&json)
            .map_err(|e| SnapshotStoreError::DeserializationFailed(e.to_string()))?;

        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotStoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;
        }

        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| SnapshotStoreError::SerializationFailed(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, json)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))?;

        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| SnapshotStoreError::IoError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{PersonId, Timestamp};
    use crate::domain::person::Rating;
    use tempfile::TempDir;

    fn test_snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                Rating::new(PersonId::new(1), 4.5),
                Rating::new(PersonId::new(2), 0.0),
            ],
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(temp_dir.path().join("ratings.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(temp_dir.path().join("ratings.json"));
        let snapshot = test_snapshot();

        store.save(&snapshot).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(temp_dir.path().join("ratings.json"));

        store.save(&test_snapshot()).await.unwrap();
        let replacement =
            Snapshot::new(vec![Rating::new(PersonId::new(3), 2.0)], Timestamp::now());
        store.save(&replacement).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(PersonId::new(3)), Some(2.0));
        assert_eq!(loaded.get(PersonId::new(1)), None);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(temp_dir.path().join("data/nested/ratings.json"));

        store.save(&test_snapshot()).await.unwrap();

        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_deserialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ratings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = FileSnapshotStore::new(&path);

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, SnapshotStoreError::DeserializationFailed(_)));
    }
}
