//! Redis-backed snapshot store.
//!
//! The snapshot lives under one `ratings:snapshot` key as a JSON document
//! with no expiry. `SET` replaces the value atomically, so every instance
//! reading the key sees a complete snapshot.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::person::Snapshot;
use crate::ports::{SnapshotStore, SnapshotStoreError};

/// Redis implementation of [`SnapshotStore`], shared by all instances.
#[derive(Clone)]
pub struct RedisSnapshotStore {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisSnapshotStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: String::new(),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn key(&self) -> String {
        format!("{}ratings:snapshot", self.key_prefix)
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, SnapshotStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(self.key())
            .await
            .map_err(|e: redis::RedisError| SnapshotStoreError::Unavailable(e.to_string()))?;

        raw.map(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| SnapshotStoreError::DeserializationFailed(e.to_string()))
        })
        .transpose()
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotStoreError> {
        let payload = serde_json::to_string(snapshot)
            .map_err(|e| SnapshotStoreError::SerializationFailed(e.to_string()))?;
        let mut conn = self.conn.clone();

        redis::cmd("SET")
            .arg(self.key())
            .arg(payload)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| SnapshotStoreError::Unavailable(e.to_string()))
    }
}

impl std::fmt::Debug for RedisSnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSnapshotStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}
