//! Redis-backed person cache.
//!
//! Entities live under `person:{id}` and the full list under `persons`,
//! both serialized as JSON and written with `SET ... EX` so every entry
//! carries the configured TTL.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::domain::foundation::PersonId;
use crate::domain::person::Person;
use crate::ports::{CacheError, CacheLookup, PersonCache};

/// Redis implementation of [`PersonCache`].
#[derive(Clone)]
pub struct RedisPersonCache {
    conn: MultiplexedConnection,
    ttl: Duration,
    key_prefix: String,
}

impl RedisPersonCache {
    pub fn new(conn: MultiplexedConnection, ttl: Duration) -> Self {
        Self {
            conn,
            ttl,
            key_prefix: String::new(),
        }
    }

    /// Namespace every key, e.g. to share one Redis between environments.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn list_key(&self) -> String {
        format!("{}persons", self.key_prefix)
    }

    fn person_key(&self, id: PersonId) -> String {
        format!("{}person:{}", self.key_prefix, id)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let mut conn = self.conn.clone();
        let raw = match conn.get::<_, Option<String>>(key).await {
            Ok(raw) => raw,
            Err(e) => return CacheLookup::Unavailable(CacheError::Unavailable(e.to_string())),
        };

        match raw {
            None => CacheLookup::Miss,
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => CacheLookup::Hit(value),
                Err(e) => CacheLookup::Unavailable(CacheError::Decode(e.to_string())),
            },
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value).map_err(|e| CacheError::Encode(e.to_string()))?;
        let mut conn = self.conn.clone();

        redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(self.ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl PersonCache for RedisPersonCache {
    async fn get_all(&self) -> CacheLookup<Vec<Person>> {
        self.read(&self.list_key()).await
    }

    async fn get_by_id(&self, id: PersonId) -> CacheLookup<Person> {
        self.read(&self.person_key(id)).await
    }

    async fn set_all(&self, persons: &[Person]) -> Result<(), CacheError> {
        self.write(&self.list_key(), persons).await
    }

    async fn set_one(&self, person: &Person) -> Result<(), CacheError> {
        self.write(&self.person_key(person.id), person).await
    }

    async fn delete(&self, id: PersonId) -> Result<(), CacheError> {
        self.remove(&self.person_key(id)).await
    }

    async fn delete_all(&self) -> Result<(), CacheError> {
        self.remove(&self.list_key()).await
    }
}

impl std::fmt::Debug for RedisPersonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPersonCache")
            .field("ttl", &self.ttl)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}
