//! Redis-backed job lock.
//!
//! Acquire is `SET lock:{job} {token} NX PX {ttl}`. Extend and release touch
//! the key only while it still holds our token, so an expired lease taken
//! over by another instance is never renewed or removed by the previous
//! holder.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::ports::{JobLock, LockError, LockLease};

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

const EXTEND_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("PEXPIRE", KEYS[1], ARGV[2])
else
    return 0
end
"#;

/// Redis implementation of [`JobLock`].
#[derive(Clone)]
pub struct RedisJobLock {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisJobLock {
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

    fn lock_key(&self, job: &str) -> String {
        format!("{}lock:{}", self.key_prefix, job)
    }
}

#[async_trait]
impl JobLock for RedisJobLock {
    async fn try_acquire(&self, job: &str, ttl: Duration) -> Result<Option<LockLease>, LockError> {
        let lease = LockLease::new(job, ttl);
        let mut conn = self.conn.clone();

        let reply: Option<String> = redis::cmd("SET")
            .arg(self.lock_key(job))
            .arg(lease.token().to_string())
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis().max(1) as u64)
            .query_async(&mut conn)
            .await
            .map_err(|e| LockError::Unavailable(e.to_string()))?;

        Ok(reply.map(|_| lease))
    }

    async fn extend(&self, lease: &LockLease) -> Result<bool, LockError> {
        let mut conn = self.conn.clone();

        let extended: i64 = redis::Script::new(EXTEND_SCRIPT)
            .key(self.lock_key(lease.job()))
            .arg(lease.token().to_string())
            .arg(lease.ttl().as_millis().max(1) as u64)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| LockError::Unavailable(e.to_string()))?;

        Ok(extended > 0)
    }

    async fn release(&self, lease: &LockLease) -> Result<bool, LockError> {
        let mut conn = self.conn.clone();

        let removed: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(self.lock_key(lease.job()))
            .arg(lease.token().to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| LockError::Unavailable(e.to_string()))?;

        Ok(removed > 0)
    }

    async fn release_all(&self, job: &str) -> Result<u64, LockError> {
        let mut conn = self.conn.clone();

        conn.del::<_, u64>(self.lock_key(job))
            .await
            .map_err(|e: redis::RedisError| LockError::Unavailable(e.to_string()))
    }
}

impl std::fmt::Debug for RedisJobLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisJobLock")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}
