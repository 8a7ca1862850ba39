//! JobLock port - cluster-wide advisory lock for scheduled jobs.
//!
//! A lease is exclusive and time-bounded. Holders extend it while they work
//! and release it explicitly when done; the TTL only lets the lock recover
//! from crashed holders.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// Errors raised by a lock backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LockError {
    #[error("Lock backend unavailable: {0}")]
    Unavailable(String),
}

/// Proof of holding the lock for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockLease {
    job: String,
    token: Uuid,
    ttl: Duration,
}

impl LockLease {
    /// Creates a lease with a fresh random token.
    pub fn new(job: impl Into<String>, ttl: Duration) -> Self {
        Self {
            job: job.into(),
            token: Uuid::new_v4(),
            ttl,
        }
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn token(&self) -> &Uuid {
        &self.token
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Exclusive, lease-based lock keyed by logical job name.
#[async_trait]
pub trait JobLock: Send + Sync {
    /// Tries to take the lock without waiting.
    ///
    /// Returns `None` when another holder has a live lease.
    async fn try_acquire(&self, job: &str, ttl: Duration) -> Result<Option<LockLease>, LockError>;

    /// Pushes the lease expiry to `lease.ttl()` from now.
    ///
    /// Returns `false` if the lease already expired or was taken over; the
    /// holder must then stop working under it.
    async fn extend(&self, lease: &LockLease) -> Result<bool, LockError>;

    /// Releases a lease. Returns `false` if it had already expired or
    /// been taken over, in which case nothing is removed.
    async fn release(&self, lease: &LockLease) -> Result<bool, LockError>;

    /// Drops the lease of exactly this job regardless of holder.
    ///
    /// Only for startup recovery after a crash. Returns the number of
    /// entries removed.
    async fn release_all(&self, job: &str) -> Result<u64, LockError>;
}
