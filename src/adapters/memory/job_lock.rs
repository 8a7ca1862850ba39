//! In-memory job lock for testing and single-instance deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::ports::{JobLock, LockError, LockLease};

#[derive(Debug, Clone, Copy)]
struct Held {
    token: Uuid,
    expires_at: Instant,
}

/// In-memory implementation of [`JobLock`].
///
/// Clones share the same lock table, so two schedulers built from clones
/// of one instance contend like two processes sharing Redis.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobLock {
    held: Arc<Mutex<HashMap<String, Held>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryJobLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// True if a live lease exists for the job.
    pub async fn is_held(&self, job: &str) -> bool {
        self.held
            .lock()
            .await
            .get(job)
            .map(|h| Instant::now() < h.expires_at)
            .unwrap_or(false)
    }

    fn check(&self) -> Result<(), LockError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LockError::Unavailable("simulated lock outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobLock for InMemoryJobLock {
    async fn try_acquire(&self, job: &str, ttl: Duration) -> Result<Option<LockLease>, LockError> {
        self.check()?;
        let mut held = self.held.lock().await;
        let now = Instant::now();

        if held.get(job).map(|h| now < h.expires_at).unwrap_or(false) {
            return Ok(None);
        }

        let lease = LockLease::new(job, ttl);
        held.insert(
            job.to_string(),
            Held {
                token: *lease.token(),
                expires_at: now + ttl,
            },
        );
        Ok(Some(lease))
    }

    async fn extend(&self, lease: &LockLease) -> Result<bool, LockError> {
        self.check()?;
        let mut held = self.held.lock().await;
        let now = Instant::now();

        match held.get_mut(lease.job()) {
            Some(h) if h.token == *lease.token() && now < h.expires_at => {
                h.expires_at = now + lease.ttl();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, lease: &LockLease) -> Result<bool, LockError> {
        self.check()?;
        let mut held = self.held.lock().await;

        match held.get(lease.job()) {
            Some(h) if h.token == *lease.token() => {
                held.remove(lease.job());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_all(&self, job: &str) -> Result<u64, LockError> {
        self.check()?;
        Ok(self.held.lock().await.remove(job).map(|_| 1).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = "rating-refresh";
    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn second_acquire_is_contended() {
        let lock = InMemoryJobLock::new();

        let first = lock.try_acquire(JOB, TTL).await.unwrap();
        let second = lock.try_acquire(JOB, TTL).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn release_frees_the_lock() {
        let lock = InMemoryJobLock::new();
        let lease = lock.try_acquire(JOB, TTL).await.unwrap().unwrap();

        assert!(lock.release(&lease).await.unwrap());
        assert!(lock.try_acquire(JOB, TTL).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_lease_can_be_taken_over_and_old_holder_cannot_release_it() {
        let lock = InMemoryJobLock::new();
        let stale = lock.try_acquire(JOB, TTL).await.unwrap().unwrap();

        tokio::time::advance(TTL + Duration::from_millis(1)).await;
        let fresh = lock.try_acquire(JOB, TTL).await.unwrap().unwrap();

        assert!(!lock.release(&stale).await.unwrap());
        assert!(lock.is_held(JOB).await);
        assert!(lock.release(&fresh).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn extend_keeps_the_lease_alive_past_its_ttl() {
        let lock = InMemoryJobLock::new();
        let lease = lock.try_acquire(JOB, TTL).await.unwrap().unwrap();

        tokio::time::advance(TTL / 2).await;
        assert!(lock.extend(&lease).await.unwrap());
        tokio::time::advance(TTL / 2 + Duration::from_secs(1)).await;

        assert!(lock.is_held(JOB).await);
        assert!(lock.try_acquire(JOB, TTL).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_or_taken_over_lease_cannot_be_extended() {
        let lock = InMemoryJobLock::new();
        let stale = lock.try_acquire(JOB, TTL).await.unwrap().unwrap();

        tokio::time::advance(TTL + Duration::from_millis(1)).await;
        assert!(!lock.extend(&stale).await.unwrap());

        let fresh = lock.try_acquire(JOB, TTL).await.unwrap().unwrap();
        assert!(!lock.extend(&stale).await.unwrap());
        assert!(lock.extend(&fresh).await.unwrap());
    }

    #[tokio::test]
    async fn release_all_leaves_jobs_with_a_longer_name_alone() {
        let lock = InMemoryJobLock::new();
        lock.try_acquire(JOB, TTL).await.unwrap().unwrap();
        lock.try_acquire("rating-refresh-v2", TTL).await.unwrap().unwrap();

        assert_eq!(lock.release_all(JOB).await.unwrap(), 1);
        assert!(lock.is_held("rating-refresh-v2").await);
    }

    #[tokio::test]
    async fn release_all_clears_a_stale_lease() {
        let lock = InMemoryJobLock::new();
        lock.try_acquire(JOB, TTL).await.unwrap().unwrap();

        assert_eq!(lock.release_all(JOB).await.unwrap(), 1);
        assert_eq!(lock.release_all(JOB).await.unwrap(), 0);
        assert!(lock.try_acquire(JOB, TTL).await.unwrap().is_some());
    }
}
