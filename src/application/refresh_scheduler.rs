//! RefreshScheduler - periodic, cluster-wide exclusive snapshot refresh.
//!
//! Every tick tries to take the job lock without waiting. The instance that
//! gets it runs the refresh and releases the lock; every other instance
//! skips the tick. While the refresh runs the lease is extended every third
//! of its TTL. If the lease cannot be confirmed before it would lapse, the
//! refresh is cancelled and never installs its result. The TTL on its own
//! only matters when a holder dies without releasing, and startup recovery
//! clears such leftovers.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::application::cancellation;
use crate::domain::foundation::DomainError;
use crate::domain::person::Snapshot;
use crate::ports::{JobLock, LockLease};

/// The work a scheduler tick performs while holding the lock.
#[async_trait]
pub trait RefreshJob: Send + Sync {
    /// Recomputes and installs the snapshot.
    ///
    /// Returns `Ok(None)` when cancelled before the snapshot was written.
    async fn refresh(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<Option<Arc<Snapshot>>, DomainError>;
}

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Logical job name, used as the lock key.
    pub job_name: String,

    /// Time between ticks.
    pub interval: Duration,

    /// Lease TTL, renewed every third of it while a refresh runs.
    pub lock_ttl: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            job_name: "rating-refresh".to_string(),
            interval: Duration::from_secs(60),
            lock_ttl: Duration::from_secs(120),
        }
    }
}

impl SchedulerConfig {
    pub fn with_job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = name.into();
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }
}

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Snapshot replaced with this many ratings.
    Completed { ratings: usize },
    /// Another holder had the lock, or the lock backend was unreachable.
    Skipped,
    /// The refresh failed; the snapshot was left as is.
    Failed(DomainError),
    /// Cancelled mid-run; the snapshot was left as is.
    Cancelled,
}

/// Background service running the refresh job on an interval.
pub struct RefreshScheduler {
    lock: Arc<dyn JobLock>,
    job: Arc<dyn RefreshJob>,
    config: SchedulerConfig,
}

impl RefreshScheduler {
    pub fn new(lock: Arc<dyn JobLock>, job: Arc<dyn RefreshJob>, config: SchedulerConfig) -> Self {
        Self { lock, job, config }
    }

    /// Clears lease entries left behind by a crashed instance.
    ///
    /// Returns the number of entries removed; backend errors are logged
    /// and count as zero.
    pub async fn recover(&self) -> u64 {
        match self.lock.release_all(&self.config.job_name).await {
            Ok(0) => 0,
            Ok(removed) => {
                tracing::info!(job = %self.config.job_name, removed, "Cleared stale job locks");
                removed
            }
            Err(e) => {
                tracing::warn!(job = %self.config.job_name, error = %e, "Failed to clear stale job locks");
                0
            }
        }
    }

    /// Runs one tick: acquire, refresh, release.
    pub async fn tick(&self, cancel: watch::Receiver<bool>) -> TickOutcome {
        let job = &self.config.job_name;

        let lease = match self.lock.try_acquire(job, self.config.lock_ttl).await {
            Ok(Some(lease)) => lease,
            Ok(None) => {
                tracing::debug!(job = %job, "Job lock held elsewhere, skipping tick");
                return TickOutcome::Skipped;
            }
            Err(e) => {
                tracing::warn!(job = %job, error = %e, "Job lock unavailable, skipping tick");
                return TickOutcome::Skipped;
            }
        };

        let outcome = match self.refresh_under(&lease, cancel).await {
            Ok(Some(snapshot)) => TickOutcome::Completed {
                ratings: snapshot.len(),
            },
            Ok(None) => TickOutcome::Cancelled,
            Err(e) => {
                tracing::error!(job = %job, error = %e, "Snapshot refresh failed");
                TickOutcome::Failed(e)
            }
        };

        match self.lock.release(&lease).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(job = %job, "Job lock expired before release");
            }
            Err(e) => {
                tracing::warn!(job = %job, error = %e, "Failed to release job lock");
            }
        }

        if let TickOutcome::Completed { ratings } = outcome {
            tracing::info!(job = %job, ratings, "Snapshot refreshed");
        }
        outcome
    }

    /// Runs the job while keeping the lease alive.
    ///
    /// The job sees a derived cancel signal. Besides the caller's signal it
    /// fires once the lease is known lost or has gone unconfirmed for nine
    /// tenths of its TTL.
    async fn refresh_under(
        &self,
        lease: &LockLease,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<Option<Arc<Snapshot>>, DomainError> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let refresh = self.job.refresh(stop_rx);
        tokio::pin!(refresh);

        let ttl = lease.ttl();
        let confirmed_for = ttl - ttl / 10;
        let period = (ttl / 3).max(Duration::from_millis(1));
        let mut heartbeat = time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = time::sleep(confirmed_for);
        tokio::pin!(deadline);
        let mut stopped = false;

        loop {
            tokio::select! {
                result = &mut refresh => return result,

                _ = cancellation::cancelled(&mut cancel), if !stopped => {
                    stopped = true;
                    let _ = stop_tx.send(true);
                }

                _ = heartbeat.tick(), if !stopped => {
                    let renewed_at = Instant::now();
                    match self.lock.extend(lease).await {
                        Ok(true) => deadline.as_mut().reset(renewed_at + confirmed_for),
                        Ok(false) => {
                            tracing::warn!(job = %lease.job(), "Job lock lost, cancelling refresh");
                            stopped = true;
                            let _ = stop_tx.send(true);
                        }
                        Err(e) => {
                            tracing::warn!(job = %lease.job(), error = %e, "Failed to extend job lock");
                        }
                    }
                }

                _ = &mut deadline, if !stopped => {
                    tracing::warn!(job = %lease.job(), "Job lock not renewed in time, cancelling refresh");
                    stopped = true;
                    let _ = stop_tx.send(true);
                }
            }
        }
    }

    /// Recovers stale locks, then ticks until shutdown is signalled.
    ///
    /// A shutdown during a tick cancels the in-flight refresh.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        self.recover().await;

        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            job = %self.config.job_name,
            interval_secs = self.config.interval.as_secs(),
            "Refresh scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancellation::cancelled(&mut shutdown) => break,

                _ = interval.tick() => {
                    self.tick(shutdown.clone()).await;
                }
            }
        }

        tracing::info!(job = %self.config.job_name, "Refresh scheduler stopped");
    }
}
