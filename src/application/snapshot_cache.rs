//! SnapshotCache - two-tier holder of the latest rating snapshot.
//!
//! The memory tier is an `Arc<Snapshot>` behind a `std::sync::RwLock`;
//! replacing it swaps the pointer, so a reader holds either the old or the
//! new snapshot in full. The durable tier is a [`SnapshotStore`] shared by
//! every instance. Only the instance holding the refresh lock writes it, so
//! the memory tier is re-checked against it once it is older than
//! `max_age`. Snapshots are ordered by `computed_at`; an older one never
//! replaces a newer one in either tier.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::person::Snapshot;
use crate::ports::{CacheError, CacheLookup, SnapshotStore};

/// Default bound on how long the memory tier is served unchecked.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30);

struct Current {
    snapshot: Arc<Snapshot>,
    checked_at: Instant,
}

pub struct SnapshotCache {
    current: RwLock<Option<Current>>,
    store: Arc<dyn SnapshotStore>,
    max_age: Duration,
    // Serializes replaces so both tiers end on the same snapshot.
    writer: Mutex<()>,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            current: RwLock::new(None),
            store,
            max_age: DEFAULT_MAX_AGE,
            writer: Mutex::new(()),
        }
    }

    /// Sets how long the memory tier is trusted before the durable tier is
    /// consulted again. Keep it at or below the refresh interval.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Returns the current snapshot if one is present and non-empty.
    ///
    /// A memory entry younger than `max_age` is served as is. Otherwise the
    /// durable tier is loaded and the newer of the two is kept. If the
    /// durable tier fails, a memory entry is still served; without one the
    /// failure is reported as `Unavailable`, which callers treat like a miss.
    pub async fn read(&self) -> CacheLookup<Arc<Snapshot>> {
        let held = self.in_memory();
        if let Some((snapshot, checked_at)) = &held {
            if checked_at.elapsed() < self.max_age {
                return non_empty(Arc::clone(snapshot));
            }
        }

        let checked_at = Instant::now();
        match self.store.load().await {
            Ok(Some(loaded)) => non_empty(self.install(loaded, checked_at)),
            Ok(None) => match held {
                Some((snapshot, _)) => {
                    self.mark_checked(checked_at);
                    non_empty(snapshot)
                }
                None => CacheLookup::Miss,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load rating snapshot");
                match held {
                    Some((snapshot, _)) => non_empty(snapshot),
                    None => CacheLookup::Unavailable(CacheError::Unavailable(e.to_string())),
                }
            }
        }
    }

    /// Replaces the whole snapshot in both tiers.
    ///
    /// If either tier already holds a snapshot computed later, nothing is
    /// written and that snapshot is returned instead. A durable write
    /// failure is logged and the memory tier is still updated.
    pub async fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let _writer = self.writer.lock().await;

        if let Some(current) = self.newest_known().await {
            if snapshot.computed_at().is_before(&current.computed_at()) {
                tracing::debug!(
                    computed_at = %current.computed_at().as_datetime(),
                    "Kept newer rating snapshot"
                );
                return current;
            }
        }

        if let Err(e) = self.store.save(&snapshot).await {
            tracing::warn!(error = %e, ratings = snapshot.len(), "Failed to persist rating snapshot");
        }

        let snapshot = Arc::new(snapshot);
        *self.write_guard("replace") = Some(Current {
            snapshot: Arc::clone(&snapshot),
            checked_at: Instant::now(),
        });
        tracing::debug!(ratings = snapshot.len(), "Rating snapshot replaced");
        snapshot
    }

    /// Newest snapshot across both tiers; a durable read failure falls back
    /// to memory alone.
    async fn newest_known(&self) -> Option<Arc<Snapshot>> {
        let checked_at = Instant::now();
        match self.store.load().await {
            Ok(Some(loaded)) => Some(self.install(loaded, checked_at)),
            Ok(None) => self.in_memory().map(|(snapshot, _)| snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load rating snapshot before replace");
                self.in_memory().map(|(snapshot, _)| snapshot)
            }
        }
    }

    /// Installs a durable snapshot unless memory already holds a newer one.
    fn install(&self, loaded: Snapshot, checked_at: Instant) -> Arc<Snapshot> {
        let mut current = self.write_guard("install");
        if let Some(held) = current.as_mut() {
            if loaded.computed_at().is_before(&held.snapshot.computed_at()) {
                held.checked_at = checked_at;
                return Arc::clone(&held.snapshot);
            }
        }

        let snapshot = Arc::new(loaded);
        *current = Some(Current {
            snapshot: Arc::clone(&snapshot),
            checked_at,
        });
        snapshot
    }

    fn mark_checked(&self, checked_at: Instant) {
        if let Some(held) = self.write_guard("mark_checked").as_mut() {
            held.checked_at = checked_at;
        }
    }

    fn in_memory(&self) -> Option<(Arc<Snapshot>, Instant)> {
        self.read_guard()
            .as_ref()
            .map(|held| (Arc::clone(&held.snapshot), held.checked_at))
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Option<Current>> {
        match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!(op = "read", "Recovered from poisoned snapshot lock");
                poisoned.into_inner()
            }
        }
    }

    fn write_guard(&self, op: &'static str) -> RwLockWriteGuard<'_, Option<Current>> {
        match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!(op, "Recovered from poisoned snapshot lock");
                poisoned.into_inner()
            }
        }
    }
}

fn non_empty(snapshot: Arc<Snapshot>) -> CacheLookup<Arc<Snapshot>> {
    if snapshot.is_empty() {
        CacheLookup::Miss
    } else {
        CacheLookup::Hit(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySnapshotStore;
    use crate::domain::foundation::{PersonId, Timestamp};
    use crate::domain::person::Rating;

    fn snapshot_of(n: i64, value: f64) -> Snapshot {
        Snapshot::new(
            (1..=n).map(|id| Rating::new(PersonId::new(id), value)).collect(),
            Timestamp::now(),
        )
    }

    fn snapshot_at(value: f64, seconds_after: i64, base: Timestamp) -> Snapshot {
        Snapshot::new(
            vec![Rating::new(PersonId::new(1), value)],
            Timestamp::from_datetime(*base.as_datetime() + chrono::Duration::seconds(seconds_after)),
        )
    }

    fn rating_of(lookup: CacheLookup<Arc<Snapshot>>) -> Option<f64> {
        lookup.into_hit().and_then(|s| s.get(PersonId::new(1)))
    }

    #[tokio::test]
    async fn empty_cache_misses() {
        let cache = SnapshotCache::new(Arc::new(InMemorySnapshotStore::new()));
        assert!(matches!(cache.read().await, CacheLookup::Miss));
    }

    #[tokio::test]
    async fn read_after_replace_returns_the_snapshot_in_full() {
        let store = InMemorySnapshotStore::new();
        let cache = SnapshotCache::new(Arc::new(store.clone()));
        let snapshot = snapshot_of(3, 2.5);

        cache.replace(snapshot.clone()).await;

        let read = cache.read().await.into_hit().unwrap();
        assert_eq!(*read, snapshot);
        assert_eq!(store.stored().await, Some(snapshot));
    }

    #[tokio::test]
    async fn memory_miss_falls_back_to_durable_tier() {
        let snapshot = snapshot_of(2, 4.0);
        let cache = SnapshotCache::new(Arc::new(InMemorySnapshotStore::with_snapshot(
            snapshot.clone(),
        )));

        let read = cache.read().await.into_hit().unwrap();
        assert_eq!(*read, snapshot);
    }

    #[tokio::test]
    async fn empty_snapshot_counts_as_absent() {
        let cache = SnapshotCache::new(Arc::new(InMemorySnapshotStore::new()));
        cache.replace(Snapshot::new(Vec::new(), Timestamp::now())).await;

        assert!(matches!(cache.read().await, CacheLookup::Miss));
    }

    #[tokio::test]
    async fn durable_failure_still_swaps_memory() {
        let store = InMemorySnapshotStore::new();
        store.fail_saves(true);
        let cache = SnapshotCache::new(Arc::new(store.clone()));

        cache.replace(snapshot_of(1, 1.0)).await;

        assert!(cache.read().await.is_hit());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn instance_that_did_not_refresh_picks_up_the_new_snapshot() {
        let store = InMemorySnapshotStore::new();
        let max_age = Duration::from_secs(10);
        let winner = SnapshotCache::new(Arc::new(store.clone())).with_max_age(max_age);
        let other = SnapshotCache::new(Arc::new(store.clone())).with_max_age(max_age);
        let base = Timestamp::now();

        winner.replace(snapshot_at(1.0, 0, base)).await;
        assert_eq!(rating_of(other.read().await), Some(1.0));

        winner.replace(snapshot_at(5.0, 1, base)).await;
        assert_eq!(rating_of(other.read().await), Some(1.0));

        tokio::time::advance(max_age).await;
        assert_eq!(rating_of(other.read().await), Some(5.0));
    }

    #[tokio::test]
    async fn older_snapshot_never_replaces_a_newer_one() {
        let store = InMemorySnapshotStore::new();
        let cache = SnapshotCache::new(Arc::new(store.clone()));
        let base = Timestamp::now();
        let newer = snapshot_at(5.0, 10, base);

        cache.replace(newer.clone()).await;
        let kept = cache.replace(snapshot_at(1.0, 0, base)).await;

        assert_eq!(*kept, newer);
        assert_eq!(rating_of(cache.read().await), Some(5.0));
        assert_eq!(store.stored().await, Some(newer));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn older_snapshot_loses_to_one_written_by_another_instance() {
        let store = InMemorySnapshotStore::new();
        let winner = SnapshotCache::new(Arc::new(store.clone()));
        let other = SnapshotCache::new(Arc::new(store.clone()));
        let base = Timestamp::now();

        winner.replace(snapshot_at(5.0, 10, base)).await;
        let kept = other.replace(snapshot_at(1.0, 0, base)).await;

        assert_eq!(kept.get(PersonId::new(1)), Some(5.0));
        assert_eq!(rating_of(other.read().await), Some(5.0));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn durable_outage_keeps_serving_memory() {
        let store = InMemorySnapshotStore::new();
        let cache = SnapshotCache::new(Arc::new(store.clone())).with_max_age(Duration::ZERO);
        cache.replace(snapshot_of(2, 3.0)).await;

        store.fail_loads(true);

        assert!(cache.read().await.is_hit());
    }

    #[tokio::test]
    async fn durable_outage_without_memory_is_unavailable() {
        let store = InMemorySnapshotStore::new();
        store.fail_loads(true);
        let cache = SnapshotCache::new(Arc::new(store));

        assert!(matches!(cache.read().await, CacheLookup::Unavailable(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reads_never_see_a_partial_snapshot() {
        let cache = Arc::new(SnapshotCache::new(Arc::new(InMemorySnapshotStore::new())));
        cache.replace(snapshot_of(50, 1.0)).await;

        let writer = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                for round in 0..200 {
                    let value = if round % 2 == 0 { 2.0 } else { 1.0 };
                    cache.replace(snapshot_of(50, value)).await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    let snapshot = cache.read().await.into_hit().unwrap();
                    assert_eq!(snapshot.len(), 50);
                    let first = snapshot.ratings()[0].rating;
                    assert!(snapshot.ratings().iter().all(|r| r.rating == first));
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
