//! PersonService - the facade external callers use.
//!
//! Reads go to the cache first and fall back to the store. Writes go to the
//! store first; only after it succeeds are the cache entries refreshed, and
//! the full list entry is always rebuilt from the store rather than
//! patched. Cache failures are logged and never reach the caller.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::cancellation;
use crate::application::rating_aggregator::RatingAggregator;
use crate::application::refresh_scheduler::RefreshJob;
use crate::application::snapshot_cache::SnapshotCache;
use crate::domain::foundation::{DomainError, ErrorCode, PersonId, Timestamp};
use crate::domain::person::{Person, PersonDraft, Rating, Snapshot};
use crate::ports::{CacheLookup, PersonCache, PersonRepository};

pub struct PersonService {
    repository: Arc<dyn PersonRepository>,
    cache: Arc<dyn PersonCache>,
    aggregator: Arc<RatingAggregator>,
    snapshots: Arc<SnapshotCache>,
}

impl PersonService {
    pub fn new(
        repository: Arc<dyn PersonRepository>,
        cache: Arc<dyn PersonCache>,
        aggregator: Arc<RatingAggregator>,
        snapshots: Arc<SnapshotCache>,
    ) -> Self {
        Self {
            repository,
            cache,
            aggregator,
            snapshots,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Persons
    // ════════════════════════════════════════════════════════════════════════

    /// Returns every person, from the cache when possible.
    pub async fn get_persons(&self) -> Result<Vec<Person>, DomainError> {
        match self.cache.get_all().await {
            CacheLookup::Hit(persons) => return Ok(persons),
            CacheLookup::Miss => tracing::debug!("Person list cache miss"),
            CacheLookup::Unavailable(e) => {
                tracing::warn!(error = %e, "Person list cache unavailable, reading store")
            }
        }

        let persons = self.repository.list().await?;
        if let Err(e) = self.cache.set_all(&persons).await {
            tracing::warn!(error = %e, "Failed to cache person list");
        }
        Ok(persons)
    }

    /// Returns one person, from the cache when possible.
    pub async fn get_person(&self, id: PersonId) -> Result<Person, DomainError> {
        match self.cache.get_by_id(id).await {
            CacheLookup::Hit(person) => return Ok(person),
            CacheLookup::Miss => tracing::debug!(person_id = %id, "Person cache miss"),
            CacheLookup::Unavailable(e) => {
                tracing::warn!(person_id = %id, error = %e, "Person cache unavailable, reading store")
            }
        }

        let person = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| person_not_found(id))?;
        self.cache_person(&person).await;
        Ok(person)
    }

    pub async fn create_person(&self, draft: PersonDraft) -> Result<Person, DomainError> {
        let person = self.repository.create(&draft).await?;
        tracing::info!(person_id = %person.id, "Person created");

        self.cache_person(&person).await;
        self.rebuild_list_cache().await?;
        Ok(person)
    }

    pub async fn update_person(
        &self,
        id: PersonId,
        draft: PersonDraft,
    ) -> Result<Person, DomainError> {
        let person = self.repository.update(id, &draft).await?;
        tracing::info!(person_id = %id, "Person updated");

        self.cache_person(&person).await;
        self.rebuild_list_cache().await?;
        Ok(person)
    }

    pub async fn delete_person(&self, id: PersonId) -> Result<(), DomainError> {
        self.repository.delete(id).await?;
        tracing::info!(person_id = %id, "Person deleted");

        if let Err(e) = self.cache.delete(id).await {
            tracing::warn!(person_id = %id, error = %e, "Failed to evict cached person");
        }
        self.rebuild_list_cache().await
    }

    /// Flags a person's rating as changed.
    ///
    /// The entity and list cache entries are rewritten so readers see the
    /// flag without waiting for the TTL. The snapshot is left to the caller,
    /// which refreshes it under the job lock.
    pub async fn mark_rating_updated(&self, id: PersonId) -> Result<Person, DomainError> {
        let person = self.repository.set_rating_updated(id, true).await?;
        tracing::info!(person_id = %id, "Person rating flagged as updated");

        self.cache_person(&person).await;
        self.rebuild_list_cache().await?;
        Ok(person)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Ratings
    // ════════════════════════════════════════════════════════════════════════

    /// Computes one person's rating with a direct order service call.
    pub async fn get_rating(&self, id: PersonId) -> Result<f64, DomainError> {
        let person = self.get_person(id).await?;
        Ok(self.aggregator.rate(person.id).await.rating)
    }

    /// Returns the snapshot ratings, computing and installing them on a miss.
    pub async fn get_rating_snapshot(&self) -> Result<Vec<Rating>, DomainError> {
        match self.snapshots.read().await {
            CacheLookup::Hit(snapshot) => return Ok(snapshot.ratings().to_vec()),
            CacheLookup::Miss => tracing::debug!("Rating snapshot miss, aggregating"),
            CacheLookup::Unavailable(e) => {
                tracing::warn!(error = %e, "Rating snapshot unavailable, aggregating")
            }
        }

        match self.refresh_snapshot(cancellation::never()).await? {
            Some(snapshot) => Ok(snapshot.ratings().to_vec()),
            None => Err(DomainError::new(
                ErrorCode::InternalError,
                "Rating aggregation was cancelled",
            )),
        }
    }

    /// Aggregates ratings for every person without touching the snapshot.
    pub async fn recompute_ratings(&self) -> Result<Vec<Rating>, DomainError> {
        let ids = self.person_ids().await?;
        let outcome = self.aggregator.aggregate(&ids, cancellation::never()).await;
        Ok(outcome.ratings)
    }

    /// Aggregates ratings for every person and replaces the snapshot.
    ///
    /// The snapshot is stamped with the time the pass started, so a pass
    /// that started earlier never overwrites a later one. Returns `Ok(None)`
    /// if cancelled; a cancelled pass never writes the snapshot.
    pub async fn refresh_snapshot(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<Option<Arc<Snapshot>>, DomainError> {
        let started = Timestamp::now();
        let ids = self.person_ids().await?;
        let outcome = self.aggregator.aggregate(&ids, cancel.clone()).await;

        if outcome.cancelled || cancellation::is_cancelled(&cancel) {
            return Ok(None);
        }
        if outcome.degraded > 0 {
            tracing::warn!(
                persons = ids.len(),
                degraded = outcome.degraded,
                "Snapshot contains degraded ratings"
            );
        }

        let snapshot = Snapshot::new(outcome.ratings, started);
        Ok(Some(self.snapshots.replace(snapshot).await))
    }

    /// Checks that the store answers.
    pub async fn health(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    // ════════════════════════════════════════════════════════════════════════
    // Helpers
    // ════════════════════════════════════════════════════════════════════════

    async fn person_ids(&self) -> Result<Vec<PersonId>, DomainError> {
        Ok(self.get_persons().await?.into_iter().map(|p| p.id).collect())
    }

    async fn cache_person(&self, person: &Person) {
        if let Err(e) = self.cache.set_one(person).await {
            tracing::warn!(person_id = %person.id, error = %e, "Failed to cache person");
        }
    }

    /// Re-reads the full list from the store and caches it.
    ///
    /// If the re-read fails the list entry is evicted, so no reader keeps
    /// seeing the list as it was before the mutation.
    async fn rebuild_list_cache(&self) -> Result<(), DomainError> {
        let persons = match self.repository.list().await {
            Ok(persons) => persons,
            Err(e) => {
                tracing::error!(error = %e, "Failed to re-read persons after mutation");
                if let Err(e) = self.cache.delete_all().await {
                    tracing::warn!(error = %e, "Failed to evict person list");
                }
                return Err(e);
            }
        };

        if let Err(e) = self.cache.set_all(&persons).await {
            tracing::warn!(error = %e, "Failed to cache person list");
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshJob for PersonService {
    async fn refresh(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<Option<Arc<Snapshot>>, DomainError> {
        self.refresh_snapshot(cancel).await
    }
}

fn person_not_found(id: PersonId) -> DomainError {
    DomainError::new(
        ErrorCode::PersonNotFound,
        format!("Person not found: {}", id),
    )
}
