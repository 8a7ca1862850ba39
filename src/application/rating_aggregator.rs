//! RatingAggregator - fan-out/fan-in over the order service.
//!
//! One task per distinct person fetches that person's orders and reduces
//! them to a mean. A semaphore bounds how many fetches are in flight at
//! once, independently of how many persons are submitted. Each task
//! returns its slot index with the rating, and the join side alone writes
//! into a pre-sized slot vector, so results are collected without a shared
//! mutable container.
//!
//! Per-person failures (error, bad payload, timeout, panic) degrade that
//! person to `0.0`. The aggregation itself cannot fail.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use crate::application::cancellation;
use crate::domain::foundation::PersonId;
use crate::domain::person::Rating;
use crate::ports::RatingSource;

/// Configuration for the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Deadline for one order service call.
    pub request_timeout: Duration,

    /// Maximum concurrent order service calls.
    pub max_concurrency: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(2000),
            max_concurrency: 32,
        }
    }
}

impl AggregatorConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
    /// Exactly one rating per distinct input person, in input order.
    pub ratings: Vec<Rating>,

    /// How many ratings are `0.0` because no value could be derived.
    pub degraded: usize,

    /// True if the pass was cut short by cancellation.
    pub cancelled: bool,
}

struct Fetched {
    rating: Rating,
    degraded: bool,
}

impl Fetched {
    fn ok(rating: Rating) -> Self {
        Self {
            rating,
            degraded: false,
        }
    }

    fn degraded(person_id: PersonId) -> Self {
        Self {
            rating: Rating::zero(person_id),
            degraded: true,
        }
    }
}

/// Computes ratings for many persons concurrently.
pub struct RatingAggregator {
    source: Arc<dyn RatingSource>,
    permits: Arc<Semaphore>,
    config: AggregatorConfig,
}

impl RatingAggregator {
    pub fn new(source: Arc<dyn RatingSource>, config: AggregatorConfig) -> Self {
        Self {
            source,
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            config,
        }
    }

    /// Computes one rating per distinct person in `persons`.
    ///
    /// Returns once every task has reported, or as soon as `cancel` fires.
    /// On cancellation the outstanding tasks are aborted and their persons
    /// get degraded `0.0` entries, so the result still has one rating per
    /// person.
    pub async fn aggregate(
        &self,
        persons: &[PersonId],
        mut cancel: watch::Receiver<bool>,
    ) -> AggregationOutcome {
        let mut seen = HashSet::with_capacity(persons.len());
        let ids: Vec<PersonId> = persons.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut slots: Vec<Option<Fetched>> = Vec::with_capacity(ids.len());
        slots.resize_with(ids.len(), || None);

        let mut tasks = JoinSet::new();
        for (slot, &person_id) in ids.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&self.permits);
            let timeout = self.config.request_timeout;
            tasks.spawn(async move {
                let fetched = fetch_rating(source.as_ref(), &permits, person_id, timeout).await;
                (slot, fetched)
            });
        }

        let mut cancelled = false;
        loop {
            tokio::select! {
                biased;

                _ = cancellation::cancelled(&mut cancel) => {
                    tasks.abort_all();
                    cancelled = true;
                    break;
                }

                joined = tasks.join_next() => match joined {
                    Some(Ok((slot, fetched))) => slots[slot] = Some(fetched),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Rating task did not complete");
                    }
                    None => break,
                },
            }
        }

        let mut degraded = 0;
        let ratings = slots
            .into_iter()
            .zip(&ids)
            .map(|(slot, &person_id)| {
                let fetched = slot.unwrap_or_else(|| Fetched::degraded(person_id));
                if fetched.degraded {
                    degraded += 1;
                }
                fetched.rating
            })
            .collect();

        if cancelled {
            tracing::info!(persons = ids.len(), degraded, "Aggregation cancelled");
        } else {
            tracing::debug!(persons = ids.len(), degraded, "Aggregation complete");
        }

        AggregationOutcome {
            ratings,
            degraded,
            cancelled,
        }
    }

    /// Computes the rating of a single person.
    ///
    /// Upstream failures degrade to `0.0` the same way as in a batch.
    pub async fn rate(&self, person_id: PersonId) -> Rating {
        fetch_rating(
            self.source.as_ref(),
            &self.permits,
            person_id,
            self.config.request_timeout,
        )
        .await
        .rating
    }
}

async fn fetch_rating(
    source: &dyn RatingSource,
    permits: &Semaphore,
    person_id: PersonId,
    timeout: Duration,
) -> Fetched {
    let _permit = match permits.acquire().await {
        Ok(permit) => permit,
        Err(_) => return Fetched::degraded(person_id),
    };

    match tokio::time::timeout(timeout, source.orders_for(person_id)).await {
        Ok(Ok(orders)) => Fetched::ok(Rating::from_orders(person_id, &orders)),
        Ok(Err(e)) => {
            tracing::warn!(person_id = %person_id, error = %e, "Order fetch failed, rating degraded");
            Fetched::degraded(person_id)
        }
        Err(_) => {
            tracing::warn!(
                person_id = %person_id,
                timeout_ms = timeout.as_millis() as u64,
                "Order fetch timed out, rating degraded"
            );
            Fetched::degraded(person_id)
        }
    }
}
