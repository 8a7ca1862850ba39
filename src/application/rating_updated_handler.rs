//! Handler for `orders.update_rating` messages.
//!
//! The order service publishes `{"id": <person id>}` whenever a person's
//! orders change. Every instance receives the message; the snapshot refresh
//! goes through the scheduler, so only the one holding the job lock runs it.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::person_service::PersonService;
use crate::application::refresh_scheduler::{RefreshScheduler, TickOutcome};
use crate::domain::foundation::{DomainError, PersonId};
use crate::ports::EventHandler;

#[derive(Debug, Deserialize)]
struct RatingUpdated {
    id: PersonId,
}

/// Marks the person's rating as updated and refreshes the snapshot.
pub struct RatingUpdatedHandler {
    service: Arc<PersonService>,
    scheduler: Arc<RefreshScheduler>,
}

impl RatingUpdatedHandler {
    pub fn new(service: Arc<PersonService>, scheduler: Arc<RefreshScheduler>) -> Self {
        Self { service, scheduler }
    }
}

#[async_trait]
impl EventHandler for RatingUpdatedHandler {
    async fn handle(
        &self,
        payload: &[u8],
        cancel: watch::Receiver<bool>,
    ) -> Result<(), DomainError> {
        let event: RatingUpdated = serde_json::from_slice(payload)
            .map_err(|e| DomainError::validation("payload", format!("Malformed rating update: {}", e)))?;

        self.service.mark_rating_updated(event.id).await?;

        match self.scheduler.tick(cancel).await {
            TickOutcome::Completed { ratings } => {
                tracing::debug!(person_id = %event.id, ratings, "Snapshot refreshed after rating update")
            }
            TickOutcome::Skipped => {
                tracing::debug!(person_id = %event.id, "Snapshot refresh already running elsewhere")
            }
            TickOutcome::Cancelled => {
                tracing::debug!(person_id = %event.id, "Snapshot refresh after rating update cancelled")
            }
            // Logged by the scheduler; the flag update itself succeeded.
            TickOutcome::Failed(_) => {}
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RatingUpdatedHandler"
    }
}
