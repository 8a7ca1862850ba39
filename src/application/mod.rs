//! Application layer - Services orchestrating the ports.
//!
//! - `PersonService` - Facade used by HTTP handlers and event consumers
//! - `RatingAggregator` - Concurrent per-person rating computation
//! - `SnapshotCache` - Two-tier holder of the latest rating snapshot
//! - `RefreshScheduler` - Periodic, lock-guarded snapshot refresh

pub mod cancellation;
mod person_service;
mod rating_aggregator;
mod rating_updated_handler;
mod refresh_scheduler;
mod snapshot_cache;

pub use person_service::PersonService;
pub use rating_aggregator::{AggregationOutcome, AggregatorConfig, RatingAggregator};
pub use rating_updated_handler::RatingUpdatedHandler;
pub use refresh_scheduler::{RefreshJob, RefreshScheduler, SchedulerConfig, TickOutcome};
pub use snapshot_cache::SnapshotCache;
