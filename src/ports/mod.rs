//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `PersonRepository` - Authoritative person store
//! - `PersonCache` - Read-through/write-through person cache with TTL
//! - `SnapshotStore` - Durable tier of the rating snapshot
//!
//! ## Upstream Ports
//!
//! - `RatingSource` - Order service queried per person
//!
//! ## Coordination Ports
//!
//! - `JobLock` - Cluster-wide advisory lock for the refresh job
//! - `EventHandler` - Handler for inbound bus messages

mod event_subscriber;
mod job_lock;
mod person_cache;
mod person_repository;
mod rating_source;
mod snapshot_store;

pub use event_subscriber::EventHandler;
pub use job_lock::{JobLock, LockError, LockLease};
pub use person_cache::{CacheError, CacheLookup, PersonCache};
pub use person_repository::PersonRepository;
pub use rating_source::{RatingSource, RatingSourceError};
pub use snapshot_store::{SnapshotStore, SnapshotStoreError};
