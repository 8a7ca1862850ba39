//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - REST API (axum)
//! - `memory` - In-process person store, cache and job lock
//! - `orders` - Order service client (reqwest)
//! - `postgres` - Authoritative person store (sqlx)
//! - `redis` - Person cache, job lock, shared snapshot store and event consumer
//! - `storage` - Durable rating snapshot storage

pub mod http;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod redis;
pub mod storage;

pub use memory::{InMemoryJobLock, InMemoryPersonCache, InMemoryPersonRepository};
pub use orders::{HttpOrderClient, OrderClientConfig};
pub use postgres::PostgresPersonRepository;
pub use storage::{FileSnapshotStore, InMemorySnapshotStore};
