//! In-memory adapters for testing and single-instance development.
//!
//! - `InMemoryPersonRepository` - Person store with switchable failures
//! - `InMemoryPersonCache` - TTL cache with a simulated outage mode
//! - `InMemoryJobLock` - Lease lock shared between clones

mod job_lock;
mod person_cache;
mod person_repository;

pub use job_lock::InMemoryJobLock;
pub use person_cache::InMemoryPersonCache;
pub use person_repository::InMemoryPersonRepository;
