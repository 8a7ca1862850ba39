//! In-memory person cache with TTL for testing and development.
//!
//! Expiry uses `tokio::time::Instant` so tests can drive it with a paused
//! clock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::foundation::PersonId;
use crate::domain::person::Person;
use crate::ports::{CacheError, CacheLookup, PersonCache};

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

impl<T: Clone> Entry<T> {
    fn live(&self) -> Option<T> {
        (Instant::now() < self.expires_at).then(|| self.value.clone())
    }
}

#[derive(Debug, Default)]
struct Entries {
    list: Option<Entry<Vec<Person>>>,
    persons: HashMap<PersonId, Entry<Person>>,
}

/// In-memory implementation of [`PersonCache`].
#[derive(Debug, Clone)]
pub struct InMemoryPersonCache {
    entries: Arc<RwLock<Entries>>,
    ttl: Duration,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryPersonCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            ttl,
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A cache whose backend fails every operation.
    pub fn unavailable() -> Self {
        let cache = Self::default();
        cache.set_unavailable(true);
        cache
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn backend_error(&self) -> Option<CacheError> {
        self.unavailable
            .load(Ordering::SeqCst)
            .then(|| CacheError::Unavailable("simulated cache outage".to_string()))
    }

    fn entry<T>(&self, value: T) -> Entry<T> {
        Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        }
    }

    /// Live cached list, bypassing the failure switch.
    pub async fn cached_list(&self) -> Option<Vec<Person>> {
        self.entries.read().await.list.as_ref().and_then(Entry::live)
    }

    /// Live cached person, bypassing the failure switch.
    pub async fn cached_person(&self, id: PersonId) -> Option<Person> {
        self.entries.read().await.persons.get(&id).and_then(Entry::live)
    }
}

impl Default for InMemoryPersonCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(90_000))
    }
}

fn lookup<T>(value: Option<T>) -> CacheLookup<T> {
    match value {
        Some(value) => CacheLookup::Hit(value),
        None => CacheLookup::Miss,
    }
}

#[async_trait]
impl PersonCache for InMemoryPersonCache {
    async fn get_all(&self) -> CacheLookup<Vec<Person>> {
        if let Some(err) = self.backend_error() {
            return CacheLookup::Unavailable(err);
        }
        lookup(self.cached_list().await)
    }

    async fn get_by_id(&self, id: PersonId) -> CacheLookup<Person> {
        if let Some(err) = self.backend_error() {
            return CacheLookup::Unavailable(err);
        }
        lookup(self.cached_person(id).await)
    }

    async fn set_all(&self, persons: &[Person]) -> Result<(), CacheError> {
        if let Some(err) = self.backend_error() {
            return Err(err);
        }
        let entry = self.entry(persons.to_vec());
        self.entries.write().await.list = Some(entry);
        Ok(())
    }

    async fn set_one(&self, person: &Person) -> Result<(), CacheError> {
        if let Some(err) = self.backend_error() {
            return Err(err);
        }
        let entry = self.entry(person.clone());
        self.entries.write().await.persons.insert(person.id, entry);
        Ok(())
    }

    async fn delete(&self, id: PersonId) -> Result<(), CacheError> {
        if let Some(err) = self.backend_error() {
            return Err(err);
        }
        self.entries.write().await.persons.remove(&id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), CacheError> {
        if let Some(err) = self.backend_error() {
            return Err(err);
        }
        self.entries.write().await.list = None;
        Ok(())
    }
}
