//! PersonCache port - fast read-through/write-through tier for persons.
//!
//! Reads return a [`CacheLookup`] so a backend failure is a distinct,
//! explicit outcome. Callers treat `Miss` and `Unavailable` the same way
//! (fall back to the store) but can log them differently.

use async_trait::async_trait;

use crate::domain::foundation::PersonId;
use crate::domain::person::Person;

/// Errors raised by a cache backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to encode cache entry: {0}")]
    Encode(String),

    #[error("Failed to decode cache entry: {0}")]
    Decode(String),
}

/// Outcome of a cache read.
#[derive(Debug, Clone)]
pub enum CacheLookup<T> {
    /// Entry present and decoded.
    Hit(T),
    /// No entry (absent or expired).
    Miss,
    /// The backend failed or the entry could not be decoded.
    Unavailable(CacheError),
}

impl<T> CacheLookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    /// Returns the value on a hit, discarding the miss reason.
    pub fn into_hit(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            _ => None,
        }
    }
}

/// Cache of person entities and of the full person list.
///
/// Entries expire after the configured TTL regardless of store mutations.
/// Writes overwrite unconditionally (last writer wins).
#[async_trait]
pub trait PersonCache: Send + Sync {
    /// Reads the cached full list.
    async fn get_all(&self) -> CacheLookup<Vec<Person>>;

    /// Reads one cached person.
    async fn get_by_id(&self, id: PersonId) -> CacheLookup<Person>;

    /// Replaces the cached full list.
    async fn set_all(&self, persons: &[Person]) -> Result<(), CacheError>;

    /// Replaces one cached person.
    async fn set_one(&self, person: &Person) -> Result<(), CacheError>;

    /// Removes one cached person.
    async fn delete(&self, id: PersonId) -> Result<(), CacheError>;

    /// Removes the cached full list.
    async fn delete_all(&self) -> Result<(), CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_hit_yields_value() {
        let lookup = CacheLookup::Hit(3);
        assert!(lookup.is_hit());
        assert_eq!(lookup.into_hit(), Some(3));
    }

    #[test]
    fn lookup_unavailable_is_not_a_hit() {
        let lookup: CacheLookup<u8> =
            CacheLookup::Unavailable(CacheError::Unavailable("down".to_string()));
        assert!(!lookup.is_hit());
        assert_eq!(lookup.into_hit(), None);
    }

    #[allow(dead_code)]
    fn assert_cache_object_safe(_: &dyn PersonCache) {}
}
