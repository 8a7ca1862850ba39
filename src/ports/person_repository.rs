//! PersonRepository port - the authoritative store for person records.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PersonId};
use crate::domain::person::{Person, PersonDraft};

/// Durable storage owning the canonical person rows.
///
/// Every failure is a store failure and is surfaced to the caller;
/// implementations do not retry.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Returns all persons ordered by id.
    async fn list(&self) -> Result<Vec<Person>, DomainError>;

    /// Finds a person by id, `None` if absent.
    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, DomainError>;

    /// Inserts a new person and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the store rejects the row as a duplicate
    /// - `DatabaseError` on any other failure
    async fn create(&self, draft: &PersonDraft) -> Result<Person, DomainError>;

    /// Overwrites the mutable fields of an existing person.
    ///
    /// # Errors
    ///
    /// - `PersonNotFound` if no person has this id
    async fn update(&self, id: PersonId, draft: &PersonDraft) -> Result<Person, DomainError>;

    /// Sets the `rating_updated` flag of an existing person.
    ///
    /// # Errors
    ///
    /// - `PersonNotFound` if no person has this id
    async fn set_rating_updated(&self, id: PersonId, updated: bool)
        -> Result<Person, DomainError>;

    /// Removes a person.
    ///
    /// # Errors
    ///
    /// - `PersonNotFound` if no person has this id
    async fn delete(&self, id: PersonId) -> Result<(), DomainError>;

    /// Cheap round trip used by the liveness check.
    async fn ping(&self) -> Result<(), DomainError>;
}
