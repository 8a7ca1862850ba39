//! In-memory person store for testing and development.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PersonId, Timestamp};
use crate::domain::person::{Person, PersonDraft};
use crate::ports::PersonRepository;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<PersonId, Person>,
    last_id: i64,
}

/// In-memory implementation of [`PersonRepository`].
///
/// Ids are assigned sequentially starting at 1 and never reused, like a
/// `BIGSERIAL` column.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersonRepository {
    table: Arc<RwLock<Table>>,
    unavailable: Arc<AtomicBool>,
    list_unavailable: Arc<AtomicBool>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with a database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only `list` fail, leaving single-row operations working.
    pub fn set_list_unavailable(&self, unavailable: bool) {
        self.list_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check(&self, operation: &str) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database(operation, "store unavailable"));
        }
        Ok(())
    }
}

fn not_found(id: PersonId) -> DomainError {
    DomainError::new(
        ErrorCode::PersonNotFound,
        format!("Person not found: {}", id),
    )
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn list(&self) -> Result<Vec<Person>, DomainError> {
        self.check("list persons")?;
        if self.list_unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database("list persons", "store unavailable"));
        }
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, DomainError> {
        self.check("fetch person")?;
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, draft: &PersonDraft) -> Result<Person, DomainError> {
        self.check("insert person")?;
        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = PersonId::new(table.last_id);
        let person = draft.clone().into_person(id, Timestamp::now());
        table.rows.insert(id, person.clone());
        Ok(person)
    }

    async fn update(&self, id: PersonId, draft: &PersonDraft) -> Result<Person, DomainError> {
        self.check("update person")?;
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        *row = draft.clone().apply_to(row);
        Ok(row.clone())
    }

    async fn set_rating_updated(
        &self,
        id: PersonId,
        updated: bool,
    ) -> Result<Person, DomainError> {
        self.check("flag person rating")?;
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        row.rating_updated = updated;
        Ok(row.clone())
    }

    async fn delete(&self, id: PersonId) -> Result<(), DomainError> {
        self.check("delete person")?;
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.check("reach database")
    }
}
