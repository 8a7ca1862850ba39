//! PostgreSQL implementation of PersonRepository.
//!
//! The `persons` table is the source of truth for person records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, PersonId, Timestamp};
use crate::domain::person::{Person, PersonDraft};
use crate::ports::PersonRepository;

const PERSON_COLUMNS: &str = "id, name, age, height, weight, rating_updated, created_at";

/// PostgreSQL implementation of PersonRepository.
#[derive(Clone)]
pub struct PostgresPersonRepository {
    pool: PgPool,
}

impl PostgresPersonRepository {
    /// Creates a new PostgresPersonRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations.
    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }
}

#[async_trait]
impl PersonRepository for PostgresPersonRepository {
    async fn list(&self) -> Result<Vec<Person>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM persons ORDER BY id",
            PERSON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("list persons", e))?;

        rows.into_iter().map(row_to_person).collect()
    }

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM persons WHERE id = $1",
            PERSON_COLUMNS
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch person", e))?;

        row.map(row_to_person).transpose()
    }

    async fn create(&self, draft: &PersonDraft) -> Result<Person, DomainError> {
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO persons (name, age, height, weight, rating_updated)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PERSON_COLUMNS
        ))
        .bind(draft.name())
        .bind(draft.age())
        .bind(draft.height())
        .bind(draft.weight())
        .bind(draft.rating_updated())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row_to_person(row),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::new(
                    ErrorCode::Conflict,
                    format!("Person already exists: {}", db_err),
                ))
            }
            Err(e) => Err(DomainError::database("insert person", e)),
        }
    }

    async fn update(&self, id: PersonId, draft: &PersonDraft) -> Result<Person, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE persons SET
                name = $2,
                age = $3,
                height = $4,
                weight = $5,
                rating_updated = $6
            WHERE id = $1
            RETURNING {}
            "#,
            PERSON_COLUMNS
        ))
        .bind(id.as_i64())
        .bind(draft.name())
        .bind(draft.age())
        .bind(draft.height())
        .bind(draft.weight())
        .bind(draft.rating_updated())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("update person", e))?;

        match row {
            Some(row) => row_to_person(row),
            None => Err(not_found(id)),
        }
    }

    async fn set_rating_updated(
        &self,
        id: PersonId,
        updated: bool,
    ) -> Result<Person, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE persons SET rating_updated = $2 WHERE id = $1 RETURNING {}",
            PERSON_COLUMNS
        ))
        .bind(id.as_i64())
        .bind(updated)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("flag person rating", e))?;

        match row {
            Some(row) => row_to_person(row),
            None => Err(not_found(id)),
        }
    }

    async fn delete(&self, id: PersonId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("delete person", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::database("reach database", e))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn not_found(id: PersonId) -> DomainError {
    DomainError::new(
        ErrorCode::PersonNotFound,
        format!("Person not found: {}", id),
    )
}

fn row_to_person(row: sqlx::postgres::PgRow) -> Result<Person, DomainError> {
    let column_err = |column: &str, e: sqlx::Error| {
        DomainError::database(&format!("get {}", column), e)
    };

    let id: i64 = row.try_get("id").map_err(|e| column_err("id", e))?;
    let name: String = row.try_get("name").map_err(|e| column_err("name", e))?;
    let age: i64 = row.try_get("age").map_err(|e| column_err("age", e))?;
    let height: String = row.try_get("height").map_err(|e| column_err("height", e))?;
    let weight: String = row.try_get("weight").map_err(|e| column_err("weight", e))?;
    let rating_updated: bool = row
        .try_get("rating_updated")
        .map_err(|e| column_err("rating_updated", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| column_err("created_at", e))?;

    Ok(Person {
        id: PersonId::new(id),
        name,
        age,
        height,
        weight,
        rating_updated,
        created_at: Timestamp::from_datetime(created_at),
    })
}
