//! HTTP DTOs for person and rating endpoints.
//!
//! Responses reuse the domain `Person` and `Rating` shapes directly; only the
//! request body and the error body have their own types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ValidationError};
use crate::domain::person::PersonDraft;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /person` and `PUT /update_person/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonRequest {
    pub name: String,
    pub age: i64,
    pub height: String,
    pub weight: String,
    #[serde(default)]
    pub rating_updated: bool,
}

impl PersonRequest {
    pub fn into_draft(self) -> Result<PersonDraft, ValidationError> {
        PersonDraft::new(
            self.name,
            self.age,
            self.height,
            self.weight,
            self.rating_updated,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: "unavailable".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn from_domain(error: &DomainError) -> Self {
        let details = if error.details.is_empty() {
            None
        } else {
            serde_json::to_value(&error.details).ok()
        };

        Self {
            code: error.code.to_string(),
            message: error.message.clone(),
            details,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: None,
        }
    }
}
