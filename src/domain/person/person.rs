//! Person record and the validated input used to create or update one.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PersonId, Timestamp, ValidationError};

const MAX_AGE: i64 = 150;
const MAX_MEASURE_LEN: usize = 32;

/// A person as owned by the authoritative store.
///
/// Cached copies are derived from this and carry no extra state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub age: i64,
    pub height: String,
    pub weight: String,
    pub rating_updated: bool,
    pub created_at: Timestamp,
}

/// Validated field values for a create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDraft {
    name: String,
    age: i64,
    height: String,
    weight: String,
    rating_updated: bool,
}

impl PersonDraft {
    /// Validates raw field values.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    /// - `OutOfRange` if age is outside `0..=150`
    /// - `InvalidFormat` if height or weight is longer than 32 characters
    pub fn new(
        name: impl Into<String>,
        age: i64,
        height: impl Into<String>,
        weight: impl Into<String>,
        rating_updated: bool,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if !(0..=MAX_AGE).contains(&age) {
            return Err(ValidationError::out_of_range("age", 0, MAX_AGE, age));
        }

        let height = height.into();
        let weight = weight.into();
        for (field, value) in [("height", &height), ("weight", &weight)] {
            if value.chars().count() > MAX_MEASURE_LEN {
                return Err(ValidationError::invalid_format(
                    field,
                    format!("must be at most {} characters", MAX_MEASURE_LEN),
                ));
            }
        }

        Ok(Self {
            name,
            age,
            height,
            weight,
            rating_updated,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn height(&self) -> &str {
        &self.height
    }

    pub fn weight(&self) -> &str {
        &self.weight
    }

    pub fn rating_updated(&self) -> bool {
        self.rating_updated
    }

    /// Builds the stored record once the store has assigned an id.
    pub fn into_person(self, id: PersonId, created_at: Timestamp) -> Person {
        Person {
            id,
            name: self.name,
            age: self.age,
            height: self.height,
            weight: self.weight,
            rating_updated: self.rating_updated,
            created_at,
        }
    }

    /// Applies this draft over an existing record, keeping id and creation time.
    pub fn apply_to(self, person: &Person) -> Person {
        self.into_person(person.id, person.created_at)
    }
}
