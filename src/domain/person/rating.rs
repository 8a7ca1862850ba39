//! Orders, derived ratings and the aggregate snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{PersonId, Timestamp};

/// An order as returned by the order service. Read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: i64,
    pub person_id: PersonId,
    pub rating: f64,
    pub created_at: Timestamp,
}

/// Derived rating of one person.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub person_id: PersonId,
    pub rating: f64,
}

impl Rating {
    pub fn new(person_id: PersonId, rating: f64) -> Self {
        Self { person_id, rating }
    }

    /// Rating used when no value could be derived.
    pub fn zero(person_id: PersonId) -> Self {
        Self::new(person_id, 0.0)
    }

    /// Mean of the order ratings, `0.0` when there are none.
    pub fn from_orders(person_id: PersonId, orders: &[Order]) -> Self {
        if orders.is_empty() {
            return Self::zero(person_id);
        }
        let sum: f64 = orders.iter().map(|o| o.rating).sum();
        Self::new(person_id, sum / orders.len() as f64)
    }
}

/// A complete aggregation result, one rating per person.
///
/// Replaced as a whole; never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    computed_at: Timestamp,
    #[serde(with = "ratings_by_person")]
    ratings: Vec<Rating>,
}

impl Snapshot {
    pub fn new(ratings: Vec<Rating>, computed_at: Timestamp) -> Self {
        Self {
            computed_at,
            ratings,
        }
    }

    pub fn computed_at(&self) -> Timestamp {
        self.computed_at
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn get(&self, person_id: PersonId) -> Option<f64> {
        self.ratings
            .iter()
            .find(|r| r.person_id == person_id)
            .map(|r| r.rating)
    }
}

/// Persists ratings as a `person_id -> rating` map.
mod ratings_by_person {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ratings: &[Rating], serializer: S) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<i64, f64> = ratings
            .iter()
            .map(|r| (r.person_id.as_i64(), r.rating))
            .collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Rating>, D::Error> {
        let map = BTreeMap::<i64, f64>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(id, rating)| Rating::new(PersonId::new(id), rating))
            .collect())
    }
}
