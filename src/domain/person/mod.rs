//! Person module - the person record and its derived ratings.

mod person;
mod rating;

pub use person::{Person, PersonDraft};
pub use rating::{Order, Rating, Snapshot};
