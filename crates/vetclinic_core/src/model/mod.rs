//! Entity model for clinic pet and chip records.
//!
//! # Responsibility
//! - Define the in-memory shape of `Pet` and `Chip`.
//! - Own field-level validation shared by services and DAOs.
//!
//! # Invariants
//! - Identity is `None` until the store assigns one on first insert.
//! - Deletion is represented by the `is_deleted` flag, never by row removal.

pub mod chip;
pub mod pet;

use chrono::{Local, NaiveDate};
use thiserror::Error;

/// Field or identity violation detected before any write reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required text field is absent or blank.
    #[error("field `{0}` is required")]
    MissingField(&'static str),
    /// Date field lies after today.
    #[error("field `{0}` cannot be in the future")]
    FutureDate(&'static str),
    /// Lookup/delete id is not a positive integer.
    #[error("id must be greater than 0, got {0}")]
    InvalidId(i64),
    /// Update requested for an entity that was never persisted.
    #[error("{0} must have a persisted id to be updated")]
    MissingId(&'static str),
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

pub(crate) fn require_not_future(
    field: &'static str,
    value: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match value {
        Some(date) if date > Local::now().date_naive() => Err(ValidationError::FutureDate(field)),
        _ => Ok(()),
    }
}

/// Rejects ids that cannot belong to a persisted row.
pub fn require_positive_id(id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::InvalidId(id));
    }
    Ok(())
}
