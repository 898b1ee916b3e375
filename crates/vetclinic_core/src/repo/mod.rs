//! Data-access layer over the clinic SQLite store.
//!
//! # Responsibility
//! - Map `Pet`/`Chip` to and from `mascota`/`microchip` rows.
//! - Keep SQL text and row parsing inside the persistence boundary.
//!
//! # Invariants
//! - DAOs borrow a connection; they never open, commit or close one. The same
//!   DAO type serves both one-shot calls and caller-managed transactions.
//! - Every read path excludes logically deleted rows.
//! - Store failures are wrapped and returned, never swallowed.

use crate::db::DbError;
use rusqlite::ffi;
use thiserror::Error;

pub mod chip_dao;
pub mod pet_dao;

pub type RepoResult<T> = Result<T, PersistenceError>;

/// Store access failure, classified where SQLite reports a constraint.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("{0} has no persisted id")]
    MissingId(&'static str),
    #[error("pet references a chip that has not been persisted")]
    UnsavedChip,
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            let detail = message.clone().unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Self::UniqueViolation(detail);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ForeignKeyViolation(detail),
                ffi::SQLITE_CONSTRAINT_CHECK => return Self::CheckViolation(detail),
                _ => {}
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD contract shared by every entity DAO.
///
/// `delete` is logical: it flips the row's `eliminado` flag.
pub trait GenericDao<T> {
    /// Inserts `entity` as active and returns it with the assigned id.
    fn create(&self, entity: &T) -> RepoResult<T>;
    /// Returns the active entity with `id`, or `None`.
    fn read(&self, id: i64) -> RepoResult<Option<T>>;
    /// Returns all active entities ordered by id.
    fn read_all(&self) -> RepoResult<Vec<T>>;
    /// Overwrites every mutable column, including the delete flag.
    ///
    /// An id that matches no row is a successful no-op.
    fn update(&self, entity: &T) -> RepoResult<()>;
    /// Marks the row deleted. Repeated calls are no-ops.
    fn delete(&self, id: i64) -> RepoResult<()>;
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn parse_deleted_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid eliminado value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn parse_date(value: &str, column: &str) -> RepoResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        PersistenceError::InvalidData(format!("invalid date `{value}` in {column}"))
    })
}
