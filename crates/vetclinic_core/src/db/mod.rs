//! SQLite storage bootstrap, schema migration and transaction scope.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the clinic store.
//! - Apply schema migrations in deterministic order.
//! - Provide the scoped transaction coordinator used by multi-table writes.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No pet/chip data is read or written before migrations succeed.

use thiserror::Error;

pub mod migrations;
mod open;
mod provider;
pub mod transaction;

pub use open::{connect_db, open_db, open_db_in_memory};
pub use provider::{ConnectionProvider, SqliteFileProvider};
pub use transaction::{
    TransactionError, TransactionManager, TransactionState, TransactionStateError,
};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
