//! Use-case services for pets and chips.
//!
//! # Responsibility
//! - Validate inputs before any write reaches a DAO.
//! - Sequence multi-table writes inside one transaction scope.
//!
//! # Invariants
//! - One-shot writes open one connection and one transaction, and commit
//!   once; any failure leaves the store untouched.
//! - `*_in` variants only run inside a caller-started transaction and never
//!   commit, roll back or close it.

use crate::db::{
    ConnectionProvider, DbError, TransactionError, TransactionManager, TransactionStateError,
};
use crate::model::ValidationError;
use crate::repo::PersistenceError;
use log::{info, warn};
use rusqlite::Connection;
use std::time::Instant;
use thiserror::Error;

pub mod chip_service;
pub mod pet_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure surfaced to service callers, distinguishable by kind.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    TransactionState(#[from] TransactionStateError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error("pet {pet_id} already has chip {chip_id}")]
    ChipAlreadyAssigned { pet_id: i64, chip_id: i64 },
}

impl From<TransactionError> for ServiceError {
    fn from(value: TransactionError) -> Self {
        match value {
            TransactionError::State(err) => Self::TransactionState(err),
            TransactionError::Db(err) => Self::Persistence(PersistenceError::Db(err)),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Persistence(PersistenceError::Db(value))
    }
}

/// Runs `work` in a fresh connection + transaction and commits on success.
///
/// On error the manager is dropped while active, which rolls back.
pub(crate) fn run_in_transaction<P, T>(
    provider: &P,
    event: &'static str,
    work: impl FnOnce(&TransactionManager) -> ServiceResult<T>,
) -> ServiceResult<T>
where
    P: ConnectionProvider,
{
    let started_at = Instant::now();
    let mut tx = TransactionManager::open(provider.connect()?);
    tx.start()?;

    match work(&tx) {
        Ok(value) => {
            tx.commit()?;
            info!(
                "event={event} module=service status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            warn!(
                "event={event} module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Runs a read-only `work` on a fresh connection released on return.
pub(crate) fn with_connection<P, T>(
    provider: &P,
    work: impl FnOnce(&Connection) -> ServiceResult<T>,
) -> ServiceResult<T>
where
    P: ConnectionProvider,
{
    let conn = provider.connect()?;
    work(&conn)
}
