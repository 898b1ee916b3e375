//! Scoped transaction coordinator over one SQLite connection.
//!
//! # Responsibility
//! - Expose explicit `start`/`commit` over a single connection.
//! - Roll back automatically when the scope ends while still active.
//!
//! # Invariants
//! - State only moves `Idle -> Active -> (Committed | RolledBack)`.
//! - A dropped `Active` manager never leaves its writes committed.
//! - When the manager owns its connection, the connection closes only after
//!   the rollback-on-drop has run.

use super::DbError;
use log::{debug, error, warn};
use rusqlite::Connection;
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Lifecycle of one coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    Active,
    Committed,
    RolledBack,
}

impl Display for TransactionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        };
        f.write_str(label)
    }
}

/// Coordinator used out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {operation} transaction in state `{state}`")]
pub struct TransactionStateError {
    pub operation: &'static str,
    pub state: TransactionState,
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error(transparent)]
    State(#[from] TransactionStateError),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for TransactionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Explicit transaction scope over an owned or borrowed connection.
///
/// ```no_run
/// use vetclinic_core::db::{open_db, TransactionManager};
///
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = open_db("clinic.db")?;
/// let mut tx = TransactionManager::open(&conn);
/// tx.start()?;
/// // ... writes through tx.connection() ...
/// tx.commit()?;
/// # Ok(())
/// # }
/// ```
pub struct TransactionManager<C: Borrow<Connection> = Connection> {
    conn: C,
    state: TransactionState,
}

impl<C: Borrow<Connection>> TransactionManager<C> {
    /// Wraps a connection in an idle coordinator. No SQL is issued yet.
    pub fn open(conn: C) -> Self {
        Self {
            conn,
            state: TransactionState::Idle,
        }
    }

    /// Begins the transaction, taking the write lock immediately.
    pub fn start(&mut self) -> Result<(), TransactionError> {
        self.expect_state("start", TransactionState::Idle)?;
        self.connection().execute_batch("BEGIN IMMEDIATE;")?;
        self.state = TransactionState::Active;
        debug!("event=tx_start module=db status=ok");
        Ok(())
    }

    /// Finalizes all work done since `start`.
    ///
    /// On a failed `COMMIT` the manager stays active, so dropping it still
    /// rolls back.
    pub fn commit(&mut self) -> Result<(), TransactionError> {
        self.expect_state("commit", TransactionState::Active)?;
        self.connection().execute_batch("COMMIT;")?;
        self.state = TransactionState::Committed;
        debug!("event=tx_commit module=db status=ok");
        Ok(())
    }

    /// Discards all work done since `start`.
    pub fn rollback(&mut self) -> Result<(), TransactionError> {
        self.expect_state("rollback", TransactionState::Active)?;
        self.connection().execute_batch("ROLLBACK;")?;
        self.state = TransactionState::RolledBack;
        debug!("event=tx_rollback module=db status=ok reason=explicit");
        Ok(())
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Fails unless the transaction is active; used by callers that must not
    /// write outside a started scope.
    pub fn ensure_active(&self, operation: &'static str) -> Result<(), TransactionStateError> {
        self.expect_state(operation, TransactionState::Active)
    }

    /// Connection the transaction runs on. DAOs borrow it for every step.
    pub fn connection(&self) -> &Connection {
        self.conn.borrow()
    }

    fn expect_state(
        &self,
        operation: &'static str,
        expected: TransactionState,
    ) -> Result<(), TransactionStateError> {
        if self.state != expected {
            return Err(TransactionStateError {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

impl<C: Borrow<Connection>> Drop for TransactionManager<C> {
    fn drop(&mut self) {
        if self.state != TransactionState::Active {
            return;
        }

        match self.conn.borrow().execute_batch("ROLLBACK;") {
            Ok(()) => {
                self.state = TransactionState::RolledBack;
                warn!("event=tx_rollback module=db status=ok reason=scope_exit");
            }
            Err(err) => {
                error!(
                    "event=tx_rollback module=db status=error reason=scope_exit error={}",
                    err
                );
            }
        }
    }
}
