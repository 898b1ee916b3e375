//! Connection acquisition capability handed to services.

use super::{connect_db, open_db, DbResult};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Opens a fresh, migrated connection per call.
///
/// The returned connection belongs to the caller and closes on drop.
pub trait ConnectionProvider {
    fn connect(&self) -> DbResult<Connection>;
}

/// File-backed provider; every `connect` reopens the same database file.
///
/// The first successful `connect` bootstraps the schema through [`open_db`];
/// later calls only open and configure the connection.
#[derive(Debug, Clone)]
pub struct SqliteFileProvider {
    path: PathBuf,
    bootstrapped: OnceCell<()>,
}

impl SqliteFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bootstrapped: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteFileProvider {
    fn connect(&self) -> DbResult<Connection> {
        if self.bootstrapped.get().is_some() {
            return connect_db(&self.path);
        }

        let conn = open_db(&self.path)?;
        let _ = self.bootstrapped.set(());
        Ok(conn)
    }
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn connect(&self) -> DbResult<Connection> {
        (**self).connect()
    }
}
