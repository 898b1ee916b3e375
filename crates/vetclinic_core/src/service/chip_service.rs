//! Chip use-case service.
//!
//! Straight pass-through to `SqliteChipDao` with field and id checks; no
//! cross-entity coordination happens here.

use super::{run_in_transaction, with_connection, ServiceResult};
use crate::db::ConnectionProvider;
use crate::model::chip::{Chip, ChipId};
use crate::model::{require_positive_id, ValidationError};
use crate::repo::chip_dao::SqliteChipDao;
use crate::repo::GenericDao;

pub struct ChipService<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> ChipService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Validates and inserts a chip, returning it with its new id.
    pub fn insert(&self, chip: Chip) -> ServiceResult<Chip> {
        chip.validate()?;
        run_in_transaction(&self.provider, "chip_insert", |tx| {
            Ok(SqliteChipDao::new(tx.connection()).create(&chip)?)
        })
    }

    /// Overwrites a persisted chip.
    pub fn update(&self, chip: Chip) -> ServiceResult<Chip> {
        chip.validate()?;
        match chip.id {
            Some(id) if id > 0 => {}
            _ => return Err(ValidationError::MissingId("chip").into()),
        }
        run_in_transaction(&self.provider, "chip_update", |tx| {
            SqliteChipDao::new(tx.connection()).update(&chip)?;
            Ok(chip)
        })
    }

    /// Logically deletes a chip.
    pub fn delete(&self, id: ChipId) -> ServiceResult<()> {
        require_positive_id(id)?;
        run_in_transaction(&self.provider, "chip_delete", |tx| {
            Ok(SqliteChipDao::new(tx.connection()).delete(id)?)
        })
    }

    /// Makes a logically deleted chip visible again.
    pub fn restore(&self, id: ChipId) -> ServiceResult<()> {
        require_positive_id(id)?;
        run_in_transaction(&self.provider, "chip_restore", |tx| {
            Ok(SqliteChipDao::new(tx.connection()).restore(id)?)
        })
    }

    pub fn get_by_id(&self, id: ChipId) -> ServiceResult<Option<Chip>> {
        require_positive_id(id)?;
        with_connection(&self.provider, |conn| {
            Ok(SqliteChipDao::new(conn).read(id)?)
        })
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Chip>> {
        with_connection(&self.provider, |conn| {
            Ok(SqliteChipDao::new(conn).read_all()?)
        })
    }
}
