//! Pet use-case service.
//!
//! # Responsibility
//! - Validate pet (and attached chip) fields before writing.
//! - Order every pet write as chip first, then pet, on one connection.
//!
//! # Invariants
//! - A new chip (`id` `None`/`0`) is inserted and its id attached to the pet;
//!   a persisted chip is updated in place.
//! - A pet is never stored pointing at a chip created in a rolled-back scope.

use super::{run_in_transaction, with_connection, ServiceError, ServiceResult};
use crate::db::{ConnectionProvider, TransactionManager};
use crate::model::chip::Chip;
use crate::model::pet::{Pet, PetId};
use crate::model::{require_positive_id, ValidationError};
use crate::repo::chip_dao::SqliteChipDao;
use crate::repo::pet_dao::SqlitePetDao;
use crate::repo::GenericDao;
use log::info;
use rusqlite::Connection;
use std::borrow::Borrow;

pub struct PetService<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> PetService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Inserts a pet (and its new chip) in one internal transaction.
    ///
    /// Returns the pet with store-assigned ids on both pet and chip.
    pub fn insert(&self, pet: Pet) -> ServiceResult<Pet> {
        validate_pet(&pet)?;
        run_in_transaction(&self.provider, "pet_insert", |tx| self.insert_in(tx, pet))
    }

    /// Inserts a pet inside a caller-managed transaction.
    ///
    /// # Contract
    /// - `tx` must be active; nothing is committed here.
    /// - Chip and pet rows are written through `tx.connection()`.
    pub fn insert_in<C: Borrow<Connection>>(
        &self,
        tx: &TransactionManager<C>,
        mut pet: Pet,
    ) -> ServiceResult<Pet> {
        validate_pet(&pet)?;
        tx.ensure_active("insert pet")?;

        let conn = tx.connection();
        pet.chip = save_chip(conn, pet.chip.take())?;
        let created = SqlitePetDao::new(conn).create(&pet)?;
        info!(
            "event=pet_insert module=service status=ok pet_id={} chip_id={}",
            created.id.unwrap_or(0),
            created.chip_id().unwrap_or(0)
        );
        Ok(created)
    }

    /// Updates a persisted pet (and its chip) in one internal transaction.
    pub fn update(&self, pet: Pet) -> ServiceResult<Pet> {
        validate_pet_update(&pet)?;
        run_in_transaction(&self.provider, "pet_update", |tx| self.update_in(tx, pet))
    }

    /// Updates a pet inside a caller-managed transaction.
    ///
    /// Fails with `NotFound` before any chip write when no pet row has the id.
    pub fn update_in<C: Borrow<Connection>>(
        &self,
        tx: &TransactionManager<C>,
        mut pet: Pet,
    ) -> ServiceResult<Pet> {
        validate_pet_update(&pet)?;
        tx.ensure_active("update pet")?;

        let conn = tx.connection();
        let pets = SqlitePetDao::new(conn);
        let id = pet.id.unwrap_or_default();
        if !pets.exists(id)? {
            return Err(ServiceError::NotFound { entity: "pet", id });
        }

        pet.chip = save_chip(conn, pet.chip.take())?;
        pets.update(&pet)?;
        Ok(pet)
    }

    /// Attaches a new chip to an active pet that has none.
    pub fn assign_chip(&self, pet_id: PetId, chip: Chip) -> ServiceResult<Pet> {
        require_positive_id(pet_id)?;
        chip.validate()?;
        run_in_transaction(&self.provider, "pet_assign_chip", |tx| {
            let mut pet = SqlitePetDao::new(tx.connection())
                .read(pet_id)?
                .ok_or(ServiceError::NotFound {
                    entity: "pet",
                    id: pet_id,
                })?;
            if let Some(chip_id) = pet.chip_id() {
                return Err(ServiceError::ChipAlreadyAssigned { pet_id, chip_id });
            }

            pet.chip = Some(chip);
            self.update_in(tx, pet)
        })
    }

    /// Logically deletes a pet and, before it, its chip.
    pub fn delete(&self, id: PetId) -> ServiceResult<()> {
        require_positive_id(id)?;
        run_in_transaction(&self.provider, "pet_delete", |tx| {
            Ok(SqlitePetDao::new(tx.connection()).delete(id)?)
        })
    }

    /// Restores a logically deleted pet together with its chip.
    pub fn restore(&self, id: PetId) -> ServiceResult<()> {
        require_positive_id(id)?;
        run_in_transaction(&self.provider, "pet_restore", |tx| {
            Ok(SqlitePetDao::new(tx.connection()).restore(id)?)
        })
    }

    pub fn get_by_id(&self, id: PetId) -> ServiceResult<Option<Pet>> {
        require_positive_id(id)?;
        with_connection(&self.provider, |conn| Ok(SqlitePetDao::new(conn).read(id)?))
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Pet>> {
        with_connection(&self.provider, |conn| Ok(SqlitePetDao::new(conn).read_all()?))
    }
}

fn validate_pet(pet: &Pet) -> Result<(), ValidationError> {
    pet.validate()?;
    if let Some(chip) = &pet.chip {
        chip.validate()?;
    }
    Ok(())
}

fn validate_pet_update(pet: &Pet) -> Result<(), ValidationError> {
    validate_pet(pet)?;
    match pet.id {
        Some(id) if id > 0 => Ok(()),
        _ => Err(ValidationError::MissingId("pet")),
    }
}

/// Inserts a new chip or rewrites a persisted one, returning it with its id.
fn save_chip(conn: &Connection, chip: Option<Chip>) -> ServiceResult<Option<Chip>> {
    let Some(chip) = chip else {
        return Ok(None);
    };

    let dao = SqliteChipDao::new(conn);
    if chip.is_new() {
        return Ok(Some(dao.create(&chip)?));
    }

    dao.update(&chip)?;
    Ok(Some(chip))
}
