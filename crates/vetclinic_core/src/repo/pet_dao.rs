//! Pet DAO over the `mascota` table.
//!
//! # Invariants
//! - The chip link is persisted as `mascota.microchip_id`; `NULL` or `0`
//!   means "no chip".
//! - Reads resolve the chip in a second query through `SqliteChipDao` on the
//!   same connection. A deleted chip is not attached.
//! - `delete` marks the chip deleted before the pet; `restore` clears the
//!   chip flag before the pet's.

use super::chip_dao::SqliteChipDao;
use super::{bool_to_int, parse_date, parse_deleted_flag, GenericDao, PersistenceError, RepoResult};
use crate::model::chip::ChipId;
use crate::model::pet::{Pet, PetId};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const PET_SELECT_SQL: &str = "SELECT
    id,
    nombre,
    especie,
    raza,
    fecha_nacimiento,
    duenio,
    eliminado,
    microchip_id
FROM mascota";

/// SQLite-backed pet DAO bound to one connection scope.
pub struct SqlitePetDao<'conn> {
    conn: &'conn Connection,
    chips: SqliteChipDao<'conn>,
}

impl<'conn> SqlitePetDao<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            chips: SqliteChipDao::new(conn),
        }
    }

    /// Loads one pet, optionally including logically deleted rows.
    ///
    /// The chip is attached only when it is active, even when the pet row
    /// itself is deleted.
    pub fn find(&self, id: PetId, include_deleted: bool) -> RepoResult<Option<Pet>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PET_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR eliminado = 0);"
        ))?;

        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let (mut pet, chip_ref) = parse_pet_row(row)?;
        self.attach_chip(&mut pet, chip_ref)?;
        Ok(Some(pet))
    }

    /// Raw `microchip_id` stored on the pet row, regardless of delete flags.
    pub fn chip_reference(&self, id: PetId) -> RepoResult<Option<ChipId>> {
        let chip_ref = self
            .conn
            .query_row(
                "SELECT microchip_id FROM mascota WHERE id = ?1;",
                [id],
                |row| row.get::<_, Option<ChipId>>(0),
            )
            .optional()?;
        Ok(chip_ref.flatten().filter(|chip_id| *chip_id != 0))
    }

    /// True when a row with `id` exists, deleted or not.
    pub fn exists(&self, id: PetId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM mascota WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// Clears the delete flag on the pet and on the chip it references.
    pub fn restore(&self, id: PetId) -> RepoResult<()> {
        if let Some(chip_id) = self.chip_reference(id)? {
            self.chips.restore(chip_id)?;
        }

        let changed = self.conn.execute(
            "UPDATE mascota SET eliminado = 0 WHERE id = ?1;",
            [id],
        )?;
        debug!("event=pet_restore module=repo status=ok pet_id={id} rows={changed}");
        Ok(())
    }

    fn deleted_chip_reference(&self, id: PetId) -> RepoResult<Option<ChipId>> {
        let Some(chip_id) = self.chip_reference(id)? else {
            return Ok(None);
        };
        let is_deleted = self
            .chips
            .find(chip_id, true)?
            .is_some_and(|chip| chip.is_deleted);
        Ok(is_deleted.then_some(chip_id))
    }

    fn attach_chip(&self, pet: &mut Pet, chip_ref: Option<ChipId>) -> RepoResult<()> {
        pet.chip = match chip_ref.filter(|chip_id| *chip_id != 0) {
            Some(chip_id) => self.chips.read(chip_id)?,
            None => None,
        };
        Ok(())
    }
}

impl GenericDao<Pet> for SqlitePetDao<'_> {
    fn create(&self, pet: &Pet) -> RepoResult<Pet> {
        let chip_ref = persisted_chip_ref(pet)?;
        self.conn.execute(
            "INSERT INTO mascota (
                nombre,
                especie,
                raza,
                fecha_nacimiento,
                duenio,
                eliminado,
                microchip_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6);",
            params![
                pet.name.as_str(),
                pet.species.as_str(),
                pet.breed.as_str(),
                pet.birth_date,
                pet.owner.as_str(),
                chip_ref,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "event=pet_create module=repo status=ok pet_id={id} chip_id={}",
            chip_ref.unwrap_or(0)
        );
        Ok(Pet {
            id: Some(id),
            is_deleted: false,
            ..pet.clone()
        })
    }

    fn read(&self, id: PetId) -> RepoResult<Option<Pet>> {
        self.find(id, false)
    }

    fn read_all(&self) -> RepoResult<Vec<Pet>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PET_SELECT_SQL}
             WHERE eliminado = 0
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut loaded = Vec::new();
        while let Some(row) = rows.next()? {
            loaded.push(parse_pet_row(row)?);
        }

        let mut pets = Vec::with_capacity(loaded.len());
        for (mut pet, chip_ref) in loaded {
            self.attach_chip(&mut pet, chip_ref)?;
            pets.push(pet);
        }

        Ok(pets)
    }

    /// A pet read without its chip because the chip is soft-deleted keeps
    /// the stored link, so restoring the chip reattaches it.
    fn update(&self, pet: &Pet) -> RepoResult<()> {
        let id = pet.id.ok_or(PersistenceError::MissingId("pet"))?;
        let chip_ref = match persisted_chip_ref(pet)? {
            Some(chip_id) => Some(chip_id),
            None => self.deleted_chip_reference(id)?,
        };
        let changed = self.conn.execute(
            "UPDATE mascota
             SET
                nombre = ?1,
                especie = ?2,
                raza = ?3,
                fecha_nacimiento = ?4,
                duenio = ?5,
                eliminado = ?6,
                microchip_id = ?7
             WHERE id = ?8;",
            params![
                pet.name.as_str(),
                pet.species.as_str(),
                pet.breed.as_str(),
                pet.birth_date,
                pet.owner.as_str(),
                bool_to_int(pet.is_deleted),
                chip_ref,
                id,
            ],
        )?;

        debug!("event=pet_update module=repo status=ok pet_id={id} rows={changed}");
        Ok(())
    }

    fn delete(&self, id: PetId) -> RepoResult<()> {
        if let Some(chip_id) = self.read(id)?.and_then(|pet| pet.chip_id()) {
            self.chips.delete(chip_id)?;
        }

        let changed = self.conn.execute(
            "UPDATE mascota SET eliminado = 1 WHERE id = ?1;",
            [id],
        )?;
        debug!("event=pet_delete module=repo status=ok pet_id={id} rows={changed}");
        Ok(())
    }
}

fn persisted_chip_ref(pet: &Pet) -> RepoResult<Option<ChipId>> {
    match &pet.chip {
        Some(chip) if chip.is_new() => Err(PersistenceError::UnsavedChip),
        Some(chip) => Ok(chip.id),
        None => Ok(None),
    }
}

fn parse_pet_row(row: &Row<'_>) -> RepoResult<(Pet, Option<ChipId>)> {
    let birth_date = match row.get::<_, Option<String>>("fecha_nacimiento")? {
        Some(value) => Some(parse_date(&value, "mascota.fecha_nacimiento")?),
        None => None,
    };
    let is_deleted = parse_deleted_flag(row.get("eliminado")?, "mascota.eliminado")?;

    let pet = Pet {
        id: Some(row.get("id")?),
        name: row.get("nombre")?,
        species: row.get("especie")?,
        breed: row.get("raza")?,
        birth_date,
        owner: row.get("duenio")?,
        chip: None,
        is_deleted,
    };
    Ok((pet, row.get("microchip_id")?))
}
