//! Chip DAO over the `microchip` table.

use super::{bool_to_int, parse_date, parse_deleted_flag, GenericDao, PersistenceError, RepoResult};
use crate::model::chip::{Chip, ChipId};
use log::debug;
use rusqlite::{params, Connection, Row};

const CHIP_SELECT_SQL: &str = "SELECT
    id,
    codigo,
    fecha_implantacion,
    veterinaria,
    observaciones,
    eliminado
FROM microchip";

/// SQLite-backed chip DAO bound to one connection scope.
pub struct SqliteChipDao<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChipDao<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Loads one chip, optionally including logically deleted rows.
    pub fn find(&self, id: ChipId, include_deleted: bool) -> RepoResult<Option<Chip>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHIP_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR eliminado = 0);"
        ))?;

        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_chip_row(row)?));
        }

        Ok(None)
    }

    /// Clears the delete flag. Unknown ids are a no-op.
    pub fn restore(&self, id: ChipId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE microchip SET eliminado = 0 WHERE id = ?1;",
            [id],
        )?;
        debug!("event=chip_restore module=repo status=ok chip_id={id} rows={changed}");
        Ok(())
    }
}

impl GenericDao<Chip> for SqliteChipDao<'_> {
    fn create(&self, chip: &Chip) -> RepoResult<Chip> {
        self.conn.execute(
            "INSERT INTO microchip (
                codigo,
                fecha_implantacion,
                veterinaria,
                observaciones,
                eliminado
            ) VALUES (?1, ?2, ?3, ?4, 0);",
            params![
                chip.code.as_str(),
                chip.implanted_on,
                chip.clinic.as_str(),
                chip.notes.as_deref(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=chip_create module=repo status=ok chip_id={id}");
        Ok(Chip {
            id: Some(id),
            is_deleted: false,
            ..chip.clone()
        })
    }

    fn read(&self, id: ChipId) -> RepoResult<Option<Chip>> {
        self.find(id, false)
    }

    fn read_all(&self) -> RepoResult<Vec<Chip>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHIP_SELECT_SQL}
             WHERE eliminado = 0
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut chips = Vec::new();

        while let Some(row) = rows.next()? {
            chips.push(parse_chip_row(row)?);
        }

        Ok(chips)
    }

    fn update(&self, chip: &Chip) -> RepoResult<()> {
        let id = chip.id.ok_or(PersistenceError::MissingId("chip"))?;
        let changed = self.conn.execute(
            "UPDATE microchip
             SET
                codigo = ?1,
                fecha_implantacion = ?2,
                veterinaria = ?3,
                observaciones = ?4,
                eliminado = ?5
             WHERE id = ?6;",
            params![
                chip.code.as_str(),
                chip.implanted_on,
                chip.clinic.as_str(),
                chip.notes.as_deref(),
                bool_to_int(chip.is_deleted),
                id,
            ],
        )?;

        debug!("event=chip_update module=repo status=ok chip_id={id} rows={changed}");
        Ok(())
    }

    fn delete(&self, id: ChipId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE microchip SET eliminado = 1 WHERE id = ?1;",
            [id],
        )?;
        debug!("event=chip_delete module=repo status=ok chip_id={id} rows={changed}");
        Ok(())
    }
}

fn parse_chip_row(row: &Row<'_>) -> RepoResult<Chip> {
    let implanted_text: String = row.get("fecha_implantacion")?;
    let implanted_on = parse_date(&implanted_text, "microchip.fecha_implantacion")?;
    let is_deleted = parse_deleted_flag(row.get("eliminado")?, "microchip.eliminado")?;

    Ok(Chip {
        id: Some(row.get("id")?),
        code: row.get("codigo")?,
        implanted_on,
        clinic: row.get("veterinaria")?,
        notes: row.get("observaciones")?,
        is_deleted,
    })
}
