use chrono::NaiveDate;
use rusqlite::Connection;
use vetclinic_core::db::open_db_in_memory;
use vetclinic_core::{Chip, GenericDao, PersistenceError, Pet, SqliteChipDao, SqlitePetDao};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn chip(code: &str) -> Chip {
    Chip::new(code, date(2021, 5, 5), "VetCenter")
}

fn pet(name: &str) -> Pet {
    Pet::new(name, "Dog", "Labrador", Some(date(2020, 1, 1)), "Ana")
}

fn deleted_flag(conn: &Connection, table: &str, id: i64) -> i64 {
    conn.query_row(
        &format!("SELECT eliminado FROM {table} WHERE id = ?1;"),
        [id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn chip_create_read_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let dao = SqliteChipDao::new(&conn);

    let created = dao.create(&chip("CHIP-001").with_notes("left shoulder")).unwrap();
    let id = created.id.unwrap();
    assert!(id > 0);

    let loaded = dao.read(id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.notes.as_deref(), Some("left shoulder"));
    assert!(!loaded.is_deleted);
}

#[test]
fn chip_create_ignores_incoming_delete_flag() {
    let conn = open_db_in_memory().unwrap();
    let dao = SqliteChipDao::new(&conn);

    let mut input = chip("CHIP-001");
    input.soft_delete();
    let created = dao.create(&input).unwrap();

    assert!(!created.is_deleted);
    assert!(dao.read(created.id.unwrap()).unwrap().is_some());
}

#[test]
fn chip_delete_hides_row_and_restore_brings_it_back() {
    let conn = open_db_in_memory().unwrap();
    let dao = SqliteChipDao::new(&conn);
    let created = dao.create(&chip("CHIP-001")).unwrap();
    let id = created.id.unwrap();

    dao.delete(id).unwrap();
    dao.delete(id).unwrap();
    assert!(dao.read(id).unwrap().is_none());
    assert!(dao.read_all().unwrap().is_empty());
    assert!(dao.find(id, true).unwrap().unwrap().is_deleted);
    assert_eq!(deleted_flag(&conn, "microchip", id), 1);

    dao.restore(id).unwrap();
    assert_eq!(dao.read(id).unwrap().unwrap(), created);
}

#[test]
fn chip_update_overwrites_fields_and_unknown_id_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let dao = SqliteChipDao::new(&conn);
    let mut created = dao.create(&chip("CHIP-001")).unwrap();

    created.clinic = "Other Clinic".to_string();
    created.notes = Some("re-scanned".to_string());
    dao.update(&created).unwrap();
    assert_eq!(dao.read(created.id.unwrap()).unwrap().unwrap(), created);

    let mut ghost = chip("CHIP-404");
    ghost.id = Some(404);
    dao.update(&ghost).unwrap();
    assert_eq!(dao.read_all().unwrap().len(), 1);

    let err = dao.update(&chip("CHIP-002")).unwrap_err();
    assert!(matches!(err, PersistenceError::MissingId("chip")));
}

#[test]
fn chip_read_all_is_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let dao = SqliteChipDao::new(&conn);
    for code in ["C-3", "C-1", "C-2"] {
        dao.create(&chip(code)).unwrap();
    }

    let codes: Vec<String> = dao.read_all().unwrap().into_iter().map(|c| c.code).collect();
    assert_eq!(codes, vec!["C-3", "C-1", "C-2"]);
}

#[test]
fn pet_read_attaches_active_chip_only() {
    let conn = open_db_in_memory().unwrap();
    let chips = SqliteChipDao::new(&conn);
    let pets = SqlitePetDao::new(&conn);

    let stored_chip = chips.create(&chip("CHIP-001")).unwrap();
    let created = pets.create(&pet("Rex").with_chip(stored_chip.clone())).unwrap();
    let pet_id = created.id.unwrap();

    let loaded = pets.read(pet_id).unwrap().unwrap();
    assert_eq!(loaded.chip, Some(stored_chip.clone()));

    chips.delete(stored_chip.id.unwrap()).unwrap();
    let loaded = pets.read(pet_id).unwrap().unwrap();
    assert_eq!(loaded.chip, None);
    assert_eq!(pets.chip_reference(pet_id).unwrap(), stored_chip.id);
}

#[test]
fn pet_create_rejects_unsaved_chip() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetDao::new(&conn);

    let err = pets.create(&pet("Rex").with_chip(chip("CHIP-001"))).unwrap_err();
    assert!(matches!(err, PersistenceError::UnsavedChip));
    assert!(pets.read_all().unwrap().is_empty());
}

#[test]
fn pet_with_zero_chip_reference_has_no_chip() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
    conn.execute(
        "INSERT INTO mascota (nombre, especie, raza, fecha_nacimiento, duenio, eliminado, microchip_id)
         VALUES ('Legacy', 'Cat', 'Siamese', NULL, 'Luis', 0, 0);",
        [],
    )
    .unwrap();

    let pets = SqlitePetDao::new(&conn);
    let loaded = pets.read_all().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].chip, None);
    assert_eq!(loaded[0].birth_date, None);
    assert_eq!(pets.chip_reference(loaded[0].id.unwrap()).unwrap(), None);
}

#[test]
fn pet_delete_cascades_to_chip_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let chips = SqliteChipDao::new(&conn);
    let pets = SqlitePetDao::new(&conn);

    let stored_chip = chips.create(&chip("CHIP-001")).unwrap();
    let chip_id = stored_chip.id.unwrap();
    let pet_id = pets
        .create(&pet("Rex").with_chip(stored_chip))
        .unwrap()
        .id
        .unwrap();

    pets.delete(pet_id).unwrap();
    assert!(pets.read(pet_id).unwrap().is_none());
    assert!(chips.read(chip_id).unwrap().is_none());

    pets.delete(pet_id).unwrap();
    assert_eq!(deleted_flag(&conn, "mascota", pet_id), 1);
    assert_eq!(deleted_flag(&conn, "microchip", chip_id), 1);
}

#[test]
fn pet_restore_clears_flags_on_pet_and_chip() {
    let conn = open_db_in_memory().unwrap();
    let chips = SqliteChipDao::new(&conn);
    let pets = SqlitePetDao::new(&conn);

    let stored_chip = chips.create(&chip("CHIP-001")).unwrap();
    let created = pets.create(&pet("Rex").with_chip(stored_chip)).unwrap();
    let pet_id = created.id.unwrap();

    pets.delete(pet_id).unwrap();
    let tombstone = pets.find(pet_id, true).unwrap().unwrap();
    assert!(tombstone.is_deleted);
    assert_eq!(tombstone.chip, None);

    pets.restore(pet_id).unwrap();
    assert_eq!(pets.read(pet_id).unwrap().unwrap(), created);
}

#[test]
fn pet_update_overwrites_row_including_flag() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetDao::new(&conn);
    let mut created = pets.create(&pet("Rex")).unwrap();

    created.breed = "Golden".to_string();
    created.birth_date = None;
    pets.update(&created).unwrap();
    assert_eq!(pets.read(created.id.unwrap()).unwrap().unwrap(), created);

    created.is_deleted = true;
    pets.update(&created).unwrap();
    assert!(pets.read(created.id.unwrap()).unwrap().is_none());

    let mut ghost = pet("Ghost");
    ghost.id = Some(9_999);
    pets.update(&ghost).unwrap();
    assert!(pets.read_all().unwrap().is_empty());
}

#[test]
fn two_pets_cannot_share_a_chip() {
    let conn = open_db_in_memory().unwrap();
    let chips = SqliteChipDao::new(&conn);
    let pets = SqlitePetDao::new(&conn);

    let stored_chip = chips.create(&chip("CHIP-001")).unwrap();
    pets.create(&pet("Rex").with_chip(stored_chip.clone())).unwrap();
    let err = pets.create(&pet("Luna").with_chip(stored_chip)).unwrap_err();
    assert!(matches!(err, PersistenceError::UniqueViolation(_)));
}
