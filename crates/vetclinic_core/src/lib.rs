//! Core persistence and service layer for clinic pet and chip records.
//! This crate owns the pet/chip invariants: chip-then-pet write order,
//! all-or-nothing multi-table writes and logical deletion.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use db::{
    open_db, open_db_in_memory, ConnectionProvider, DbError, SqliteFileProvider,
    TransactionError, TransactionManager, TransactionState, TransactionStateError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::chip::{Chip, ChipId};
pub use model::pet::{Pet, PetId};
pub use model::ValidationError;
pub use repo::chip_dao::SqliteChipDao;
pub use repo::pet_dao::SqlitePetDao;
pub use repo::{GenericDao, PersistenceError, RepoResult};
pub use service::chip_service::ChipService;
pub use service::pet_service::PetService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
