//! Runtime configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read once, lazily; variables
//! already set in the process environment take precedence.

use crate::db::SqliteFileProvider;
use crate::logging::default_log_level;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_VAR: &str = "VETCLINIC_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "VETCLINIC_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "VETCLINIC_LOG_DIR";

const DEFAULT_DB_PATH: &str = "vetclinic.db";
const DEFAULT_LOG_SUBDIR: &str = "logs";

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is set but empty")]
    Empty(&'static str),
    #[error("`VETCLINIC_LOG_DIR` must be an absolute path, got `{0}`")]
    RelativeLogDir(String),
    #[error("cannot resolve working directory: {0}")]
    WorkingDirectory(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Reads configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = match read_var(&lookup, DB_PATH_VAR)? {
            Some(value) => PathBuf::from(value),
            None => PathBuf::from(DEFAULT_DB_PATH),
        };

        let log_level = read_var(&lookup, LOG_LEVEL_VAR)?
            .unwrap_or_else(|| default_log_level().to_string());

        let log_dir = match read_var(&lookup, LOG_DIR_VAR)? {
            Some(value) => {
                let path = PathBuf::from(&value);
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeLogDir(value));
                }
                path
            }
            None => env::current_dir()?.join(DEFAULT_LOG_SUBDIR),
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    /// Connection capability for the configured database file.
    pub fn provider(&self) -> SqliteFileProvider {
        SqliteFileProvider::new(self.db_path.clone())
    }
}

fn read_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}
