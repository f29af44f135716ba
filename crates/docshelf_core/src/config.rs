//! Store and logging configuration.
//!
//! # Responsibility
//! - Load the store endpoint, database name and collection name from the
//!   environment, falling back to defaults.
//! - Validate names before they reach file paths or SQL parameters.
//!
//! # Invariants
//! - Loading configuration never panics; bad values become `ConfigError`.
//! - Endpoint schemes are `sqlite://<dir>`, `sqlite::memory:` and `memory:`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENDPOINT_ENV: &str = "DOCSHELF_ENDPOINT";
pub const DATABASE_ENV: &str = "DOCSHELF_DATABASE";
pub const COLLECTION_ENV: &str = "DOCSHELF_COLLECTION";
pub const LOG_LEVEL_ENV: &str = "DOCSHELF_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "DOCSHELF_LOG_DIR";

pub const DEFAULT_ENDPOINT: &str = "sqlite://./docshelf-data";
pub const DEFAULT_DATABASE: &str = "experiment_11_db";
pub const DEFAULT_COLLECTION: &str = "products";

const SQLITE_DIR_PREFIX: &str = "sqlite://";
const SQLITE_MEMORY: &str = "sqlite::memory:";
const MEMORY: &str = "memory:";
const SQLITE_FILE_EXTENSION: &str = "sqlite3";

static DATABASE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("database name pattern is valid"));
static COLLECTION_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]{0,119}$").expect("collection name pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidEndpoint(String),
    InvalidDatabaseName(String),
    InvalidCollectionName(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEndpoint(value) => write!(
                f,
                "unsupported endpoint `{value}`; expected sqlite://<dir>|sqlite::memory:|memory:"
            ),
            Self::InvalidDatabaseName(value) => write!(f, "invalid database name `{value}`"),
            Self::InvalidCollectionName(value) => write!(f, "invalid collection name `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Where documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// SQLite file `<dir>/<database>.sqlite3`; `dir` must exist.
    SqliteDir(PathBuf),
    /// Private in-memory SQLite database.
    SqliteMemory,
    /// In-process store without SQLite.
    Memory,
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            SQLITE_MEMORY => Ok(Self::SqliteMemory),
            MEMORY => Ok(Self::Memory),
            _ => match trimmed.strip_prefix(SQLITE_DIR_PREFIX) {
                Some(dir) if !dir.is_empty() => Ok(Self::SqliteDir(PathBuf::from(dir))),
                _ => Err(ConfigError::InvalidEndpoint(trimmed.to_string())),
            },
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SqliteDir(dir) => write!(f, "{SQLITE_DIR_PREFIX}{}", dir.display()),
            Self::SqliteMemory => f.write_str(SQLITE_MEMORY),
            Self::Memory => f.write_str(MEMORY),
        }
    }
}

/// Connection endpoint plus the two naming values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub endpoint: Endpoint,
    pub database: String,
    pub collection: String,
}

impl StoreConfig {
    /// Builds a validated configuration.
    pub fn new(endpoint: &str, database: &str, collection: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: endpoint.parse()?,
            database: validate_database_name(database)?,
            collection: validate_collection_name(collection)?,
        })
    }

    /// Reads `DOCSHELF_ENDPOINT`, `DOCSHELF_DATABASE` and
    /// `DOCSHELF_COLLECTION`, using defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = lookup(ENDPOINT_ENV).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let database = lookup(DATABASE_ENV).unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let collection = lookup(COLLECTION_ENV).unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
        Self::new(&endpoint, &database, &collection)
    }

    pub fn database_file_name(&self) -> String {
        format!("{}.{SQLITE_FILE_EXTENSION}", self.database)
    }

    /// Database file location for directory endpoints.
    pub fn database_path(&self) -> Option<PathBuf> {
        match &self.endpoint {
            Endpoint::SqliteDir(dir) => Some(dir.join(self.database_file_name())),
            Endpoint::SqliteMemory | Endpoint::Memory => None,
        }
    }
}

/// Logging settings; validation happens in `init_logging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub log_dir: Option<String>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            level: lookup(LOG_LEVEL_ENV)
                .unwrap_or_else(|| crate::logging::default_log_level().to_string()),
            log_dir: lookup(LOG_DIR_ENV).filter(|dir| !dir.trim().is_empty()),
        }
    }
}

fn validate_database_name(name: &str) -> Result<String, ConfigError> {
    let trimmed = name.trim();
    if DATABASE_NAME_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidDatabaseName(trimmed.to_string()))
    }
}

fn validate_collection_name(name: &str) -> Result<String, ConfigError> {
    let trimmed = name.trim();
    if COLLECTION_NAME_RE.is_match(trimmed) && !trimmed.starts_with("system.") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidCollectionName(trimmed.to_string()))
    }
}
