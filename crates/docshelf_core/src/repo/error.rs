//! Repository and store error type.

use crate::db::DbError;
use crate::model::document::DocumentValidationError;
use crate::model::path::PathError;
use crate::store::update::UpdateError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for document persistence and query operations.
///
/// Absence of a document is not an error; lookups return `Option`.
#[derive(Debug)]
pub enum RepoError {
    /// The store could not be opened or bootstrapped.
    StoreUnavailable(DbError),
    /// A store primitive failed after the store was opened.
    Db(DbError),
    Validation(DocumentValidationError),
    InvalidPath(PathError),
    InvalidUpdate(UpdateError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable(err) => write!(f, "document store unavailable: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidPath(err) => write!(f, "{err}"),
            Self::InvalidUpdate(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) | Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidPath(err) => Some(err),
            Self::InvalidUpdate(err) => Some(err),
            Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DocumentValidationError> for RepoError {
    fn from(value: DocumentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PathError> for RepoError {
    fn from(value: PathError) -> Self {
        Self::InvalidPath(value)
    }
}

impl From<UpdateError> for RepoError {
    fn from(value: UpdateError) -> Self {
        Self::InvalidUpdate(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
