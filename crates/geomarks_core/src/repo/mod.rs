//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for markers and images.
//! - Isolate SQLite query details from the async store and services.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Read paths decode every column strictly and reject mismatches instead
//!   of masking them.
//! - Absence of a row is `Ok(None)`, never an error.

pub mod image_repo;
pub mod marker_repo;

use crate::db::{schema, DbError};
use crate::model::ValidationError;
use rusqlite::types::FromSql;
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by marker and image persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before reaching SQLite.
    Validation(ValidationError),
    /// Connection has not been through the schema initializer.
    Unavailable,
    /// Insert/delete statement failed (constraint, I/O).
    Write(DbError),
    /// Select statement failed.
    Query(DbError),
    /// A row did not match the expected column set or types.
    Decode(String),
}

impl RepoError {
    pub(crate) fn write(err: rusqlite::Error) -> Self {
        Self::Write(DbError::Sqlite(err))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unavailable => write!(f, "storage is not initialized"),
            Self::Write(err) => write!(f, "write failed: {err}"),
            Self::Query(err) => write!(f, "query failed: {err}"),
            Self::Decode(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Write(err) | Self::Query(err) => Some(err),
            Self::Unavailable | Self::Decode(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(DbError::Sqlite(value))
    }
}

/// Fails with `Unavailable` unless the marker schema is present.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    match schema::is_initialized(conn) {
        Ok(true) => Ok(()),
        Ok(false) => Err(RepoError::Unavailable),
        Err(err) => Err(RepoError::Query(err)),
    }
}

/// Reads one named column, turning missing columns and type mismatches into
/// `RepoError::Decode`.
pub(crate) fn decode_column<T: FromSql>(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> RepoResult<T> {
    row.get(column)
        .map_err(|err| RepoError::Decode(format!("{table}.{column}: {err}")))
}
