//! Store configuration passed in by the composition root.

use std::path::{Path, PathBuf};

/// File name used when the store is configured from a directory.
pub const DEFAULT_DB_FILE_NAME: &str = "geomarks.sqlite3";

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

impl DbLocation {
    pub(crate) fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: DbLocation,
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
        }
    }

    /// Uses `<dir>/geomarks.sqlite3`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::file(dir.as_ref().join(DEFAULT_DB_FILE_NAME))
    }

    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
        }
    }
}
