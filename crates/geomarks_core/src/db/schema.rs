//! Marker schema definition and readiness checks.
//!
//! # Responsibility
//! - Create `markers` and `marker_images` tables on first access.
//! - Answer whether a connection already carries the full schema.
//!
//! # Invariants
//! - `apply_schema` is safe to run any number of times on the same file.
//! - Both tables are created in one transaction; a failure leaves neither.

use crate::db::DbResult;
use rusqlite::{Connection, OptionalExtension};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Required columns per table, checked by [`is_initialized`].
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "markers",
        &[
            "id",
            "latitude",
            "longitude",
            "title",
            "description",
            "created_at",
        ],
    ),
    ("marker_images", &["id", "marker_id", "uri", "created_at"]),
];

/// Applies the marker schema on the provided connection.
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.commit()?;
    Ok(())
}

/// Returns whether every table and column the repositories rely on exists.
pub fn is_initialized(conn: &Connection) -> DbResult<bool> {
    for (table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Ok(false);
        }
        for column in *columns {
            if !table_has_column(conn, table, column)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2;",
            [table, column],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}
