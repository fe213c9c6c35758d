//! Marker repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/delete/list/get APIs over `markers` storage.
//! - Remove a marker's images together with the marker.
//!
//! # Invariants
//! - Deletes are idempotent; deleting a missing id is not an error.
//! - `list_markers` is ordered by ascending `id`.

use super::{decode_column, ensure_connection_ready, RepoError, RepoResult};
use crate::model::marker::{Coordinate, Marker, MarkerId, NewMarker};
use rusqlite::{params, Connection, Row};

const MARKER_COLUMNS: &str = "id, latitude, longitude, title, description, created_at";

/// Repository interface for marker operations.
pub trait MarkerRepository {
    fn create_marker(&self, marker: &NewMarker) -> RepoResult<Marker>;
    fn delete_marker(&self, id: MarkerId) -> RepoResult<()>;
    fn list_markers(&self) -> RepoResult<Vec<Marker>>;
    fn get_marker(&self, id: MarkerId) -> RepoResult<Option<Marker>>;
    fn count_markers(&self) -> RepoResult<u64>;
}

/// SQLite-backed marker repository.
pub struct SqliteMarkerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMarkerRepository<'conn> {
    /// Wraps a connection that has been through the schema initializer.
    ///
    /// # Errors
    /// - `RepoError::Unavailable` when the marker tables are missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MarkerRepository for SqliteMarkerRepository<'_> {
    fn create_marker(&self, marker: &NewMarker) -> RepoResult<Marker> {
        marker.validate()?;

        let mut stmt = self
            .conn
            .prepare(&format!(
                "INSERT INTO markers (latitude, longitude, title, description)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {MARKER_COLUMNS};"
            ))
            .map_err(RepoError::write)?;
        let mut rows = stmt
            .query(params![
                marker.coordinate.latitude,
                marker.coordinate.longitude,
                marker.title.as_str(),
                marker.description.as_str(),
            ])
            .map_err(RepoError::write)?;

        let Some(row) = rows.next().map_err(RepoError::write)? else {
            return Err(RepoError::Decode(
                "insert into markers returned no row".to_string(),
            ));
        };
        decode_marker_row(row)
    }

    fn delete_marker(&self, id: MarkerId) -> RepoResult<()> {
        // Images reference markers without a foreign key, so the cascade
        // lives here and shares the marker delete's transaction.
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(RepoError::write)?;
        tx.execute("DELETE FROM marker_images WHERE marker_id = ?1;", [id])
            .map_err(RepoError::write)?;
        tx.execute("DELETE FROM markers WHERE id = ?1;", [id])
            .map_err(RepoError::write)?;
        tx.commit().map_err(RepoError::write)?;
        Ok(())
    }

    fn list_markers(&self) -> RepoResult<Vec<Marker>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {MARKER_COLUMNS} FROM markers ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut markers = Vec::new();

        while let Some(row) = rows.next()? {
            markers.push(decode_marker_row(row)?);
        }

        Ok(markers)
    }

    fn get_marker(&self, id: MarkerId) -> RepoResult<Option<Marker>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {MARKER_COLUMNS} FROM markers WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(decode_marker_row(row)?));
        }

        Ok(None)
    }

    fn count_markers(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM markers;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::Decode(format!("negative marker count `{count}`")))
    }
}

fn decode_marker_row(row: &Row<'_>) -> RepoResult<Marker> {
    Ok(Marker {
        id: decode_column(row, "markers", "id")?,
        coordinate: Coordinate {
            latitude: decode_column(row, "markers", "latitude")?,
            longitude: decode_column(row, "markers", "longitude")?,
        },
        title: decode_column(row, "markers", "title")?,
        description: decode_column(row, "markers", "description")?,
        created_at: decode_column(row, "markers", "created_at")?,
    })
}
