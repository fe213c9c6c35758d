//! Marker image repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `marker_id` is stored as given; no existence check at write time.
//! - Listing returns only rows of the requested marker, in insertion order.

use super::{decode_column, ensure_connection_ready, RepoError, RepoResult};
use crate::model::marker::MarkerId;
use crate::model::marker_image::{ImageId, MarkerImage, NewMarkerImage};
use rusqlite::{params, Connection, Row};

const IMAGE_COLUMNS: &str = "id, marker_id, uri, created_at";

/// Repository interface for marker image operations.
pub trait MarkerImageRepository {
    fn create_image(&self, image: &NewMarkerImage) -> RepoResult<MarkerImage>;
    fn delete_image(&self, id: ImageId) -> RepoResult<()>;
    fn list_images_by_marker(&self, marker_id: MarkerId) -> RepoResult<Vec<MarkerImage>>;
}

/// SQLite-backed marker image repository.
pub struct SqliteMarkerImageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMarkerImageRepository<'conn> {
    /// Wraps a connection that has been through the schema initializer.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MarkerImageRepository for SqliteMarkerImageRepository<'_> {
    fn create_image(&self, image: &NewMarkerImage) -> RepoResult<MarkerImage> {
        image.validate()?;

        let mut stmt = self
            .conn
            .prepare(&format!(
                "INSERT INTO marker_images (marker_id, uri)
                 VALUES (?1, ?2)
                 RETURNING {IMAGE_COLUMNS};"
            ))
            .map_err(RepoError::write)?;
        let mut rows = stmt
            .query(params![image.marker_id, image.uri.as_str()])
            .map_err(RepoError::write)?;

        let Some(row) = rows.next().map_err(RepoError::write)? else {
            return Err(RepoError::Decode(
                "insert into marker_images returned no row".to_string(),
            ));
        };
        decode_image_row(row)
    }

    fn delete_image(&self, id: ImageId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM marker_images WHERE id = ?1;", [id])
            .map_err(RepoError::write)?;
        Ok(())
    }

    fn list_images_by_marker(&self, marker_id: MarkerId) -> RepoResult<Vec<MarkerImage>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {IMAGE_COLUMNS}
             FROM marker_images
             WHERE marker_id = ?1
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([marker_id])?;
        let mut images = Vec::new();

        while let Some(row) = rows.next()? {
            images.push(decode_image_row(row)?);
        }

        Ok(images)
    }
}

fn decode_image_row(row: &Row<'_>) -> RepoResult<MarkerImage> {
    Ok(MarkerImage {
        id: decode_column(row, "marker_images", "id")?,
        marker_id: decode_column(row, "marker_images", "marker_id")?,
        uri: decode_column(row, "marker_images", "uri")?,
        created_at: decode_column(row, "marker_images", "created_at")?,
    })
}
