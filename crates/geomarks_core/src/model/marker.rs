//! Marker domain model.
//!
//! # Responsibility
//! - Define the stored marker record and its insert shape.
//! - Build the default marker produced by a map long-press.
//!
//! # Invariants
//! - `id` and `created_at` are assigned by storage, never by callers.
//! - Coordinates must be finite; ranges are not checked.

use super::marker_image::MarkerImage;
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Storage-assigned marker identifier (SQLite rowid).
pub type MarkerId = i64;

/// Timestamp format used in the default marker description.
pub const PLACED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Rejects NaN and infinite components.
    ///
    /// SQLite stores NaN as NULL, which would make the row undecodable later.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.latitude.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate {
                field: "latitude",
                value: self.latitude,
            });
        }
        if !self.longitude.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate {
                field: "longitude",
                value: self.longitude,
            });
        }
        Ok(())
    }
}

/// Insert shape for a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMarker {
    pub coordinate: Coordinate,
    pub title: String,
    pub description: String,
}

impl NewMarker {
    pub fn new(
        coordinate: Coordinate,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            coordinate,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Builds the marker a long-press on the map creates.
    ///
    /// `ordinal` is the 1-based position the marker will take in the list,
    /// `added_at` is rendered into the description.
    pub fn placed_at(
        coordinate: Coordinate,
        ordinal: u64,
        added_at: chrono::NaiveDateTime,
    ) -> Self {
        Self::new(
            coordinate,
            format!("Marker {ordinal}"),
            format!("Added: {}", added_at.format(PLACED_AT_FORMAT)),
        )
    }

    /// Empty titles and descriptions are accepted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.coordinate.validate()
    }
}

/// Stored marker record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub coordinate: Coordinate,
    pub title: String,
    pub description: String,
    /// SQLite `CURRENT_TIMESTAMP` text, UTC.
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl Marker {
    /// Returns the insert fields of this record.
    pub fn to_new(&self) -> NewMarker {
        NewMarker::new(self.coordinate, self.title.clone(), self.description.clone())
    }
}

/// Read model for the marker detail screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetails {
    pub marker: Marker,
    pub images: Vec<MarkerImage>,
}
