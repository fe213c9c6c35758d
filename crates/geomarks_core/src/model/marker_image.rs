//! Marker image model.
//!
//! The database keeps only the URI returned by the media picker; image bytes
//! live outside of storage.

use super::marker::MarkerId;
use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Storage-assigned image identifier.
pub type ImageId = i64;

/// Insert shape for a marker image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMarkerImage {
    pub marker_id: MarkerId,
    pub uri: String,
}

impl NewMarkerImage {
    pub fn new(marker_id: MarkerId, uri: impl Into<String>) -> Self {
        Self {
            marker_id,
            uri: uri.into(),
        }
    }

    /// `marker_id` is not checked against existing markers.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.uri.trim().is_empty() {
            return Err(ValidationError::EmptyUri);
        }
        Ok(())
    }
}

/// Stored marker image record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerImage {
    pub id: ImageId,
    pub marker_id: MarkerId,
    pub uri: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}
