//! Domain model for map markers and their photos.
//!
//! # Responsibility
//! - Define canonical record shapes shared by repositories, store and FFI.
//! - Separate insert shapes (`New*`) from stored records carrying storage
//!   assigned identity.
//!
//! # Invariants
//! - Stored records are immutable; there is no update path.
//! - A `MarkerImage` belongs to exactly one marker via `marker_id`.

pub mod marker;
pub mod marker_image;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Write-side validation failures raised before any SQL runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Latitude or longitude is NaN or infinite.
    NonFiniteCoordinate { field: &'static str, value: f64 },
    /// Image URI is empty or whitespace only.
    EmptyUri,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteCoordinate { field, value } => {
                write!(f, "{field} must be a finite number, got {value}")
            }
            Self::EmptyUri => write!(f, "image uri cannot be empty"),
        }
    }
}

impl Error for ValidationError {}
