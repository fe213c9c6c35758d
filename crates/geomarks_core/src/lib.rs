//! Core persistence for GeoMarks: map markers and their photos.
//! This crate is the single source of truth for the marker data contract.

pub mod db;
pub mod logging;
pub mod model;
pub mod provider;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::marker::{Coordinate, Marker, MarkerDetails, MarkerId, NewMarker};
pub use model::marker_image::{ImageId, MarkerImage, NewMarkerImage};
pub use model::ValidationError;
pub use provider::{use_database, DatabaseProvider, ProviderError, ProviderStatus};
pub use repo::image_repo::{MarkerImageRepository, SqliteMarkerImageRepository};
pub use repo::marker_repo::{MarkerRepository, SqliteMarkerRepository};
pub use repo::{RepoError, RepoResult};
pub use service::marker_service::MarkerService;
pub use store::{DbHandle, DbLocation, MarkerStore, StoreConfig, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
