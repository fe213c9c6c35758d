//! Marker use-case service.
//!
//! # Responsibility
//! - Place a default marker from a map long-press.
//! - Attach a picked image URI to a marker.
//! - Load the marker detail read model.
//!
//! # Invariants
//! - Service APIs never bypass store validation/persistence contracts.
//! - Multi-step flows are not atomic; each step is its own statement.

use crate::model::marker::{Coordinate, Marker, MarkerDetails, MarkerId, NewMarker};
use crate::model::marker_image::{MarkerImage, NewMarkerImage};
use crate::store::{MarkerStore, StoreResult};
use std::sync::Arc;

/// Use-case service over a shared [`MarkerStore`].
#[derive(Clone)]
pub struct MarkerService {
    store: Arc<MarkerStore>,
}

impl MarkerService {
    pub fn new(store: Arc<MarkerStore>) -> Self {
        Self { store }
    }

    /// Creates the default marker for a map long-press at `coordinate`.
    ///
    /// # Contract
    /// - Title is `Marker {n}` where `n` is the current marker count + 1.
    /// - Description records the local time of placement.
    pub async fn place_marker(&self, coordinate: Coordinate) -> StoreResult<Marker> {
        let ordinal = self.store.count_markers().await? + 1;
        let added_at = chrono::Local::now().naive_local();
        self.store
            .create_marker(NewMarker::placed_at(coordinate, ordinal, added_at))
            .await
    }

    /// Stores a picked image URI for `marker_id`.
    ///
    /// Surrounding whitespace is trimmed; blank URIs are rejected.
    pub async fn attach_image(
        &self,
        marker_id: MarkerId,
        uri: impl Into<String>,
    ) -> StoreResult<MarkerImage> {
        let uri = uri.into();
        self.store
            .create_image(NewMarkerImage::new(marker_id, uri.trim()))
            .await
    }

    /// Returns `None` when the marker does not exist.
    pub async fn marker_details(&self, id: MarkerId) -> StoreResult<Option<MarkerDetails>> {
        self.store.marker_details(id).await
    }
}
