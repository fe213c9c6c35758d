//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Own the application composition root (runtime, store, provider).
//! - Expose marker/image operations and storage status to Dart via FRB.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage operations before `init_storage` return a failure envelope.
//! - User text (titles, descriptions, URIs) is never logged here.

use geomarks_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Coordinate, DatabaseProvider, Marker, MarkerImage, MarkerService, MarkerStore, NewMarker,
    NewMarkerImage, StoreConfig,
};
use log::{error, info};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Runtime;

static APP_ROOT: OnceLock<AppRoot> = OnceLock::new();

/// Process-wide composition root built by `init_storage`.
struct AppRoot {
    db_dir: PathBuf,
    runtime: Runtime,
    provider: Arc<DatabaseProvider>,
    service: MarkerService,
}

impl AppRoot {
    fn build(db_dir: &Path) -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("geomarks-storage")
            .build()
            .map_err(|err| format!("failed to start storage runtime: {err}"))?;
        let store = Arc::new(MarkerStore::new(StoreConfig::from_dir(db_dir)));
        Ok(Self {
            db_dir: db_dir.to_path_buf(),
            runtime,
            provider: Arc::new(DatabaseProvider::new(Arc::clone(&store))),
            service: MarkerService::new(store),
        })
    }

    fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Builds the storage root in `db_dir` and initializes the database.
///
/// # FFI contract
/// - Sync call; blocks until the schema is in place or initialization fails.
/// - The first successful root is kept for the process; a later call with a
///   different directory is rejected.
/// - A failed initialization can be retried by calling again.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_storage(db_dir: String) -> String {
    let trimmed = db_dir.trim();
    if trimmed.is_empty() {
        return "db_dir cannot be empty".to_string();
    }
    let db_dir = PathBuf::from(trimmed);

    let root = match APP_ROOT.get() {
        Some(root) => root,
        None => match AppRoot::build(&db_dir) {
            // Losing a concurrent `set` race drops our root; the winner is used.
            Ok(root) => APP_ROOT.get_or_init(|| root),
            Err(err) => return err,
        },
    };

    if root.db_dir != db_dir {
        return format!(
            "storage already initialized at `{}`; refusing to switch to `{}`",
            root.db_dir.display(),
            db_dir.display()
        );
    }

    match root.block_on(root.provider.start()) {
        Ok(()) => {
            info!("event=ffi_init_storage module=ffi status=ok");
            String::new()
        }
        Err(err) => {
            error!(
                "event=ffi_init_storage module=ffi status=error error={}",
                err
            );
            err.to_string()
        }
    }
}

/// Initialization status for UI branching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStatusResponse {
    /// True until initialization finished (also before `init_storage`).
    pub is_loading: bool,
    /// Initialization failure message, if any.
    pub error: Option<String>,
}

#[flutter_rust_bridge::frb(sync)]
pub fn storage_status() -> StorageStatusResponse {
    match APP_ROOT.get() {
        Some(root) => StorageStatusResponse {
            is_loading: root.provider.is_loading(),
            error: root.provider.error(),
        },
        None => StorageStatusResponse {
            is_loading: true,
            error: None,
        },
    }
}

/// Marker projection for Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerItem {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub description: String,
    /// UTC `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
}

/// Marker image projection for Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub id: i64,
    pub marker_id: i64,
    pub uri: String,
    pub created_at: String,
}

/// Envelope for single-marker results (`marker` is `None` when not found).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerResponse {
    pub ok: bool,
    pub marker: Option<MarkerItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerListResponse {
    pub ok: bool,
    pub items: Vec<MarkerItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResponse {
    pub ok: bool,
    pub image: Option<ImageItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageListResponse {
    pub ok: bool,
    pub items: Vec<ImageItem>,
    pub message: String,
}

/// Detail screen envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDetailsResponse {
    pub ok: bool,
    pub marker: Option<MarkerItem>,
    pub images: Vec<ImageItem>,
    pub message: String,
}

/// Envelope for operations without payload (deletes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

/// Creates a marker with caller-provided fields.
#[flutter_rust_bridge::frb(sync)]
pub fn marker_add(
    latitude: f64,
    longitude: f64,
    title: String,
    description: String,
) -> MarkerResponse {
    let marker = NewMarker::new(Coordinate::new(latitude, longitude), title, description);
    let result = with_root(|root| root.block_on(root.provider.add_marker(marker)));
    marker_response("marker_add", result.map(Some), "Marker created.")
}

/// Creates the default `Marker N` marker for a map long-press.
#[flutter_rust_bridge::frb(sync)]
pub fn marker_place(latitude: f64, longitude: f64) -> MarkerResponse {
    let coordinate = Coordinate::new(latitude, longitude);
    let result = with_root(|root| root.block_on(root.service.place_marker(coordinate)));
    marker_response("marker_place", result.map(Some), "Marker placed.")
}

/// Deletes a marker and its images; unknown ids succeed.
#[flutter_rust_bridge::frb(sync)]
pub fn marker_delete(id: i64) -> ActionResponse {
    let result = with_root(|root| root.block_on(root.provider.delete_marker(id)));
    action_response("marker_delete", result, "Marker deleted.")
}

/// Lists all markers ordered by id.
#[flutter_rust_bridge::frb(sync)]
pub fn marker_list() -> MarkerListResponse {
    match with_root(|root| root.block_on(root.provider.get_markers())) {
        Ok(markers) => MarkerListResponse {
            ok: true,
            message: format!("Found {} marker(s).", markers.len()),
            items: markers.into_iter().map(to_marker_item).collect(),
        },
        Err(err) => MarkerListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("marker_list failed: {err}"),
        },
    }
}

/// Gets one marker; a missing id is `ok` with `marker = None`.
#[flutter_rust_bridge::frb(sync)]
pub fn marker_get(id: i64) -> MarkerResponse {
    let result = with_root(|root| root.block_on(root.provider.get_marker_by_id(id)));
    marker_response("marker_get", result, "Marker loaded.")
}

/// Loads a marker with its images for the detail screen.
#[flutter_rust_bridge::frb(sync)]
pub fn marker_details(id: i64) -> MarkerDetailsResponse {
    match with_root(|root| root.block_on(root.service.marker_details(id))) {
        Ok(Some(details)) => MarkerDetailsResponse {
            ok: true,
            marker: Some(to_marker_item(details.marker)),
            images: details.images.into_iter().map(to_image_item).collect(),
            message: "Marker loaded.".to_string(),
        },
        Ok(None) => MarkerDetailsResponse {
            ok: true,
            marker: None,
            images: Vec::new(),
            message: "Marker not found.".to_string(),
        },
        Err(err) => MarkerDetailsResponse {
            ok: false,
            marker: None,
            images: Vec::new(),
            message: format!("marker_details failed: {err}"),
        },
    }
}

/// Stores an image URI returned by the media picker.
#[flutter_rust_bridge::frb(sync)]
pub fn image_add(marker_id: i64, uri: String) -> ImageResponse {
    match with_root(|root| root.block_on(root.service.attach_image(marker_id, uri))) {
        Ok(image) => ImageResponse {
            ok: true,
            image: Some(to_image_item(image)),
            message: "Image added.".to_string(),
        },
        Err(err) => ImageResponse {
            ok: false,
            image: None,
            message: format!("image_add failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn image_delete(id: i64) -> ActionResponse {
    let result = with_root(|root| root.block_on(root.provider.delete_image(id)));
    action_response("image_delete", result, "Image deleted.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn image_list(marker_id: i64) -> ImageListResponse {
    match with_root(|root| root.block_on(root.provider.get_marker_images(marker_id))) {
        Ok(images) => ImageListResponse {
            ok: true,
            message: format!("Found {} image(s).", images.len()),
            items: images.into_iter().map(to_image_item).collect(),
        },
        Err(err) => ImageListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("image_list failed: {err}"),
        },
    }
}

fn with_root<T, E: ToString>(f: impl FnOnce(&AppRoot) -> Result<T, E>) -> Result<T, String> {
    let root = APP_ROOT
        .get()
        .ok_or_else(|| "storage is not initialized; call init_storage first".to_string())?;
    f(root).map_err(|err| err.to_string())
}

fn marker_response(
    op: &str,
    result: Result<Option<Marker>, String>,
    success: &str,
) -> MarkerResponse {
    match result {
        Ok(Some(marker)) => MarkerResponse {
            ok: true,
            marker: Some(to_marker_item(marker)),
            message: success.to_string(),
        },
        Ok(None) => MarkerResponse {
            ok: true,
            marker: None,
            message: "Marker not found.".to_string(),
        },
        Err(err) => MarkerResponse {
            ok: false,
            marker: None,
            message: format!("{op} failed: {err}"),
        },
    }
}

fn action_response(op: &str, result: Result<(), String>, success: &str) -> ActionResponse {
    match result {
        Ok(()) => ActionResponse {
            ok: true,
            message: success.to_string(),
        },
        Err(err) => ActionResponse {
            ok: false,
            message: format!("{op} failed: {err}"),
        },
    }
}

fn to_marker_item(marker: Marker) -> MarkerItem {
    MarkerItem {
        id: marker.id,
        latitude: marker.coordinate.latitude,
        longitude: marker.coordinate.longitude,
        title: marker.title,
        description: marker.description,
        created_at: marker.created_at,
    }
}

fn to_image_item(image: MarkerImage) -> ImageItem {
    ImageItem {
        id: image.id,
        marker_id: image.marker_id,
        uri: image.uri,
        created_at: image.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, image_add, image_delete, image_list, init_logging, init_storage,
        marker_add, marker_delete, marker_details, marker_get, marker_list, marker_place, ping,
        storage_status,
    };
    use std::path::PathBuf;
    use std::sync::OnceLock;

    static TEST_DB_DIR: OnceLock<PathBuf> = OnceLock::new();

    fn ensure_storage() {
        let dir = TEST_DB_DIR.get_or_init(|| {
            std::env::temp_dir().join(format!("geomarks-ffi-test-{}", std::process::id()))
        });
        let error = init_storage(dir.to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_storage_rejects_blank_dir() {
        assert!(!init_storage("   ".to_string()).is_empty());
    }

    #[test]
    fn init_storage_is_idempotent_and_reports_ready() {
        ensure_storage();
        ensure_storage();

        let status = storage_status();
        assert!(!status.is_loading);
        assert_eq!(status.error, None);
    }

    #[test]
    fn init_storage_refuses_a_second_directory() {
        ensure_storage();
        let error = init_storage("/definitely/another/dir".to_string());
        assert!(error.contains("refusing to switch"));
    }

    #[test]
    fn marker_add_get_delete_flow() {
        ensure_storage();

        let created = marker_add(58.0, 56.2, "A".to_string(), "d".to_string());
        assert!(created.ok, "{}", created.message);
        let marker = created.marker.expect("created marker");
        assert_eq!(marker.latitude, 58.0);

        let loaded = marker_get(marker.id);
        assert_eq!(loaded.marker, Some(marker.clone()));
        assert!(marker_list().items.iter().any(|item| item.id == marker.id));

        assert!(marker_delete(marker.id).ok);
        let missing = marker_get(marker.id);
        assert!(missing.ok);
        assert_eq!(missing.marker, None);
        assert!(marker_delete(marker.id).ok);
    }

    #[test]
    fn marker_add_rejects_nan_coordinates() {
        ensure_storage();

        let response = marker_add(f64::NAN, 0.0, "bad".to_string(), String::new());
        assert!(!response.ok);
        assert!(response.message.contains("latitude"));
    }

    #[test]
    fn marker_place_uses_default_title() {
        ensure_storage();

        let response = marker_place(58.007, 56.218);
        assert!(response.ok, "{}", response.message);
        let marker = response.marker.expect("placed marker");
        assert!(marker.title.starts_with("Marker "));
        assert!(marker.description.starts_with("Added: "));
    }

    #[test]
    fn image_flow_and_details() {
        ensure_storage();

        let marker = marker_add(1.0, 2.0, "photos".to_string(), String::new())
            .marker
            .expect("created marker");
        let image = image_add(marker.id, "file:///photo.jpg".to_string());
        assert!(image.ok, "{}", image.message);
        let image = image.image.expect("created image");

        let details = marker_details(marker.id);
        assert!(details.ok);
        assert_eq!(details.marker.map(|item| item.id), Some(marker.id));
        assert_eq!(details.images, vec![image.clone()]);

        assert!(image_delete(image.id).ok);
        assert!(image_list(marker.id).items.is_empty());
    }
}
