//! Async storage service owning the single shared database handle.
//!
//! # Responsibility
//! - Open the database and apply the schema exactly once per store.
//! - Run repository calls off the async executor on tokio's blocking pool.
//!
//! # Invariants
//! - Concurrent `init()` callers await the same in-flight initialization and
//!   observe the same `DbHandle`.
//! - Operations invoked before `init()` completed fail with
//!   `StoreError::Unavailable`; they never trigger initialization.
//! - Each operation runs to completion once issued; there is no timeout or
//!   cancellation of the blocking work.

mod config;

pub use config::{DbLocation, StoreConfig, DEFAULT_DB_FILE_NAME};

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::marker::{Marker, MarkerDetails, MarkerId, NewMarker};
use crate::model::marker_image::{ImageId, MarkerImage, NewMarkerImage};
use crate::repo::image_repo::{MarkerImageRepository, SqliteMarkerImageRepository};
use crate::repo::marker_repo::{MarkerRepository, SqliteMarkerRepository};
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::OnceCell;

/// The single open connection shared by every operation of a store.
pub type DbHandle = Arc<Mutex<Connection>>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Database could not be opened or the schema could not be applied.
    Initialization(DbError),
    /// Operation called before initialization completed.
    Unavailable,
    Repo(RepoError),
    /// Blocking task panicked or was aborted.
    Join(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialization(err) => write!(f, "database initialization failed: {err}"),
            Self::Unavailable => write!(f, "storage is not initialized"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Join(message) => write!(f, "storage task failed: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Initialization(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Unavailable | Self::Join(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Unavailable => Self::Unavailable,
            other => Self::Repo(other),
        }
    }
}

/// Async marker storage service.
///
/// Constructed explicitly by the application's composition root and shared
/// through `Arc`; there is no process-global instance.
pub struct MarkerStore {
    config: StoreConfig,
    handle: OnceCell<DbHandle>,
    open_attempts: AtomicUsize,
}

impl MarkerStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
            open_attempts: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Opens the database and applies the schema on first call.
    ///
    /// Later and concurrent calls resolve to the same handle. A failed
    /// initialization leaves the store uninitialized; calling `init()` again
    /// makes a fresh attempt.
    pub async fn init(&self) -> StoreResult<DbHandle> {
        let handle = self.handle.get_or_try_init(|| self.open_handle()).await?;
        Ok(Arc::clone(handle))
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    /// Number of times this store has run the open + schema pass.
    pub fn open_attempts(&self) -> usize {
        self.open_attempts.load(Ordering::SeqCst)
    }

    pub async fn create_marker(&self, marker: NewMarker) -> StoreResult<Marker> {
        self.with_connection("marker_create", move |conn| {
            SqliteMarkerRepository::try_new(conn)?.create_marker(&marker)
        })
        .await
    }

    /// Deletes the marker and its images; missing ids are not an error.
    pub async fn delete_marker(&self, id: MarkerId) -> StoreResult<()> {
        self.with_connection("marker_delete", move |conn| {
            SqliteMarkerRepository::try_new(conn)?.delete_marker(id)
        })
        .await
    }

    pub async fn list_markers(&self) -> StoreResult<Vec<Marker>> {
        self.with_connection("marker_list", |conn| {
            SqliteMarkerRepository::try_new(conn)?.list_markers()
        })
        .await
    }

    pub async fn get_marker(&self, id: MarkerId) -> StoreResult<Option<Marker>> {
        self.with_connection("marker_get", move |conn| {
            SqliteMarkerRepository::try_new(conn)?.get_marker(id)
        })
        .await
    }

    pub async fn count_markers(&self) -> StoreResult<u64> {
        self.with_connection("marker_count", |conn| {
            SqliteMarkerRepository::try_new(conn)?.count_markers()
        })
        .await
    }

    pub async fn create_image(&self, image: NewMarkerImage) -> StoreResult<MarkerImage> {
        self.with_connection("image_create", move |conn| {
            SqliteMarkerImageRepository::try_new(conn)?.create_image(&image)
        })
        .await
    }

    pub async fn delete_image(&self, id: ImageId) -> StoreResult<()> {
        self.with_connection("image_delete", move |conn| {
            SqliteMarkerImageRepository::try_new(conn)?.delete_image(id)
        })
        .await
    }

    pub async fn list_images_by_marker(
        &self,
        marker_id: MarkerId,
    ) -> StoreResult<Vec<MarkerImage>> {
        self.with_connection("image_list", move |conn| {
            SqliteMarkerImageRepository::try_new(conn)?.list_images_by_marker(marker_id)
        })
        .await
    }

    /// Loads a marker together with its images under one lock acquisition.
    pub async fn marker_details(&self, id: MarkerId) -> StoreResult<Option<MarkerDetails>> {
        self.with_connection("marker_details", move |conn| {
            let Some(marker) = SqliteMarkerRepository::try_new(conn)?.get_marker(id)? else {
                return Ok(None);
            };
            let images = SqliteMarkerImageRepository::try_new(conn)?.list_images_by_marker(id)?;
            Ok(Some(MarkerDetails { marker, images }))
        })
        .await
    }

    async fn open_handle(&self) -> StoreResult<DbHandle> {
        self.open_attempts.fetch_add(1, Ordering::SeqCst);
        let started_at = Instant::now();
        let location = self.config.location.clone();
        info!(
            "event=store_init module=store status=start mode={}",
            location.mode()
        );

        let opened = tokio::task::spawn_blocking(move || match location {
            DbLocation::File(path) => open_db(path),
            DbLocation::Memory => open_db_in_memory(),
        })
        .await
        .map_err(|err| StoreError::Join(err.to_string()))?;

        match opened {
            Ok(conn) => {
                info!(
                    "event=store_init module=store status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Arc::new(Mutex::new(conn)))
            }
            Err(err) => {
                error!(
                    "event=store_init module=store status=error duration_ms={} error_code=store_init_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StoreError::Initialization(err))
            }
        }
    }

    async fn with_connection<T, F>(&self, op: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
    {
        let Some(handle) = self.handle.get().cloned() else {
            error!("event={op} module=store status=error error_code=storage_unavailable");
            return Err(StoreError::Unavailable);
        };
        let started_at = Instant::now();

        let result = tokio::task::spawn_blocking(move || {
            // A panic inside a previous statement leaves the connection usable.
            let conn = handle.lock().unwrap_or_else(PoisonError::into_inner);
            f(&*conn)
        })
        .await
        .map_err(|err| StoreError::Join(err.to_string()))?;

        match result {
            Ok(value) => {
                debug!(
                    "event={op} module=store status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event={op} module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}
