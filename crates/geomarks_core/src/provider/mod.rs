//! Access context exposing storage to UI collaborators.
//!
//! # Responsibility
//! - Drive store initialization and publish its status (`Loading`,
//!   `Ready`, `Failed`).
//! - Pass storage operations through unchanged.
//! - Make the provider reachable from any task running inside its scope.
//!
//! # Invariants
//! - No retry, caching or transformation happens here.
//! - `use_database()` outside a provider scope is a contract violation and
//!   returns `ProviderError::OutsideScope`.

use crate::model::marker::{Marker, MarkerId, NewMarker};
use crate::model::marker_image::{ImageId, MarkerImage, NewMarkerImage};
use crate::store::{MarkerStore, StoreError, StoreResult};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

tokio::task_local! {
    static DATABASE: Arc<DatabaseProvider>;
}

/// Initialization status observed by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Loading,
    Ready,
    /// Initialization failed; the message is the rendered `StoreError`.
    Failed(String),
}

#[derive(Debug)]
pub enum ProviderError {
    /// `use_database()` was called outside `DatabaseProvider::scope`.
    OutsideScope,
    Store(StoreError),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutsideScope => {
                write!(f, "use_database must be called within a DatabaseProvider scope")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutsideScope => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ProviderError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Storage access context handed to UI code.
pub struct DatabaseProvider {
    store: Arc<MarkerStore>,
    status: watch::Sender<ProviderStatus>,
}

impl DatabaseProvider {
    pub fn new(store: Arc<MarkerStore>) -> Self {
        let (status, _) = watch::channel(ProviderStatus::Loading);
        Self { store, status }
    }

    /// Initializes the underlying store and records the outcome.
    ///
    /// A failure is fatal for the session: status becomes `Failed` and no
    /// retry is scheduled.
    pub async fn start(&self) -> Result<(), ProviderError> {
        match self.store.init().await {
            Ok(_) => {
                info!("event=provider_start module=provider status=ok");
                self.status.send_replace(ProviderStatus::Ready);
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=provider_start module=provider status=error error_code=init_failed error={}",
                    err
                );
                self.status
                    .send_replace(ProviderStatus::Failed(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Runs `fut` with this provider installed as the task-local context.
    pub async fn scope<F: Future>(self: Arc<Self>, fut: F) -> F::Output {
        DATABASE.scope(self, fut).await
    }

    pub fn store(&self) -> &Arc<MarkerStore> {
        &self.store
    }

    pub fn status(&self) -> ProviderStatus {
        self.status.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.status.borrow(), ProviderStatus::Loading)
    }

    pub fn error(&self) -> Option<String> {
        match &*self.status.borrow() {
            ProviderStatus::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Receiver that observes every status transition.
    pub fn subscribe(&self) -> watch::Receiver<ProviderStatus> {
        self.status.subscribe()
    }

    pub async fn add_marker(&self, marker: NewMarker) -> StoreResult<Marker> {
        self.store.create_marker(marker).await
    }

    pub async fn delete_marker(&self, id: MarkerId) -> StoreResult<()> {
        self.store.delete_marker(id).await
    }

    pub async fn get_markers(&self) -> StoreResult<Vec<Marker>> {
        self.store.list_markers().await
    }

    pub async fn add_image(&self, image: NewMarkerImage) -> StoreResult<MarkerImage> {
        self.store.create_image(image).await
    }

    pub async fn delete_image(&self, id: ImageId) -> StoreResult<()> {
        self.store.delete_image(id).await
    }

    pub async fn get_marker_images(&self, marker_id: MarkerId) -> StoreResult<Vec<MarkerImage>> {
        self.store.list_images_by_marker(marker_id).await
    }

    pub async fn get_marker_by_id(&self, id: MarkerId) -> StoreResult<Option<Marker>> {
        self.store.get_marker(id).await
    }
}

/// Returns the provider of the current scope.
///
/// # Errors
/// - `ProviderError::OutsideScope` when no `DatabaseProvider::scope` encloses
///   the calling task.
pub fn use_database() -> Result<Arc<DatabaseProvider>, ProviderError> {
    DATABASE
        .try_with(Arc::clone)
        .map_err(|_| ProviderError::OutsideScope)
}
