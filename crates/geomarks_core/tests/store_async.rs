use geomarks_core::{
    Coordinate, MarkerService, MarkerStore, NewMarker, NewMarkerImage, StoreConfig, StoreError,
};
use std::sync::Arc;

fn marker(title: &str) -> NewMarker {
    NewMarker::new(Coordinate::new(58.0, 56.2), title, "d")
}

#[tokio::test]
async fn operations_before_init_fail_with_unavailable() {
    let store = MarkerStore::new(StoreConfig::in_memory());

    let err = store.list_markers().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable));
    let err = store.create_marker(marker("early")).await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable));
    assert!(!store.is_initialized());
    assert_eq!(store.open_attempts(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_init_runs_one_schema_pass_and_shares_handle() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MarkerStore::new(StoreConfig::from_dir(dir.path())));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.init().await })
        })
        .collect();

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap().unwrap());
    }

    assert_eq!(store.open_attempts(), 1);
    assert!(handles
        .windows(2)
        .all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));

    let created = store.create_marker(marker("after init")).await.unwrap();
    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn init_is_memoized_across_sequential_calls() {
    let store = MarkerStore::new(StoreConfig::in_memory());

    let first = store.init().await.unwrap();
    let second = store.init().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.open_attempts(), 1);
}

#[tokio::test]
async fn init_failure_is_reported_and_leaves_store_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file in the way").unwrap();
    let store = MarkerStore::new(StoreConfig::from_dir(&blocker));

    let err = store.init().await.unwrap_err();
    assert!(matches!(err, StoreError::Initialization(_)));
    assert!(!store.is_initialized());
    assert!(matches!(
        store.list_markers().await.unwrap_err(),
        StoreError::Unavailable
    ));
}

#[tokio::test]
async fn marker_scenario_create_get_list() {
    let store = MarkerStore::new(StoreConfig::in_memory());
    store.init().await.unwrap();

    let created = store
        .create_marker(NewMarker::new(Coordinate::new(58.0, 56.2), "A", "d"))
        .await
        .unwrap();
    assert_eq!(created.id, 1);

    let loaded = store.get_marker(1).await.unwrap().unwrap();
    assert_eq!(loaded.coordinate, Coordinate::new(58.0, 56.2));
    assert_eq!(loaded.title, "A");
    assert_eq!(loaded.description, "d");

    let all = store.list_markers().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, 1);
}

#[tokio::test]
async fn deleting_marker_with_images_leaves_no_orphans() {
    let store = MarkerStore::new(StoreConfig::in_memory());
    store.init().await.unwrap();

    let created = store.create_marker(marker("with photos")).await.unwrap();
    store
        .create_image(NewMarkerImage::new(created.id, "file:///a.jpg"))
        .await
        .unwrap();
    store
        .create_image(NewMarkerImage::new(created.id, "file:///b.jpg"))
        .await
        .unwrap();
    assert_eq!(store.list_images_by_marker(created.id).await.unwrap().len(), 2);

    store.delete_marker(created.id).await.unwrap();

    assert!(store.get_marker(created.id).await.unwrap().is_none());
    assert!(store
        .list_images_by_marker(created.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn data_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();

    let store = MarkerStore::new(StoreConfig::from_dir(dir.path()));
    store.init().await.unwrap();
    store.create_marker(marker("persisted")).await.unwrap();
    drop(store);

    let reopened = MarkerStore::new(StoreConfig::from_dir(dir.path()));
    reopened.init().await.unwrap();
    let markers = reopened.list_markers().await.unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].title, "persisted");
}

#[tokio::test]
async fn marker_details_bundles_marker_and_images() {
    let store = Arc::new(MarkerStore::new(StoreConfig::in_memory()));
    store.init().await.unwrap();
    let service = MarkerService::new(Arc::clone(&store));

    let created = store.create_marker(marker("detail")).await.unwrap();
    service
        .attach_image(created.id, "  file:///trimmed.jpg  ")
        .await
        .unwrap();

    let details = service.marker_details(created.id).await.unwrap().unwrap();
    assert_eq!(details.marker, created);
    assert_eq!(details.images.len(), 1);
    assert_eq!(details.images[0].uri, "file:///trimmed.jpg");

    assert!(service.marker_details(999).await.unwrap().is_none());
}

#[tokio::test]
async fn place_marker_numbers_titles_from_current_count() {
    let store = Arc::new(MarkerStore::new(StoreConfig::in_memory()));
    store.init().await.unwrap();
    let service = MarkerService::new(Arc::clone(&store));

    let first = service
        .place_marker(Coordinate::new(58.007, 56.218))
        .await
        .unwrap();
    let second = service
        .place_marker(Coordinate::new(58.010, 56.220))
        .await
        .unwrap();

    assert_eq!(first.title, "Marker 1");
    assert_eq!(second.title, "Marker 2");
    assert!(second.description.starts_with("Added: "));
}

#[tokio::test]
async fn attach_image_rejects_blank_uri() {
    let store = Arc::new(MarkerStore::new(StoreConfig::in_memory()));
    store.init().await.unwrap();
    let service = MarkerService::new(Arc::clone(&store));

    let err = service.attach_image(1, "   ").await.unwrap_err();
    assert!(matches!(err, StoreError::Repo(_)));
}
