use geomarks_core::db::open_db_in_memory;
use geomarks_core::{
    Coordinate, MarkerImageRepository, MarkerRepository, NewMarker, NewMarkerImage, RepoError,
    SqliteMarkerImageRepository, SqliteMarkerRepository, ValidationError,
};
use rusqlite::Connection;

fn sample(title: &str) -> NewMarker {
    NewMarker::new(Coordinate::new(58.0, 56.2), title, "d")
}

#[test]
fn create_then_get_returns_same_fields_with_assigned_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    let input = sample("A");
    let created = repo.create_marker(&input).unwrap();
    assert_eq!(created.id, 1);
    assert!(!created.created_at.is_empty());
    assert_eq!(created.to_new(), input);

    let loaded = repo.get_marker(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);

    let all = repo.list_markers().unwrap();
    assert_eq!(all, vec![created]);
}

#[test]
fn list_returns_all_markers_in_ascending_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    for title in ["first", "second", "third", "fourth"] {
        repo.create_marker(&sample(title)).unwrap();
    }

    let markers = repo.list_markers().unwrap();
    assert_eq!(markers.len(), 4);
    assert!(markers.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert_eq!(markers[0].title, "first");
    assert_eq!(markers[3].title, "fourth");
    assert_eq!(repo.count_markers().unwrap(), 4);
}

#[test]
fn list_on_empty_storage_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    assert!(repo.list_markers().unwrap().is_empty());
    assert_eq!(repo.count_markers().unwrap(), 0);
}

#[test]
fn delete_then_get_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    let created = repo.create_marker(&sample("gone")).unwrap();
    repo.delete_marker(created.id).unwrap();

    assert!(repo.get_marker(created.id).unwrap().is_none());
    assert!(repo.list_markers().unwrap().is_empty());
}

#[test]
fn delete_missing_marker_is_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    repo.delete_marker(42).unwrap();
    repo.delete_marker(42).unwrap();
}

#[test]
fn get_missing_marker_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    assert!(repo.get_marker(7).unwrap().is_none());
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    let first = repo.create_marker(&sample("a")).unwrap();
    let second = repo.create_marker(&sample("b")).unwrap();
    repo.delete_marker(second.id).unwrap();
    let third = repo.create_marker(&sample("c")).unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(third.id, 3);
}

#[test]
fn delete_marker_removes_its_images_only() {
    let conn = open_db_in_memory().unwrap();
    let markers = SqliteMarkerRepository::try_new(&conn).unwrap();
    let images = SqliteMarkerImageRepository::try_new(&conn).unwrap();

    let doomed = markers.create_marker(&sample("doomed")).unwrap();
    let kept = markers.create_marker(&sample("kept")).unwrap();
    images
        .create_image(&NewMarkerImage::new(doomed.id, "file:///a.jpg"))
        .unwrap();
    images
        .create_image(&NewMarkerImage::new(doomed.id, "file:///b.jpg"))
        .unwrap();
    images
        .create_image(&NewMarkerImage::new(kept.id, "file:///c.jpg"))
        .unwrap();

    markers.delete_marker(doomed.id).unwrap();

    assert!(images.list_images_by_marker(doomed.id).unwrap().is_empty());
    assert_eq!(images.list_images_by_marker(kept.id).unwrap().len(), 1);
}

#[test]
fn empty_title_and_out_of_range_coordinates_are_accepted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    let input = NewMarker::new(Coordinate::new(512.5, -999.0), "", "");
    let created = repo.create_marker(&input).unwrap();

    assert_eq!(created.coordinate, Coordinate::new(512.5, -999.0));
    assert_eq!(created.title, "");
}

#[test]
fn non_finite_coordinate_is_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    let err = repo
        .create_marker(&NewMarker::new(Coordinate::new(f64::NAN, 1.0), "x", "y"))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NonFiniteCoordinate { .. })
    ));
    assert_eq!(repo.count_markers().unwrap(), 0);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteMarkerRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::Unavailable));
}

#[test]
fn corrupted_row_fails_with_decode_error() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO markers (latitude, longitude, title, description)
         VALUES ('north', 56.2, 'A', 'd');",
        [],
    )
    .unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();

    let err = repo.list_markers().unwrap_err();
    match err {
        RepoError::Decode(message) => assert!(message.contains("markers.latitude")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn write_failure_is_reported_as_write_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMarkerRepository::try_new(&conn).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_markers BEFORE INSERT ON markers
         BEGIN SELECT RAISE(ABORT, 'read-only'); END;",
    )
    .unwrap();

    let err = repo.create_marker(&sample("blocked")).unwrap_err();
    assert!(matches!(err, RepoError::Write(_)));
}
