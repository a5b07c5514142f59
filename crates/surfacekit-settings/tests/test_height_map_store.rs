use std::fs;
use std::path::Path;
use surfacekit_core::{Error, HeightMap, HeightMapError};
use surfacekit_settings::{FileHeightMapStore, HeightMapFile, HeightMapStore};
use tempfile::TempDir;

fn sample_map() -> HeightMap {
    HeightMap::from(vec![
        vec![(0.0, 0.0, 1.0), (10.0, 0.0, 1.2)],
        vec![(0.0, 10.0, 1.1), (10.0, 10.0, 1.3)],
    ])
}

#[test]
fn test_store_then_load_by_name() {
    let dir = TempDir::new().unwrap();
    let store = FileHeightMapStore::new(dir.path().join("height_map_cache"));

    let path = store.store(&sample_map()).unwrap();
    assert!(path.starts_with(store.directory()));

    let name = path.file_name().unwrap();
    let loaded = store.load(Path::new(name)).unwrap();
    assert_eq!(loaded, sample_map());
}

#[test]
fn test_load_by_literal_path() {
    let dir = TempDir::new().unwrap();
    let store = FileHeightMapStore::new(dir.path().join("cache"));
    let path = store.store(&sample_map()).unwrap();

    let other = FileHeightMapStore::new(dir.path().join("elsewhere"));
    assert_eq!(other.load(&path).unwrap(), sample_map());
}

#[test]
fn test_stored_document_has_metadata() {
    let dir = TempDir::new().unwrap();
    let store = FileHeightMapStore::new(dir.path());
    let path = store.store(&sample_map()).unwrap();

    let document: HeightMapFile =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document.version, "1.0");
    assert_eq!(document.metadata.rows, 2);
    assert_eq!(document.metadata.columns, 2);
    assert_eq!(document.metadata.z_min, Some(1.0));
    assert_eq!(document.metadata.z_max, Some(1.3));
}

#[test]
fn test_missing_reference() {
    let dir = TempDir::new().unwrap();
    let store = FileHeightMapStore::new(dir.path());
    let err = store.load(Path::new("height_map-deadbeef.json")).unwrap_err();
    assert!(matches!(err, Error::MissingSourceFile { .. }));
}

#[test]
fn test_incomplete_map_is_not_stored() {
    let dir = TempDir::new().unwrap();
    let store = FileHeightMapStore::new(dir.path().join("cache"));
    let partial = HeightMap::from(vec![
        vec![(0.0, 0.0, 1.0), (10.0, 0.0, 1.2)],
        vec![(0.0, 10.0, 1.1)],
    ]);

    let err = store.store(&partial).unwrap_err();

    assert!(matches!(
        err,
        Error::HeightMap(HeightMapError::RaggedRows { row: 1, .. })
    ));
    assert!(!store.directory().exists());
}

#[test]
fn test_corrupt_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("height_map-00000000.json");
    fs::write(&path, "not json").unwrap();

    let store = FileHeightMapStore::new(dir.path());
    assert!(matches!(store.load(&path), Err(Error::Other(_))));
}
