use std::fs;
use surfacekit_core::Error;
use surfacekit_settings::Config;
use tempfile::TempDir;

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("surfacekit").join("config.toml");

    let mut config = Config::new();
    config.connection.cnc_port = "/dev/ttyUSB0".to_string();
    config.scan.x_dim = Some(80.0);
    config.scan.max_descent_steps = 0;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::new();
    config.contour.target_depth = 0.25;
    config.cache.enabled = false;
    config.save_to_file(&path).unwrap();

    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "scan: {}").unwrap();

    assert!(Config::load_from_file(&path).is_err());
    assert!(Config::new().save_to_file(&path).is_err());
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[scan]\naverages = 0\n").unwrap();

    assert!(Config::load_from_file(&path).is_err());
}

#[test]
fn test_explicit_missing_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Config::load_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, Error::MissingSourceFile { .. }));
}
