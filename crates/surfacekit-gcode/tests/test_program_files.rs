use std::fs;
use surfacekit_core::Error;
use surfacekit_gcode::{MoveKind, ToolpathProgram};
use tempfile::TempDir;

#[test]
fn test_missing_source_file() {
    let dir = TempDir::new().unwrap();
    let err = ToolpathProgram::from_file(dir.path().join("absent.gcode")).unwrap_err();
    assert!(matches!(err, Error::MissingSourceFile { .. }));
}

#[test]
fn test_load_contour_ready_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.gcode");
    fs::write(&path, "(job)\nG00 Z15\nG01 Z-0.05 F60\nG01 X5 Y0 F120\n").unwrap();

    let program = ToolpathProgram::from_file(&path).unwrap();

    assert_eq!(program.len(), 3);
    assert_eq!(program.count(MoveKind::Cut), 1);
}

#[test]
fn test_write_replaces_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("job.gcode.cgcode");
    fs::write(&path, "stale").unwrap();

    let program = ToolpathProgram::parse("G0 Z15\n").unwrap();
    program.write_to_file(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "G0 Z15.00000000\n");
    assert!(!dir.path().join("job.gcode.cgcode.tmp").exists());
}

#[test]
fn test_write_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope").join("out.cgcode");

    let err = ToolpathProgram::new().write_to_file(&path).unwrap_err();

    assert!(matches!(err, Error::Toolpath(_)));
    assert!(!path.exists());
}
