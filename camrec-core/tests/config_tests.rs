//! Integration tests for configuration system

use camrec_core::config::{sample_config, ConfigFile, RunConfig};
use camrec_core::error::CamrecError;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_run_config_defaults() {
    let config = RunConfig::default();
    assert_eq!(config.max_cameras, 10);
    assert_eq!(config.output_dir, PathBuf::from("./output"));
    assert_eq!(config.snapshot_dir, PathBuf::from("snapshots"));
    assert_eq!(config.cell_size(), (640, 480));
    assert_eq!(config.fps, 30.0);
    assert!(config.overlay);
    assert_eq!(config.poll_timeout, Duration::from_millis(1));
    assert!(config.validate().is_empty());
    assert!(config.validate_strict().is_ok());
}

#[test]
fn test_builder_chain() {
    let config = RunConfig::default()
        .with_max_cameras(3)
        .with_output_dir("/tmp/rec")
        .with_size(1280.0, 720.0)
        .with_fps(15.0)
        .with_overlay(false)
        .with_window_title("Lab");

    assert_eq!(config.max_cameras, 3);
    assert_eq!(config.output_dir, PathBuf::from("/tmp/rec"));
    assert_eq!(config.cell_size(), (1280, 720));
    assert_eq!(config.fps, 15.0);
    assert!(!config.overlay);
    assert_eq!(config.window_title, "Lab");
}

#[test]
fn test_validate_strict_rejects_non_positive_values() {
    let cases = [
        RunConfig::default().with_max_cameras(0),
        RunConfig::default().with_size(0.0, 480.0),
        RunConfig::default().with_size(640.0, -1.0),
        RunConfig::default().with_fps(0.0),
        RunConfig::default().with_fps(f64::NAN),
    ];
    for config in cases {
        let err = config.validate_strict().unwrap_err();
        assert!(matches!(err, CamrecError::Config(_)), "{:?}", config);
    }
}

#[test]
fn test_validate_warns_on_odd_size() {
    let config = RunConfig::default().with_size(641.0, 480.0);
    let warnings = config.validate();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("odd"));
    assert!(config.validate_strict().is_ok());
}

#[test]
fn test_config_file_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("camrec").join("config.toml");

    let mut file = ConfigFile::default();
    file.recording.max_cameras = 4;
    file.recording.fps = 24.0;
    file.recording.overlay = false;
    file.snapshots.dir = PathBuf::from("/data/snaps");
    file.save_to(&path).unwrap();

    let loaded = ConfigFile::load_from(&path).unwrap();
    assert_eq!(loaded, file);

    let run = loaded.to_run_config();
    assert_eq!(run.max_cameras, 4);
    assert_eq!(run.fps, 24.0);
    assert!(!run.overlay);
    assert_eq!(run.snapshot_dir, PathBuf::from("/data/snaps"));
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let loaded = ConfigFile::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded, ConfigFile::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[recording]\nfps = 60.0\n\n[preview]\npoll_ms = 5\n").unwrap();

    let run = ConfigFile::load_from(&path).unwrap().to_run_config();
    assert_eq!(run.fps, 60.0);
    assert_eq!(run.poll_timeout, Duration::from_millis(5));
    assert_eq!(run.max_cameras, 10);
    assert_eq!(run.cell_size(), (640, 480));
}

#[test]
fn test_invalid_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[recording]\nfps = \"fast\"\n").unwrap();

    let err = ConfigFile::load_from(&path).unwrap_err();
    assert!(matches!(err, CamrecError::Config(_)));
    assert!(err.user_hint().unwrap().contains("config.toml"));
}

#[test]
fn test_sample_config_is_default() {
    let parsed: ConfigFile = toml::from_str(&sample_config()).unwrap();
    assert_eq!(parsed.to_run_config(), RunConfig::default());
}
