//! Integration tests for the per-session frame pipeline

mod mocks;

use camrec_core::overlay::FrameOverlay;
use camrec_core::pipeline::{FramePipeline, Tile};
use camrec_core::session::SessionSet;
use camrec_core::types::Rotation;
use chrono::Local;
use mocks::{
    camera_color, has_overlay_pixels, test_config, MockBackend, MockWriterFactory, CELL_HEIGHT,
    CELL_WIDTH, MARKER,
};
use tempfile::TempDir;

fn pipeline(overlay: bool) -> FramePipeline {
    FramePipeline::new(FrameOverlay::enabled(overlay), CELL_WIDTH, CELL_HEIGHT)
}

#[test]
fn test_read_failure_only_affects_that_session() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let backend = MockBackend::with_devices(&[0, 1, 2]).fail_read(1, 0);
    let writers = MockWriterFactory::default();
    let mut sessions = SessionSet::open_all(&[0, 1, 2], &config, &backend, &writers).unwrap();

    let tiles = pipeline(false).process_all(sessions.iter_mut(), &Local::now());

    assert_eq!(tiles.len(), 3);
    assert!(!tiles[0].is_placeholder());
    assert!(tiles[1].is_placeholder());
    assert!(!tiles[2].is_placeholder());

    assert_eq!(tiles[1].frame().dimensions(), (CELL_WIDTH, CELL_HEIGHT));
    assert!(tiles[1].frame().pixels().all(|p| p.0 == [0, 0, 0]));
    assert_eq!(tiles[0].frame().get_pixel(10, 10).0, camera_color(0));
    assert_eq!(tiles[2].frame().get_pixel(10, 10).0, camera_color(2));

    // Placeholders are shown, never recorded
    assert_eq!(writers.frames_for(0).len(), 1);
    assert_eq!(writers.frames_for(1).len(), 0);
    assert_eq!(writers.frames_for(2).len(), 1);
}

#[test]
fn test_failed_camera_recovers_next_iteration() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let backend = MockBackend::with_devices(&[0]).fail_read(0, 0);
    let writers = MockWriterFactory::default();
    let mut sessions = SessionSet::open_all(&[0], &config, &backend, &writers).unwrap();
    let pipeline = pipeline(false);

    let first = pipeline.process_all(sessions.iter_mut(), &Local::now());
    let second = pipeline.process_all(sessions.iter_mut(), &Local::now());

    assert!(first[0].is_placeholder());
    assert!(matches!(second[0], Tile::Live(_)));
    assert!(!sessions.get(0).unwrap().is_closed());
}

#[test]
fn test_empty_read_gives_placeholder() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let backend = MockBackend::with_devices(&[0]).empty_read(0, 0);
    let writers = MockWriterFactory::default();
    let mut sessions = SessionSet::open_all(&[0], &config, &backend, &writers).unwrap();

    let tiles = pipeline(false).process_all(sessions.iter_mut(), &Local::now());
    assert!(tiles[0].is_placeholder());
    assert!(writers.frames_for(0).is_empty());
}

#[test]
fn test_rotation_and_mirror_are_applied() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let backend = MockBackend::with_devices(&[0]);
    let writers = MockWriterFactory::default();
    let mut sessions = SessionSet::open_all(&[0], &config, &backend, &writers).unwrap();
    let pipeline = pipeline(false);
    let (w, h) = (CELL_WIDTH, CELL_HEIGHT);

    let tiles = pipeline.process_all(sessions.iter_mut(), &Local::now());
    assert_eq!(tiles[0].frame().get_pixel(0, 0).0, MARKER);

    sessions.toggle_rotation();
    let tiles = pipeline.process_all(sessions.iter_mut(), &Local::now());
    assert_eq!(sessions.get(0).unwrap().transform.rotation, Rotation::Deg180);
    assert_eq!(tiles[0].frame().get_pixel(w - 1, h - 1).0, MARKER);

    // 180° then mirror leaves the marker bottom-left
    sessions.toggle_mirror();
    let tiles = pipeline.process_all(sessions.iter_mut(), &Local::now());
    assert_eq!(tiles[0].frame().get_pixel(0, h - 1).0, MARKER);

    sessions.toggle_rotation();
    let tiles = pipeline.process_all(sessions.iter_mut(), &Local::now());
    assert_eq!(tiles[0].frame().get_pixel(w - 1, 0).0, MARKER);
}

#[test]
fn test_recorded_frame_matches_tile() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let backend = MockBackend::with_devices(&[3]);
    let writers = MockWriterFactory::default();
    let mut sessions = SessionSet::open_all(&[3], &config, &backend, &writers).unwrap();

    let tiles = pipeline(true).process_all(sessions.iter_mut(), &Local::now());

    let recorded = writers.frames_for(3);
    assert_eq!(recorded.len(), 1);
    assert_eq!(&recorded[0], tiles[0].frame());
    assert!(has_overlay_pixels(&recorded[0]));
}

#[test]
fn test_write_failure_keeps_session_running() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let backend = MockBackend::with_devices(&[0, 1]);
    let writers = MockWriterFactory::default().fail_writes();
    let mut sessions = SessionSet::open_all(&[0, 1], &config, &backend, &writers).unwrap();
    let pipeline = pipeline(false);

    for _ in 0..3 {
        let tiles = pipeline.process_all(sessions.iter_mut(), &Local::now());
        assert!(tiles.iter().all(|t| !t.is_placeholder()));
    }
    assert_eq!(backend.log.lock().reads.get(&1), Some(&3));
    assert!(sessions.iter().all(|s| !s.is_closed()));
}

#[test]
fn test_read_failure_streak_is_counted_and_reset() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let backend = MockBackend::with_devices(&[0])
        .fail_read(0, 0)
        .fail_read(0, 1)
        .empty_read(0, 2);
    let writers = MockWriterFactory::default();
    let mut sessions = SessionSet::open_all(&[0], &config, &backend, &writers).unwrap();
    let pipeline = pipeline(false);

    let mut streaks = Vec::new();
    for _ in 0..4 {
        pipeline.process_all(sessions.iter_mut(), &Local::now());
        streaks.push(sessions.get(0).unwrap().read_failures());
    }

    assert_eq!(streaks, vec![1, 2, 3, 0]);
    assert_eq!(writers.frames_for(0).len(), 1);
}
