//! Mock infrastructure for testing
//!
//! In-memory stand-ins for cameras, recording writers, the preview window
//! and the snapshot writer. Each mock shares its log through an `Arc` so a
//! test can inspect what happened after handing the mock to the core.

#![allow(dead_code)]

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use camrec_core::capture::{CaptureBackend, CaptureDevice};
use camrec_core::config::RunConfig;
use camrec_core::display::Display;
use camrec_core::error::{CamrecError, Result};
use camrec_core::frame::Frame;
use camrec_core::output::{SnapshotWriter, VideoWriter, WriterFactory};
use camrec_core::session::SessionSet;
use camrec_core::KEY_ESC;

/// Small cell size so tests stay fast
pub const CELL_WIDTH: u32 = 64;
pub const CELL_HEIGHT: u32 = 48;

/// Pixel placed at (0, 0) of every mock frame to track orientation
pub const MARKER: [u8; 3] = [255, 255, 255];

/// Fill colour of frames produced by camera `id`
pub fn camera_color(id: u32) -> [u8; 3] {
    [(id * 50 + 20) as u8, 80, 160]
}

/// Solid frame with the orientation marker in the top-left corner
pub fn camera_frame(id: u32, width: u32, height: u32) -> Frame {
    let mut frame = Frame::from_pixel(width, height, image::Rgb(camera_color(id)));
    frame.put_pixel(0, 0, image::Rgb(MARKER));
    frame
}

/// Config pointing at a temporary output directory, overlay off
pub fn test_config(output_dir: &Path) -> RunConfig {
    RunConfig::default()
        .with_output_dir(output_dir)
        .with_snapshot_dir(output_dir.join("snapshots"))
        .with_size(CELL_WIDTH as f64, CELL_HEIGHT as f64)
        .with_overlay(false)
        .with_poll_timeout(Duration::ZERO)
}

// Capture

#[derive(Debug, Default)]
pub struct BackendLog {
    /// Ids that open successfully
    pub devices: HashSet<u32>,
    /// Ids that probe fine but fail to open
    pub failing_open: HashSet<u32>,
    /// Read numbers (0-based, per device) that fail
    pub failing_reads: HashMap<u32, HashSet<usize>>,
    /// Read numbers that succeed but leave the buffer empty
    pub empty_reads: HashMap<u32, HashSet<usize>>,
    /// Ids in the order they were opened
    pub opened: Vec<u32>,
    /// Ids in the order they were released
    pub closed: Vec<u32>,
    /// Reads performed per id
    pub reads: HashMap<u32, usize>,
}

/// Capture backend producing solid frames
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    pub log: Arc<Mutex<BackendLog>>,
}

impl MockBackend {
    pub fn with_devices(ids: &[u32]) -> Self {
        let backend = Self::default();
        backend.log.lock().devices.extend(ids.iter().copied());
        backend
    }

    pub fn fail_open(self, id: u32) -> Self {
        self.log.lock().failing_open.insert(id);
        self
    }

    pub fn fail_read(self, id: u32, read: usize) -> Self {
        self.log
            .lock()
            .failing_reads
            .entry(id)
            .or_default()
            .insert(read);
        self
    }

    pub fn empty_read(self, id: u32, read: usize) -> Self {
        self.log.lock().empty_reads.entry(id).or_default().insert(read);
        self
    }

    pub fn opened(&self) -> Vec<u32> {
        self.log.lock().opened.clone()
    }

    pub fn closed(&self) -> Vec<u32> {
        self.log.lock().closed.clone()
    }
}

impl CaptureBackend for MockBackend {
    fn open(&self, id: u32, width: u32, height: u32, _fps: f64) -> Result<Box<dyn CaptureDevice>> {
        let mut log = self.log.lock();
        if !log.devices.contains(&id) {
            return Err(CamrecError::device_unavailable(id, "no such device"));
        }
        if log.failing_open.contains(&id) {
            return Err(CamrecError::device_unavailable(id, "device busy"));
        }
        log.opened.push(id);
        Ok(Box::new(MockDevice {
            id,
            width,
            height,
            reads: 0,
            closed: false,
            log: Arc::clone(&self.log),
        }))
    }

    fn probe(&self, id: u32) -> bool {
        self.log.lock().devices.contains(&id)
    }
}

pub struct MockDevice {
    id: u32,
    width: u32,
    height: u32,
    reads: usize,
    closed: bool,
    log: Arc<Mutex<BackendLog>>,
}

impl CaptureDevice for MockDevice {
    fn read(&mut self, frame: &mut Frame) -> Result<()> {
        let n = self.reads;
        self.reads += 1;

        let mut log = self.log.lock();
        *log.reads.entry(self.id).or_default() += 1;

        if log.failing_reads.get(&self.id).is_some_and(|r| r.contains(&n)) {
            return Err(CamrecError::capture("simulated read failure"));
        }
        if log.empty_reads.get(&self.id).is_some_and(|r| r.contains(&n)) {
            *frame = Frame::new(0, 0);
            return Ok(());
        }

        *frame = camera_frame(self.id, self.width, self.height);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.log.lock().closed.push(self.id);
        }
        Ok(())
    }
}

// Recording

#[derive(Debug, Default)]
pub struct WriterLog {
    /// Paths writers were created for
    pub created: Vec<PathBuf>,
    /// Frames written per path
    pub frames: HashMap<PathBuf, Vec<Frame>>,
    /// Paths whose writer was closed, once per close
    pub closed: Vec<PathBuf>,
    /// Cameras whose writer fails to open
    pub failing_create: HashSet<u32>,
    /// Every write fails
    pub fail_writes: bool,
}

/// Writer factory keeping every frame in memory
#[derive(Debug, Clone, Default)]
pub struct MockWriterFactory {
    pub log: Arc<Mutex<WriterLog>>,
}

impl MockWriterFactory {
    pub fn fail_create(self, camera_id: u32) -> Self {
        self.log.lock().failing_create.insert(camera_id);
        self
    }

    pub fn fail_writes(self) -> Self {
        self.log.lock().fail_writes = true;
        self
    }

    /// Frames recorded for the camera whose file name carries `camera_id`
    pub fn frames_for(&self, camera_id: u32) -> Vec<Frame> {
        let prefix = format!("camera_{}_", camera_id);
        self.log
            .lock()
            .frames
            .iter()
            .filter(|(path, _)| file_name(path).starts_with(&prefix))
            .flat_map(|(_, frames)| frames.clone())
            .collect()
    }

    pub fn created(&self) -> Vec<PathBuf> {
        self.log.lock().created.clone()
    }

    pub fn closed(&self) -> Vec<PathBuf> {
        self.log.lock().closed.clone()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl WriterFactory for MockWriterFactory {
    fn create(&self, path: &Path, _width: u32, _height: u32, _fps: f64) -> Result<Box<dyn VideoWriter>> {
        let mut log = self.log.lock();
        let name = file_name(path);
        if log
            .failing_create
            .iter()
            .any(|id| name.starts_with(&format!("camera_{}_", id)))
        {
            return Err(CamrecError::encode("simulated encoder failure"));
        }
        log.created.push(path.to_path_buf());
        log.frames.insert(path.to_path_buf(), Vec::new());
        Ok(Box::new(MockWriter {
            path: path.to_path_buf(),
            closed: false,
            log: Arc::clone(&self.log),
        }))
    }
}

pub struct MockWriter {
    path: PathBuf,
    closed: bool,
    log: Arc<Mutex<WriterLog>>,
}

impl VideoWriter for MockWriter {
    fn write(&mut self, frame: &Frame) -> Result<()> {
        let mut log = self.log.lock();
        if log.fail_writes {
            return Err(CamrecError::encode("simulated write failure"));
        }
        log.frames
            .entry(self.path.clone())
            .or_default()
            .push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.log.lock().closed.push(self.path.clone());
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

// Display

#[derive(Debug, Default)]
pub struct DisplayLog {
    /// Every frame shown, in order
    pub shown: Vec<Frame>,
    /// Keys still to be returned; `None` means no key this iteration
    pub keys: VecDeque<Option<u32>>,
    /// Number of polls performed
    pub polls: usize,
    /// Every show fails
    pub fail_show: bool,
}

/// Display returning scripted keys, then ESC once the script runs out
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    pub log: Arc<Mutex<DisplayLog>>,
}

impl MockDisplay {
    pub fn with_keys(keys: &[Option<char>]) -> Self {
        let display = Self::default();
        display
            .log
            .lock()
            .keys
            .extend(keys.iter().map(|k| k.map(|c| c as u32)));
        display
    }

    pub fn fail_show(self) -> Self {
        self.log.lock().fail_show = true;
        self
    }

    pub fn shown(&self) -> Vec<Frame> {
        self.log.lock().shown.clone()
    }

    pub fn polls(&self) -> usize {
        self.log.lock().polls
    }
}

impl Display for MockDisplay {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        let mut log = self.log.lock();
        if log.fail_show {
            return Err(CamrecError::display("simulated render failure"));
        }
        log.shown.push(frame.clone());
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Option<u32> {
        let mut log = self.log.lock();
        log.polls += 1;
        log.keys.pop_front().unwrap_or(Some(KEY_ESC))
    }
}

// Snapshots

#[derive(Debug, Clone)]
pub struct SavedSnapshot {
    pub camera_id: u32,
    pub frame: Frame,
    pub path: PathBuf,
}

/// Snapshot writer keeping images in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSnapshotWriter {
    pub saved: Arc<Mutex<Vec<SavedSnapshot>>>,
}

impl RecordingSnapshotWriter {
    pub fn saved(&self) -> Vec<SavedSnapshot> {
        self.saved.lock().clone()
    }
}

impl SnapshotWriter for RecordingSnapshotWriter {
    fn save(&mut self, camera_id: u32, frame: &Frame, now: &DateTime<Local>) -> Result<PathBuf> {
        let path = camrec_core::output::snapshot_path(Path::new("snapshots"), camera_id, now);
        self.saved.lock().push(SavedSnapshot {
            camera_id,
            frame: frame.clone(),
            path: path.clone(),
        });
        Ok(path)
    }
}

/// Open one session per id against fresh mocks
pub fn open_sessions(
    ids: &[u32],
    config: &RunConfig,
) -> (SessionSet, MockBackend, MockWriterFactory) {
    let backend = MockBackend::with_devices(ids);
    let writers = MockWriterFactory::default();
    let sessions = SessionSet::open_all(ids, config, &backend, &writers).unwrap();
    (sessions, backend, writers)
}

/// Whether `frame` contains any pixel of the overlay colour
pub fn has_overlay_pixels(frame: &Frame) -> bool {
    frame.pixels().any(|p| p.0 == [255, 0, 0])
}
