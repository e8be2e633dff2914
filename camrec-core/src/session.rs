//! Camera sessions
//!
//! A session bundles one camera's capture handle, recording writer, frame
//! buffer and transform flags. Sessions are opened once before the main loop
//! and released exactly once, either explicitly or when dropped.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span, warn};

use crate::capture::{CaptureBackend, CaptureDevice};
use crate::config::RunConfig;
use crate::error::{CamrecError, Result};
use crate::frame::{self, Frame};
use crate::output::{recording_path, VideoWriter, WriterFactory};
use crate::types::Transform;

/// One camera being recorded
pub struct CameraSession {
    /// Device id
    id: u32,
    /// Capture handle
    capture: Box<dyn CaptureDevice>,
    /// Recording writer
    writer: Box<dyn VideoWriter>,
    /// Reusable frame buffer, overwritten every iteration
    frame: Frame,
    /// Target frames per second
    fps: f64,
    /// Recording file
    output_path: PathBuf,
    /// Rotation and mirror flags
    pub transform: Transform,
    /// Reads failed in a row since the last good frame
    read_failures: u32,
    closed: bool,
}

impl CameraSession {
    /// Open device `id` and start a recording for it
    ///
    /// Fails with `DeviceUnavailable` when the device cannot be opened and
    /// with `WriterInitFailed` when the recording cannot be created; in the
    /// latter case the capture handle is released before returning.
    pub fn open(
        id: u32,
        config: &RunConfig,
        backend: &dyn CaptureBackend,
        writers: &dyn WriterFactory,
    ) -> Result<Self> {
        let (width, height) = config.cell_size();
        let mut capture = backend.open(id, width, height, config.fps)?;

        match Self::open_writer(id, config, writers) {
            Ok(writer) => {
                let output_path = writer.path().to_path_buf();
                info!(camera = id, "Recording to {:?}", output_path);
                Ok(Self {
                    id,
                    capture,
                    writer,
                    frame: frame::blank(width, height),
                    fps: config.fps,
                    output_path,
                    transform: Transform::default(),
                    read_failures: 0,
                    closed: false,
                })
            }
            Err(e) => {
                if let Err(close_err) = capture.close() {
                    warn!(camera = id, "Failed to release capture: {}", close_err);
                }
                Err(CamrecError::writer_init(id, e.to_string()))
            }
        }
    }

    fn open_writer(
        id: u32,
        config: &RunConfig,
        writers: &dyn WriterFactory,
    ) -> Result<Box<dyn VideoWriter>> {
        fs::create_dir_all(&config.output_dir)?;
        let path = recording_path(&config.output_dir, id, &Local::now());
        let (width, height) = config.cell_size();
        writers.create(&path, width, height, config.fps)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Reads failed in a row since the last good frame
    pub fn read_failures(&self) -> u32 {
        self.read_failures
    }

    /// Count a failed read; returns the length of the current streak
    pub fn note_read_failure(&mut self) -> u32 {
        self.read_failures = self.read_failures.saturating_add(1);
        self.read_failures
    }

    /// End the failure streak; returns how long it was
    pub fn clear_read_failures(&mut self) -> u32 {
        std::mem::take(&mut self.read_failures)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read the next frame into the session buffer
    ///
    /// An `Ok` read that leaves the buffer empty is reported as
    /// `EmptyFrameRead`.
    pub fn acquire(&mut self) -> Result<&Frame> {
        if self.closed {
            return Err(CamrecError::capture(format!("camera {} is closed", self.id)));
        }
        self.capture.read(&mut self.frame)?;
        if frame::is_empty(&self.frame) {
            return Err(CamrecError::EmptyFrameRead(self.id));
        }
        Ok(&self.frame)
    }

    /// Append a frame to this session's recording
    pub fn record(&mut self, frame: &Frame) -> Result<()> {
        if self.closed {
            return Err(CamrecError::encode(format!("camera {} is closed", self.id)));
        }
        self.writer.write(frame)
    }

    /// Release the capture handle and finalize the recording
    ///
    /// Idempotent. Failures are logged, never returned.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.capture.close() {
            error!(camera = self.id, "Failed to release capture: {}", e);
        }
        if let Err(e) = self.writer.close() {
            error!(camera = self.id, "Failed to finalize {:?}: {}", self.output_path, e);
        }
        self.frame = Frame::new(0, 0);
        debug!(camera = self.id, "session closed");
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("id", &self.id)
            .field("fps", &self.fps)
            .field("output_path", &self.output_path)
            .field("transform", &self.transform)
            .field("read_failures", &self.read_failures)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Every open session, in discovery order
///
/// Membership is fixed once opened. Dropping the set closes every session.
#[derive(Debug, Default)]
pub struct SessionSet {
    sessions: Vec<CameraSession>,
}

impl SessionSet {
    /// Open a session for each id, skipping ids that fail
    ///
    /// Returns `NoCamerasAvailable` only if no id could be opened.
    pub fn open_all(
        ids: &[u32],
        config: &RunConfig,
        backend: &dyn CaptureBackend,
        writers: &dyn WriterFactory,
    ) -> Result<Self> {
        let mut sessions = Vec::with_capacity(ids.len());
        for &id in ids {
            let _span = info_span!("session", camera = id).entered();
            match CameraSession::open(id, config, backend, writers) {
                Ok(session) => sessions.push(session),
                Err(e) => warn!("Skipping camera: {}", e),
            }
        }

        if sessions.is_empty() {
            return Err(CamrecError::NoCamerasAvailable);
        }

        info!("Opened {} of {} camera(s)", sessions.len(), ids.len());
        Ok(Self { sessions })
    }

    pub fn from_sessions(sessions: Vec<CameraSession>) -> Self {
        Self { sessions }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CameraSession> {
        self.sessions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CameraSession> {
        self.sessions.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CameraSession> {
        self.sessions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CameraSession> {
        self.sessions.iter_mut()
    }

    /// Device ids in session order
    pub fn ids(&self) -> Vec<u32> {
        self.sessions.iter().map(|s| s.id).collect()
    }

    /// Flip every session between 0° and 180°
    pub fn toggle_rotation(&mut self) {
        for session in &mut self.sessions {
            session.transform.rotation = session.transform.rotation.toggled();
            info!(
                camera = session.id,
                "Rotation set to {}", session.transform.rotation
            );
        }
    }

    /// Flip every session's mirror flag
    pub fn toggle_mirror(&mut self) {
        for session in &mut self.sessions {
            session.transform.mirror = !session.transform.mirror;
            info!(
                camera = session.id,
                "Mirror {}",
                if session.transform.mirror { "on" } else { "off" }
            );
        }
    }

    /// Close every session; safe to call more than once
    pub fn close_all(&mut self) {
        for session in &mut self.sessions {
            session.close();
        }
    }
}

impl Drop for SessionSet {
    fn drop(&mut self) {
        self.close_all();
    }
}
