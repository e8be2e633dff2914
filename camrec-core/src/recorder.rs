//! Main recording loop
//!
//! Drives the pipeline over every session, shows either one tile or the
//! grid, polls one key and hands it to the controller. Tiles and the shown
//! image live for exactly one iteration; sessions are closed when the loop
//! ends, on every path out of it.

use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::capture::{detect_devices, CaptureBackend};
use crate::compositor::GridCompositor;
use crate::config::RunConfig;
use crate::controller::{ControlOutcome, Controller, SnapshotScope, KEY_LEGEND};
use crate::display::Display;
use crate::error::{CamrecError, Result};
use crate::frame::Frame;
use crate::output::{SnapshotWriter, WriterFactory};
use crate::overlay::FrameOverlay;
use crate::pipeline::{FramePipeline, Tile};
use crate::session::SessionSet;
use crate::types::ViewState;

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Exit,
}

/// A snapshot written during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub camera_id: u32,
    pub path: PathBuf,
    /// Overlay text burned into the image, `None` with the overlay off
    pub caption: Option<String>,
}

/// What a finished run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Loop iterations executed
    pub iterations: u64,
    /// Sessions that were recording
    pub sessions: usize,
    /// Snapshot files written, in order
    pub snapshots: Vec<SnapshotRecord>,
    /// One recording per session
    pub recordings: Vec<PathBuf>,
    /// Wall-clock duration of the loop in seconds
    pub elapsed_secs: f64,
}

/// How `start_capture` ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// No camera could be opened; the loop never started
    NoCameras,
    /// The loop ran and was exited with ESC
    Completed(RunSummary),
}

/// The interactive recorder
pub struct Recorder {
    config: RunConfig,
    sessions: SessionSet,
    pipeline: FramePipeline,
    compositor: GridCompositor,
    controller: Controller,
    display: Box<dyn Display>,
    snapshots: Box<dyn SnapshotWriter>,
    taken: Vec<SnapshotRecord>,
    iterations: u64,
}

impl Recorder {
    pub fn new(
        config: RunConfig,
        sessions: SessionSet,
        display: Box<dyn Display>,
        snapshots: Box<dyn SnapshotWriter>,
    ) -> Self {
        let (width, height) = config.cell_size();
        let overlay = FrameOverlay::enabled(config.overlay);
        Self {
            pipeline: FramePipeline::new(overlay, width, height),
            compositor: GridCompositor::new(width, height),
            controller: Controller::new(),
            config,
            sessions,
            display,
            snapshots,
            taken: Vec::new(),
            iterations: 0,
        }
    }

    pub fn view(&self) -> ViewState {
        self.controller.view()
    }

    pub fn sessions(&self) -> &SessionSet {
        &self.sessions
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Run one iteration: process, show, poll, react
    pub fn step(&mut self) -> StepOutcome {
        self.iterations += 1;
        let now = Local::now();
        let mut tiles = self.pipeline.process_all(self.sessions.iter_mut(), &now);

        let key = {
            let output = self.select_output(&tiles);
            if let Err(e) = self.display.show(&output) {
                warn!("Failed to show preview: {}", e);
            }
            self.display.poll_key(self.config.poll_timeout)
        };

        let outcome = match key {
            Some(code) => self.controller.handle_key(code, &mut self.sessions),
            None => ControlOutcome::Continue,
        };

        match outcome {
            ControlOutcome::Exit => StepOutcome::Exit,
            ControlOutcome::Snapshot(scope) => {
                self.take_snapshots(scope, &mut tiles, &now);
                StepOutcome::Continue
            }
            ControlOutcome::Continue => StepOutcome::Continue,
        }
    }

    /// Loop until ESC, then close every session
    pub fn run(mut self) -> RunSummary {
        let started = Instant::now();
        info!("Recording started with {} camera(s)", self.sessions.len());

        while self.step() == StepOutcome::Continue {}

        let recordings = self
            .sessions
            .iter()
            .map(|s| s.output_path().to_path_buf())
            .collect();
        self.sessions.close_all();

        let summary = RunSummary {
            iterations: self.iterations,
            sessions: self.sessions.len(),
            snapshots: std::mem::take(&mut self.taken),
            recordings,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        info!(
            "Recording stopped after {} iterations ({:.1}s)",
            summary.iterations, summary.elapsed_secs
        );
        summary
    }

    fn select_output<'t>(&self, tiles: &'t [Tile]) -> Cow<'t, Frame> {
        match self.controller.view() {
            ViewState::Single(i) => match tiles.get(i) {
                Some(tile) => Cow::Borrowed(tile.frame()),
                None => Cow::Owned(self.pipeline.placeholder()),
            },
            ViewState::Grid => {
                let frames: Vec<&Frame> = tiles.iter().map(Tile::frame).collect();
                Cow::Owned(self.compositor.compose(&frames))
            }
        }
    }

    /// Save this iteration's tiles for `scope`
    ///
    /// The overlay is drawn again before saving when enabled, so a tile that
    /// already carries it ends up with the text drawn twice.
    fn take_snapshots(&mut self, scope: SnapshotScope, tiles: &mut [Tile], now: &DateTime<Local>) {
        let indices: Vec<usize> = match scope {
            SnapshotScope::One(i) => vec![i],
            SnapshotScope::All => (0..tiles.len()).collect(),
        };

        for i in indices {
            let (Some(session), Some(tile)) = (self.sessions.get(i), tiles.get_mut(i)) else {
                debug!(index = i, "no tile to snapshot");
                continue;
            };
            let (id, fps) = (session.id(), session.fps());

            let caption = self.pipeline.overlay().render(tile.frame_mut(), id, fps, now);
            match self.snapshots.save(id, tile.frame(), now) {
                Ok(path) => self.taken.push(SnapshotRecord {
                    camera_id: id,
                    path,
                    caption,
                }),
                Err(e) => warn!(camera = id, "Failed to save snapshot: {}", e),
            }
        }
    }
}

/// Discover cameras, open sessions and run the recorder until ESC
///
/// Returns `RunOutcome::NoCameras` without touching the display when no
/// camera could be opened.
pub fn start_capture(
    config: RunConfig,
    backend: &dyn CaptureBackend,
    writers: &dyn WriterFactory,
    display: Box<dyn Display>,
    snapshots: Box<dyn SnapshotWriter>,
) -> Result<RunOutcome> {
    for warning in config.validate() {
        warn!("{}", warning);
    }
    config.validate_strict()?;

    let ids = detect_devices(backend, config.max_cameras);
    if ids.is_empty() {
        info!("No cameras detected");
        return Ok(RunOutcome::NoCameras);
    }

    let sessions = match SessionSet::open_all(&ids, &config, backend, writers) {
        Ok(sessions) => sessions,
        Err(CamrecError::NoCamerasAvailable) => {
            info!("None of the detected cameras could be opened");
            return Ok(RunOutcome::NoCameras);
        }
        Err(e) => return Err(e),
    };

    for line in KEY_LEGEND {
        info!("{}", line);
    }

    let recorder = Recorder::new(config, sessions, display, snapshots);
    Ok(RunOutcome::Completed(recorder.run()))
}
