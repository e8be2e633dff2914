//! camrec Core Library
//!
//! Multi-camera recording with a live preview.
//!
//! This library provides:
//! - Camera discovery and capture via V4L2
//! - One MPEG-4 recording per camera via FFmpeg
//! - A preview window showing one camera or a grid of all of them
//! - Keyboard control of view, rotation, mirroring and snapshots
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐    ┌────────────────────┐    ┌────────────┐    ┌─────────┐
//! │ Sessions  │───▶│ Pipeline           │───▶│ Compositor │───▶│ Display │
//! │ (V4L2 in) │    │ transform/overlay/ │    │ (grid)     │    │ (keys)  │
//! └───────────┘    │ record (FFmpeg)    │    └────────────┘    └────┬────┘
//!       ▲          └────────────────────┘                           │
//!       └──────────────────── Controller ◀──────────────────────────┘
//! ```

pub mod capture;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod frame;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod recorder;
pub mod session;
pub mod types;

pub use capture::{detect_devices, CaptureBackend, CaptureDevice};
pub use compositor::{GridCompositor, GridLayout};
pub use config::{ConfigFile, RunConfig};
pub use controller::{ControlOutcome, Controller, KeyCommand, SnapshotScope, KEY_ESC};
pub use display::Display;
pub use error::{CamrecError, Result};
pub use frame::Frame;
pub use output::{JpegSnapshotWriter, SnapshotWriter, VideoWriter, WriterFactory};
pub use pipeline::{FramePipeline, Tile};
pub use recorder::{
    start_capture, Recorder, RunOutcome, RunSummary, SnapshotRecord, StepOutcome,
};
pub use session::{CameraSession, SessionSet};
pub use types::{Rotation, Transform, ViewState};
