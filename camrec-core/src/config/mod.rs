//! Configuration types for camrec
//!
//! `RunConfig` is the immutable snapshot handed to the recorder; `ConfigFile`
//! is the optional TOML file it can be built from.

mod file;

pub use file::{sample_config, ConfigFile, PreviewSettings, RecordingSettings, SnapshotSettings};

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CamrecError, Result};

/// Default number of device ids probed
pub const DEFAULT_MAX_CAMERAS: u32 = 10;
/// Default recording directory
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
/// Default snapshot directory
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";
/// Default capture width
pub const DEFAULT_WIDTH: f64 = 640.0;
/// Default capture height
pub const DEFAULT_HEIGHT: f64 = 480.0;
/// Default target framerate
pub const DEFAULT_FPS: f64 = 30.0;
/// Default preview window title
pub const DEFAULT_WINDOW_TITLE: &str = "Multi-Camera Viewer";
/// Default key-poll wait per iteration
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Runtime configuration consumed by the recorder
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Number of device ids to probe, starting at 0
    pub max_cameras: u32,
    /// Directory receiving one recording per camera
    pub output_dir: PathBuf,
    /// Directory receiving snapshots
    pub snapshot_dir: PathBuf,
    /// Capture width in pixels
    pub width: f64,
    /// Capture height in pixels
    pub height: f64,
    /// Target framerate
    pub fps: f64,
    /// Burn camera id, time and fps into every frame
    pub overlay: bool,
    /// How long each iteration waits for a key
    pub poll_timeout: Duration,
    /// Preview window title
    pub window_title: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_cameras: DEFAULT_MAX_CAMERAS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            overlay: true,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
        }
    }
}

impl RunConfig {
    /// Set the number of device ids to probe
    pub fn with_max_cameras(mut self, max: u32) -> Self {
        self.max_cameras = max;
        self
    }

    /// Set the recording directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the snapshot directory
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Set the capture size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the target framerate
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Enable or disable the text overlay
    pub fn with_overlay(mut self, enabled: bool) -> Self {
        self.overlay = enabled;
        self
    }

    /// Set the key-poll wait
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the preview window title
    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    /// Frame width in whole pixels
    pub fn frame_width(&self) -> u32 {
        self.width.round() as u32
    }

    /// Frame height in whole pixels
    pub fn frame_height(&self) -> u32 {
        self.height.round() as u32
    }

    /// Size of one grid cell (and of every recorded frame)
    pub fn cell_size(&self) -> (u32, u32) {
        (self.frame_width(), self.frame_height())
    }

    /// Validate the configuration and return any warnings
    ///
    /// An empty list means the configuration looks good.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let (width, height) = self.cell_size();
        if width % 2 != 0 || height % 2 != 0 {
            warnings.push(format!(
                "Frame size {}x{} is odd; the MPEG-4 encoder needs even dimensions",
                width, height
            ));
        }

        if self.max_cameras > 64 {
            warnings.push(format!(
                "Probing {} device ids one by one will slow down startup",
                self.max_cameras
            ));
        }

        if self.fps > 120.0 {
            warnings.push(format!(
                "{} fps is higher than most USB cameras deliver; the loop will run slower",
                self.fps
            ));
        }

        warnings
    }

    /// Validate and return an error if the configuration cannot work
    pub fn validate_strict(&self) -> Result<()> {
        if self.max_cameras == 0 {
            return Err(CamrecError::config(
                "number of cameras must be greater than zero",
            ));
        }
        if !(self.width > 0.0) {
            return Err(CamrecError::config("width must be greater than zero"));
        }
        if !(self.height > 0.0) {
            return Err(CamrecError::config("height must be greater than zero"));
        }
        if !(self.fps > 0.0) {
            return Err(CamrecError::config("fps must be greater than zero"));
        }
        if self.frame_width() == 0 || self.frame_height() == 0 {
            return Err(CamrecError::config(format!(
                "Resolution {}x{} rounds to zero pixels",
                self.width, self.height
            )));
        }
        if self.frame_width() > 7680 || self.frame_height() > 4320 {
            return Err(CamrecError::config(format!(
                "Resolution {}x{} exceeds maximum supported (7680x4320)",
                self.frame_width(),
                self.frame_height()
            )));
        }
        Ok(())
    }
}
