//! Configuration file loading and merging
//!
//! Loads user configuration from `~/.config/camrec/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    RunConfig, DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_MAX_CAMERAS, DEFAULT_OUTPUT_DIR,
    DEFAULT_SNAPSHOT_DIR, DEFAULT_WIDTH, DEFAULT_WINDOW_TITLE,
};
use crate::error::{CamrecError, Result};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Capture and recording settings
    #[serde(default)]
    pub recording: RecordingSettings,

    /// Preview window settings
    #[serde(default)]
    pub preview: PreviewSettings,

    /// Snapshot settings
    #[serde(default)]
    pub snapshots: SnapshotSettings,
}

/// Capture and recording settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSettings {
    /// Number of device ids to probe
    #[serde(default = "default_max_cameras")]
    pub max_cameras: u32,

    /// Directory for recordings
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Capture width in pixels
    #[serde(default = "default_width")]
    pub width: f64,

    /// Capture height in pixels
    #[serde(default = "default_height")]
    pub height: f64,

    /// Target framerate
    #[serde(default = "default_fps")]
    pub fps: f64,

    /// Burn camera id, time and fps into frames
    #[serde(default = "default_true")]
    pub overlay: bool,
}

/// Preview window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSettings {
    /// Window title
    #[serde(default = "default_window_title")]
    pub title: String,

    /// Key-poll wait per iteration, in milliseconds
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

/// Snapshot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSettings {
    /// Directory for snapshots
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,
}

// Default value functions
fn default_max_cameras() -> u32 {
    DEFAULT_MAX_CAMERAS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_DIR)
}

fn default_width() -> f64 {
    DEFAULT_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_HEIGHT
}

fn default_fps() -> f64 {
    DEFAULT_FPS
}

fn default_true() -> bool {
    true
}

fn default_window_title() -> String {
    DEFAULT_WINDOW_TITLE.to_string()
}

fn default_poll_ms() -> u64 {
    1
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            max_cameras: default_max_cameras(),
            output_dir: default_output_dir(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            overlay: true,
        }
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            title: default_window_title(),
            poll_ms: default_poll_ms(),
        }
    }
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            dir: default_snapshot_dir(),
        }
    }
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("camrec").join("config.toml")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("camrec")
                .join("config.toml")
        } else {
            PathBuf::from("/etc/camrec/config.toml")
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CamrecError::config(format!("Failed to read config file: {}", e)))?;

        let config: ConfigFile = toml::from_str(&content)?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, logging warnings but returning defaults on error
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CamrecError::config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content)
            .map_err(|e| CamrecError::config(format!("Failed to write config file: {}", e)))?;

        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Build the runtime configuration described by this file
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            max_cameras: self.recording.max_cameras,
            output_dir: self.recording.output_dir.clone(),
            snapshot_dir: self.snapshots.dir.clone(),
            width: self.recording.width,
            height: self.recording.height,
            fps: self.recording.fps,
            overlay: self.recording.overlay,
            poll_timeout: Duration::from_millis(self.preview.poll_ms),
            window_title: self.preview.title.clone(),
        }
    }
}

/// Generate a sample configuration file
pub fn sample_config() -> String {
    r#"# camrec configuration

[recording]
# Number of device ids to probe (/dev/video0 .. /dev/video<n-1>)
max_cameras = 10

# One camera_<id>_<unix time>.mp4 per camera is written here
output_dir = "./output"

# Capture size and framerate requested from every camera
width = 640.0
height = 480.0
fps = 30.0

# Burn "Cam <id> | <time> | <fps> FPS" into recorded frames
overlay = true

[preview]
# Window title
title = "Multi-Camera Viewer"

# How long each loop iteration waits for a key, in milliseconds
poll_ms = 1

[snapshots]
# Press 's' to write snapshot_cam<id>_<unix time>.jpg here
dir = "snapshots"
"#
    .to_string()
}
