//! JPEG snapshots of single frames

use chrono::{DateTime, Local};
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CamrecError, Result};
use crate::frame::Frame;

/// Saves still images on demand
pub trait SnapshotWriter {
    /// Write `frame` for `camera_id` and return the file it went to
    fn save(&mut self, camera_id: u32, frame: &Frame, now: &DateTime<Local>) -> Result<PathBuf>;
}

/// Snapshot path for a camera: `<dir>/snapshot_cam<id>_<unix>.jpg`
pub fn snapshot_path(dir: &Path, camera_id: u32, now: &DateTime<Local>) -> PathBuf {
    dir.join(format!("snapshot_cam{}_{}.jpg", camera_id, now.timestamp()))
}

/// Writes snapshots as JPEG files into one directory
#[derive(Debug, Clone)]
pub struct JpegSnapshotWriter {
    dir: PathBuf,
}

impl JpegSnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotWriter for JpegSnapshotWriter {
    fn save(&mut self, camera_id: u32, frame: &Frame, now: &DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CamrecError::snapshot(format!("cannot create {:?}: {}", self.dir, e))
        })?;

        let path = snapshot_path(&self.dir, camera_id, now);
        frame
            .save_with_format(&path, ImageFormat::Jpeg)
            .map_err(|e| CamrecError::snapshot(format!("cannot write {:?}: {}", path, e)))?;

        info!(camera = camera_id, "Snapshot saved: {:?}", path);
        Ok(path)
    }
}
