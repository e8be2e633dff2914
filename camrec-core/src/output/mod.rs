//! Video and image outputs
//!
//! - Per-camera recording (MPEG-4 in MP4 via FFmpeg, feature `ffmpeg`)
//! - JPEG snapshots

#[cfg(feature = "ffmpeg")]
mod file;
mod snapshot;

#[cfg(feature = "ffmpeg")]
pub use file::{FfmpegWriter, FfmpegWriterFactory};
pub use snapshot::{snapshot_path, JpegSnapshotWriter, SnapshotWriter};

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::frame::Frame;

/// Extension of recorded files
pub const RECORDING_EXTENSION: &str = "mp4";

/// A recording sink for one camera
pub trait VideoWriter {
    /// Encode and append one frame
    fn write(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and finalize the file; calling it again is a no-op
    fn close(&mut self) -> Result<()>;

    /// Where the recording goes
    fn path(&self) -> &Path;
}

/// Creates recording writers
pub trait WriterFactory {
    /// Open a writer for frames of `width` x `height` at `fps`
    fn create(&self, path: &Path, width: u32, height: u32, fps: f64) -> Result<Box<dyn VideoWriter>>;
}

/// Recording path for a camera: `<dir>/camera_<id>_<unix>.mp4`
///
/// When that file already exists (a restart within the same second), a
/// `_<n>` suffix is added until the name is free.
pub fn recording_path(dir: &Path, camera_id: u32, now: &DateTime<Local>) -> PathBuf {
    let stem = format!("camera_{}_{}", camera_id, now.timestamp());
    let mut path = dir.join(format!("{}.{}", stem, RECORDING_EXTENSION));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{}_{}.{}", stem, n, RECORDING_EXTENSION));
        n += 1;
    }
    path
}
