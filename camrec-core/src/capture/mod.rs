//! Camera capture
//!
//! This module handles:
//! - The capture backend/device seams the session manager talks to
//! - Device discovery by a linear open/close probe
//! - The V4L2 backend (feature `v4l2`)

#[cfg(feature = "v4l2")]
pub mod v4l2;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Backend;

use tracing::{debug, info};

use crate::error::Result;
use crate::frame::Frame;

/// An open capture handle for one camera
pub trait CaptureDevice {
    /// Read the next frame into `frame`
    ///
    /// Implementations may replace the buffer. An empty buffer after `Ok`
    /// counts as an empty read.
    fn read(&mut self, frame: &mut Frame) -> Result<()>;

    /// Release the device; calling it again is a no-op
    fn close(&mut self) -> Result<()>;
}

/// Opens capture devices by numeric id
pub trait CaptureBackend {
    /// Open device `id` and request the given size and framerate
    ///
    /// Fails with `CamrecError::DeviceUnavailable` if the device cannot be
    /// opened or is not ready to stream.
    fn open(&self, id: u32, width: u32, height: u32, fps: f64) -> Result<Box<dyn CaptureDevice>>;

    /// Check whether `id` names an openable capture device, closing it again
    fn probe(&self, id: u32) -> bool;
}

/// Probe ids `0..max` in order and return the ones that open
pub fn detect_devices(backend: &dyn CaptureBackend, max: u32) -> Vec<u32> {
    info!("Started detecting available cameras.");
    let devices: Vec<u32> = (0..max)
        .filter(|&id| {
            let found = backend.probe(id);
            debug!(camera = id, found, "probed device");
            found
        })
        .collect();
    info!("Found {} camera(s): {:?}.", devices.len(), devices);
    devices
}
