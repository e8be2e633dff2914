//! V4L2 capture backend
//!
//! Camera ids map to `/dev/video<id>`. Devices are asked for MJPEG first and
//! YUYV second; frames are decoded to RGB and resized to the requested size
//! when the driver picked a different one.

use image::ImageFormat;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::capability::Flags as CapabilityFlags;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

use super::{CaptureBackend, CaptureDevice};
use crate::error::{CamrecError, Result};
use crate::frame::{self, Frame};

// mmap buffers queued per device
const BUFFER_COUNT: u32 = 4;

/// Pixel layout negotiated with the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelLayout {
    Mjpeg,
    Yuyv,
}

/// Opens `/dev/video<id>` devices
#[derive(Debug, Default, Clone, Copy)]
pub struct V4l2Backend;

impl V4l2Backend {
    pub fn new() -> Self {
        Self
    }

    fn is_capture_device(device: &Device) -> bool {
        device
            .query_caps()
            .map(|caps| caps.capabilities.contains(CapabilityFlags::VIDEO_CAPTURE))
            .unwrap_or(false)
    }

    fn negotiate_format(device: &Device, id: u32, width: u32, height: u32) -> Result<(PixelLayout, Format)> {
        for (fourcc, layout) in [
            (FourCC::new(b"MJPG"), PixelLayout::Mjpeg),
            (FourCC::new(b"YUYV"), PixelLayout::Yuyv),
        ] {
            let actual = Capture::set_format(device, &Format::new(width, height, fourcc))
                .map_err(|e| CamrecError::device_unavailable(id, e.to_string()))?;
            if actual.fourcc == fourcc {
                return Ok((layout, actual));
            }
        }
        Err(CamrecError::device_unavailable(
            id,
            "device supports neither MJPEG nor YUYV",
        ))
    }
}

impl CaptureBackend for V4l2Backend {
    fn open(&self, id: u32, width: u32, height: u32, fps: f64) -> Result<Box<dyn CaptureDevice>> {
        let device = Device::new(id as usize)
            .map_err(|e| CamrecError::device_unavailable(id, e.to_string()))?;

        if !Self::is_capture_device(&device) {
            return Err(CamrecError::device_unavailable(
                id,
                "not a video capture device",
            ));
        }

        let (layout, format) = Self::negotiate_format(&device, id, width, height)?;
        if (format.width, format.height) != (width, height) {
            warn!(
                camera = id,
                "driver chose {}x{} instead of {}x{}; frames will be resized",
                format.width, format.height, width, height
            );
        }

        // A refused framerate is not fatal; the loop paces itself anyway
        let params = v4l::video::capture::Parameters::with_fps(fps.round().max(1.0) as u32);
        if let Err(e) = Capture::set_params(&device, &params) {
            warn!(camera = id, "Failed to set {} fps: {}", fps, e);
        }

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|e| CamrecError::device_unavailable(id, format!("stream not ready: {}", e)))?;

        info!(
            camera = id,
            "Opened /dev/video{} ({:?} {}x{})", id, layout, format.width, format.height
        );

        Ok(Box::new(V4l2Device {
            id,
            stream: Some(stream),
            layout,
            native_size: (format.width, format.height),
            target_size: (width, height),
        }))
    }

    fn probe(&self, id: u32) -> bool {
        match Device::new(id as usize) {
            Ok(device) => Self::is_capture_device(&device),
            Err(e) => {
                debug!(camera = id, "probe failed: {}", e);
                false
            }
        }
    }
}

/// An open V4L2 capture stream
pub struct V4l2Device {
    id: u32,
    stream: Option<MmapStream<'static>>,
    layout: PixelLayout,
    native_size: (u32, u32),
    target_size: (u32, u32),
}

impl CaptureDevice for V4l2Device {
    fn read(&mut self, out: &mut Frame) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CamrecError::capture(format!("camera {} is closed", self.id)))?;

        let (data, metadata) =
            CaptureStream::next(stream).map_err(|e| CamrecError::capture(e.to_string()))?;

        let used = (metadata.bytesused as usize).min(data.len());
        if used == 0 {
            return Err(CamrecError::EmptyFrameRead(self.id));
        }
        let bytes = &data[..used];

        let decoded = match self.layout {
            PixelLayout::Mjpeg => {
                image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?.to_rgb8()
            }
            PixelLayout::Yuyv => {
                let (width, height) = self.native_size;
                frame::yuyv_to_rgb(bytes, width, height)
                    .ok_or(CamrecError::EmptyFrameRead(self.id))?
            }
        };

        let (width, height) = self.target_size;
        *out = frame::fit(decoded, width, height);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.stream.take().is_some() {
            debug!(camera = self.id, "capture stream closed");
        }
        Ok(())
    }
}

impl Drop for V4l2Device {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
