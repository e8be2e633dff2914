//! File recording output
//!
//! Encodes RGB frames with FFmpeg's MPEG-4 Part 2 encoder (the `mp4v`
//! fourcc) and muxes them into an MP4 container, one file per camera.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use ffmpeg::codec::{self, encoder};
use ffmpeg::format::{self, context::Output, Pixel};
use ffmpeg::software::scaling::{self, Flags};
use ffmpeg::util::frame::video::Video;
use ffmpeg::{Dictionary, Packet, Rational};
use ffmpeg_next as ffmpeg;

use super::{VideoWriter, WriterFactory};
use crate::error::{CamrecError, Result};
use crate::frame::Frame;

/// Bits per pixel per frame used to derive the target bitrate
const BITS_PER_PIXEL: f64 = 0.2;

/// Target bitrate in bits per second for a frame size and rate
pub fn suggested_bitrate(width: u32, height: u32, fps: f64) -> usize {
    (width as f64 * height as f64 * fps * BITS_PER_PIXEL) as usize
}

/// MP4 writer for one camera
pub struct FfmpegWriter {
    /// Output path
    path: PathBuf,
    /// FFmpeg output context
    output: Output,
    /// Opened MPEG-4 encoder
    encoder: encoder::Video,
    /// RGB24 -> YUV420P converter
    scaler: scaling::Context,
    /// Staging frame holding the RGB input
    rgb: Video,
    /// Converted frame fed to the encoder
    yuv: Video,
    /// Index of the video stream in the container
    stream_index: usize,
    /// Encoder time base (1/fps)
    time_base: Rational,
    /// Stream time base chosen by the muxer
    stream_time_base: Rational,
    /// Frames sent to the encoder
    frame_count: i64,
    /// Packets written to the file
    packets_written: u64,
    /// Whether the trailer has been written
    closed: bool,
}

impl FfmpegWriter {
    /// Create the file, open the encoder and write the container header
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32, fps: f64) -> Result<Self> {
        let path = path.into();

        ffmpeg::init().map_err(|e| CamrecError::encode(format!("FFmpeg init failed: {}", e)))?;

        let mut output = format::output(&path)
            .map_err(|e| CamrecError::encode(format!("Failed to create output file: {}", e)))?;

        let global_header = output
            .format()
            .flags()
            .contains(ffmpeg::format::Flags::GLOBAL_HEADER);

        let codec = encoder::find(codec::Id::MPEG4)
            .ok_or_else(|| CamrecError::encode("MPEG-4 encoder not found"))?;

        let mut video = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| CamrecError::encode(format!("Failed to create encoder context: {}", e)))?;

        let rate = fps.round().max(1.0) as i32;
        let time_base = Rational::new(1, rate);

        video.set_width(width);
        video.set_height(height);
        video.set_format(Pixel::YUV420P);
        video.set_time_base(time_base);
        video.set_frame_rate(Some(Rational::new(rate, 1)));
        video.set_bit_rate(suggested_bitrate(width, height, fps));
        if global_header {
            video.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let encoder = video
            .open_with(Dictionary::new())
            .map_err(|e| CamrecError::encode(format!("Failed to open encoder: {}", e)))?;

        {
            let mut stream = output
                .add_stream(codec::Id::MPEG4)
                .map_err(|e| CamrecError::encode(format!("Failed to add video stream: {}", e)))?;
            stream.set_parameters(&encoder);
            stream.set_time_base(time_base);
        }
        let stream_index = output.nb_streams() as usize - 1;

        output
            .write_header()
            .map_err(|e| CamrecError::encode(format!("Failed to write file header: {}", e)))?;

        let stream_time_base = output
            .stream(stream_index)
            .map(|s| s.time_base())
            .unwrap_or(time_base);

        let scaler = scaling::Context::get(
            Pixel::RGB24,
            width,
            height,
            Pixel::YUV420P,
            width,
            height,
            Flags::BILINEAR,
        )
        .map_err(|e| CamrecError::encode(format!("Failed to create scaler: {}", e)))?;

        info!(
            "Recording {:?} ({}x{} @ {}fps, {} kbps)",
            path,
            width,
            height,
            rate,
            suggested_bitrate(width, height, fps) / 1000
        );

        Ok(Self {
            path,
            output,
            encoder,
            scaler,
            rgb: Video::new(Pixel::RGB24, width, height),
            yuv: Video::new(Pixel::YUV420P, width, height),
            stream_index,
            time_base,
            stream_time_base,
            frame_count: 0,
            packets_written: 0,
            closed: false,
        })
    }

    /// Copy a tightly packed RGB frame into the strided staging frame
    fn stage(&mut self, frame: &Frame) -> Result<()> {
        let (width, height) = (self.encoder.width(), self.encoder.height());
        if frame.dimensions() != (width, height) {
            return Err(CamrecError::encode(format!(
                "Frame is {}x{}, recording expects {}x{}",
                frame.width(),
                frame.height(),
                width,
                height
            )));
        }

        let row_len = width as usize * 3;
        let stride = self.rgb.stride(0);
        let plane = self.rgb.data_mut(0);
        for (y, row) in frame.as_raw().chunks_exact(row_len).enumerate() {
            let start = y * stride;
            plane[start..start + row_len].copy_from_slice(row);
        }
        Ok(())
    }

    /// Pull every ready packet from the encoder into the file
    fn drain_packets(&mut self) -> Result<()> {
        let mut packet = Packet::empty();
        loop {
            match self.encoder.receive_packet(&mut packet) {
                Ok(()) => {
                    packet.set_stream(self.stream_index);
                    packet.rescale_ts(self.time_base, self.stream_time_base);
                    packet.write_interleaved(&mut self.output).map_err(|e| {
                        CamrecError::encode(format!("Failed to write video packet: {}", e))
                    })?;
                    self.packets_written += 1;
                }
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => break,
                Err(ffmpeg::Error::Eof) => break,
                Err(e) => {
                    return Err(CamrecError::encode(format!(
                        "Failed to receive packet: {}",
                        e
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of packets written so far
    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }
}

impl VideoWriter for FfmpegWriter {
    fn write(&mut self, frame: &Frame) -> Result<()> {
        if self.closed {
            return Err(CamrecError::encode("Writer already closed"));
        }

        self.stage(frame)?;
        self.scaler
            .run(&self.rgb, &mut self.yuv)
            .map_err(|e| CamrecError::encode(format!("Scaling failed: {}", e)))?;

        self.yuv.set_pts(Some(self.frame_count));
        self.frame_count += 1;

        self.encoder
            .send_frame(&self.yuv)
            .map_err(|e| CamrecError::encode(format!("Failed to send frame: {}", e)))?;

        self.drain_packets()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.encoder
            .send_eof()
            .map_err(|e| CamrecError::encode(format!("Failed to send EOF: {}", e)))?;
        self.drain_packets()?;
        self.output
            .write_trailer()
            .map_err(|e| CamrecError::encode(format!("Failed to write file trailer: {}", e)))?;

        info!(
            "Recording complete: {:?} ({} frames, {} packets)",
            self.path, self.frame_count, self.packets_written
        );
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Failed to finalize {:?} on drop: {}", self.path, e);
        }
    }
}

/// Creates `FfmpegWriter`s
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegWriterFactory;

impl WriterFactory for FfmpegWriterFactory {
    fn create(&self, path: &Path, width: u32, height: u32, fps: f64) -> Result<Box<dyn VideoWriter>> {
        debug!("Creating MP4 writer at {:?}", path);
        Ok(Box::new(FfmpegWriter::new(path, width, height, fps)?))
    }
}
