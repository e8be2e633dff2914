//! Frame buffer primitives
//!
//! Every frame is a packed RGB8 `image::RgbImage`. These helpers cover the
//! handful of operations the pipeline and compositor need: blank
//! placeholders, flips, concatenation, resizing and conversion for the
//! preview window.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::types::{Rotation, Transform};

/// A captured or composited frame
pub type Frame = RgbImage;

/// Create a black frame
pub fn blank(width: u32, height: u32) -> Frame {
    RgbImage::new(width, height)
}

/// Whether a frame holds no pixels
pub fn is_empty(frame: &Frame) -> bool {
    frame.width() == 0 || frame.height() == 0
}

/// Apply rotation, then mirroring, to a copy of `frame`
///
/// Both steps work in place on the single copy, so no intermediate buffer
/// outlives this call.
pub fn transform(frame: &Frame, transform: Transform) -> Frame {
    let mut out = frame.clone();
    if transform.rotation == Rotation::Deg180 {
        imageops::rotate180_in_place(&mut out);
    }
    if transform.mirror {
        imageops::flip_horizontal_in_place(&mut out);
    }
    out
}

/// Place `right` to the right of `left`
pub fn hconcat(left: &Frame, right: &Frame) -> Frame {
    let mut out = RgbImage::new(
        left.width() + right.width(),
        left.height().max(right.height()),
    );
    imageops::replace(&mut out, left, 0, 0);
    imageops::replace(&mut out, right, i64::from(left.width()), 0);
    out
}

/// Place `bottom` below `top`
pub fn vconcat(top: &Frame, bottom: &Frame) -> Frame {
    let mut out = RgbImage::new(
        top.width().max(bottom.width()),
        top.height() + bottom.height(),
    );
    imageops::replace(&mut out, top, 0, 0);
    imageops::replace(&mut out, bottom, 0, i64::from(top.height()));
    out
}

/// Resize `frame` to exactly `width` x `height`, passing it through when it
/// already has that size
pub fn fit(frame: Frame, width: u32, height: u32) -> Frame {
    if frame.dimensions() == (width, height) {
        frame
    } else {
        imageops::resize(&frame, width, height, FilterType::Triangle)
    }
}

/// Convert to packed 0RGB u32 pixels for the preview window
pub fn to_argb(frame: &Frame) -> Vec<u32> {
    frame
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            ((r as u32) << 16) | ((g as u32) << 8) | b as u32
        })
        .collect()
}

/// Convert YUYV (YUV 4:2:2) data to an RGB frame
///
/// YUYV packs as `[Y0, U, Y1, V, ...]`; each pixel pair shares U and V.
/// Uses BT.601 coefficients. Returns `None` when `data` is shorter than
/// `width * height * 2` bytes.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Option<Frame> {
    let pixel_count = (width as usize) * (height as usize);
    let expected_len = pixel_count * 2;
    if data.len() < expected_len {
        return None;
    }

    let mut rgb = Vec::with_capacity(pixel_count * 3);
    for chunk in data[..expected_len].chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
            rgb.extend_from_slice(&[r, g, b]);
        }
    }

    RgbImage::from_raw(width, height, rgb)
}
