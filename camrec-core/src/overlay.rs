//! Text overlay rendering for camrec
//!
//! Burns `Cam <id> | <timestamp> | <fps> FPS` into RGB frames.
//! Uses a simple 5x7 bitmap font so no font files are needed.

use chrono::{DateTime, Local};

use crate::frame::Frame;

/// Timestamp layout used in the overlay text
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Configuration for the text overlay
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Whether the overlay is drawn at all
    pub enabled: bool,
    /// Top-left corner of the text, in pixels
    pub origin: (u32, u32),
    /// Font scale (1.0 = 7px glyph height)
    pub font_scale: f32,
    /// Text colour, RGB
    pub color: [u8; 3],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origin: (10, 10),
            font_scale: 2.0,
            color: [255, 0, 0],
        }
    }
}

/// Format the overlay line for one camera
pub fn overlay_text(camera_id: u32, now: &DateTime<Local>, fps: f64) -> String {
    format!(
        "Cam {} | {} | {:.2} FPS",
        camera_id,
        now.format(TIMESTAMP_FORMAT),
        fps
    )
}

/// Overlay renderer
#[derive(Debug, Clone)]
pub struct FrameOverlay {
    config: OverlayConfig,
}

impl FrameOverlay {
    /// Create a new overlay renderer with config
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    /// Create a renderer that is on or off with default styling
    pub fn enabled(enabled: bool) -> Self {
        Self::new(OverlayConfig {
            enabled,
            ..Default::default()
        })
    }

    /// Check if overlay is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get current configuration
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Draw the camera line onto `frame`
    ///
    /// Returns the text that was drawn, or `None` when the overlay is
    /// disabled. Drawing twice draws twice; nothing tracks whether a frame
    /// already carries text.
    pub fn render(
        &self,
        frame: &mut Frame,
        camera_id: u32,
        fps: f64,
        now: &DateTime<Local>,
    ) -> Option<String> {
        if !self.config.enabled {
            return None;
        }

        let text = overlay_text(camera_id, now, fps);
        let (x, y) = self.config.origin;
        self.draw_text(frame, x, y, &text);
        Some(text)
    }

    /// Draw text using the bitmap font
    fn draw_text(&self, frame: &mut Frame, x: u32, y: u32, text: &str) {
        let char_width = (6.0 * self.config.font_scale) as u32;

        for (i, ch) in text.chars().enumerate() {
            let char_x = x + i as u32 * char_width;
            if char_x >= frame.width() {
                break;
            }
            self.draw_char(frame, char_x, y, ch);
        }
    }

    /// Draw a single character using the 5x7 bitmap font
    fn draw_char(&self, frame: &mut Frame, x: u32, y: u32, ch: char) {
        let scale = self.config.font_scale;
        let block = scale.ceil() as u32;
        let (width, height) = frame.dimensions();
        let color = image::Rgb(self.config.color);

        for (row, &bits) in get_char_bitmap(ch).iter().enumerate() {
            for col in 0..5 {
                if (bits >> (4 - col)) & 1 == 0 {
                    continue;
                }
                let px = x + (col as f32 * scale) as u32;
                let py = y + (row as f32 * scale) as u32;

                for dy in 0..block {
                    for dx in 0..block {
                        let fx = px + dx;
                        let fy = py + dy;
                        if fx < width && fy < height {
                            frame.put_pixel(fx, fy, color);
                        }
                    }
                }
            }
        }
    }
}

/// Get 5x7 bitmap for a character
/// Each byte represents one row, with 5 bits used (high bits)
fn get_char_bitmap(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'a' | 'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'c' | 'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'f' | 'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'm' | 'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'p' | 'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        's' | 'S' => [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00000, 0b00100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100],
        '|' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        _ => [0b00000; 7],
    }
}
