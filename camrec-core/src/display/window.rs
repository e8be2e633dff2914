//! minifb preview window

use minifb::{Key, KeyRepeat, Scale, ScaleMode, Window, WindowOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use super::Display;
use crate::controller::KEY_ESC;
use crate::error::{CamrecError, Result};
use crate::frame::{self, Frame};

/// The window operations the display relies on
///
/// `present` is the only call that pumps window events. minifb reports a key
/// as pressed for exactly one event pump after the one that saw it go down,
/// so pumping more than once per iteration can skip a press entirely.
trait PreviewWindow {
    /// Blit `buffer` and pump events
    fn present(&mut self, buffer: &[u32], width: usize, height: usize) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Keys that went down since the previous pump
    fn keys_pressed(&self) -> Vec<Key>;
}

impl PreviewWindow for Window {
    fn present(&mut self, buffer: &[u32], width: usize, height: usize) -> Result<()> {
        self.update_with_buffer(buffer, width, height)?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        Window::is_open(self)
    }

    fn keys_pressed(&self) -> Vec<Key> {
        self.get_keys_pressed(KeyRepeat::No)
    }
}

/// Preview window, created on the first frame shown
pub struct MinifbDisplay {
    title: String,
    window: Option<Box<dyn PreviewWindow>>,
    buffer: Vec<u32>,
}

impl MinifbDisplay {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            window: None,
            buffer: Vec::new(),
        }
    }

    fn open(&self, width: u32, height: u32) -> Result<Box<dyn PreviewWindow>> {
        let options = WindowOptions {
            resize: true,
            scale: Scale::X1,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        };
        let mut window = Window::new(&self.title, width as usize, height as usize, options)?;
        // The loop paces itself with the key poll
        window.set_target_fps(0);
        info!("Opened preview window {:?} ({}x{})", self.title, width, height);
        Ok(Box::new(window))
    }
}

impl Display for MinifbDisplay {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        if frame::is_empty(frame) {
            return Err(CamrecError::display("nothing to show"));
        }

        if self.window.is_none() {
            self.window = Some(self.open(frame.width(), frame.height())?);
        }

        self.buffer = frame::to_argb(frame);
        let window = self
            .window
            .as_mut()
            .ok_or_else(|| CamrecError::display("window not open"))?;
        window.present(&self.buffer, frame.width() as usize, frame.height() as usize)
    }

    /// Reads the key state left by the last `show`; never pumps events itself
    fn poll_key(&mut self, timeout: Duration) -> Option<u32> {
        thread::sleep(timeout);

        let window = self.window.as_ref()?;
        if !window.is_open() {
            debug!("preview window closed");
            return Some(KEY_ESC);
        }

        window.keys_pressed().into_iter().find_map(key_code)
    }
}

/// ASCII code for the keys the controller understands
fn key_code(key: Key) -> Option<u32> {
    let c = match key {
        Key::Escape => return Some(KEY_ESC),
        Key::Key0 | Key::NumPad0 => '0',
        Key::Key1 | Key::NumPad1 => '1',
        Key::Key2 | Key::NumPad2 => '2',
        Key::Key3 | Key::NumPad3 => '3',
        Key::Key4 | Key::NumPad4 => '4',
        Key::Key5 | Key::NumPad5 => '5',
        Key::Key6 | Key::NumPad6 => '6',
        Key::Key7 | Key::NumPad7 => '7',
        Key::Key8 | Key::NumPad8 => '8',
        Key::Key9 | Key::NumPad9 => '9',
        Key::M => 'm',
        Key::R => 'r',
        Key::S => 's',
        _ => return None,
    };
    Some(c as u32)
}
