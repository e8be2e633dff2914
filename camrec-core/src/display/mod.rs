//! Preview display
//!
//! The main loop shows one image and polls one key per iteration through
//! the `Display` trait. The minifb window lives behind feature `window`.

#[cfg(feature = "window")]
mod window;

#[cfg(feature = "window")]
pub use window::MinifbDisplay;

use std::time::Duration;

use crate::error::Result;
use crate::frame::Frame;

/// A surface that shows frames and reports key presses
pub trait Display {
    /// Show `frame`, replacing whatever was shown before
    fn show(&mut self, frame: &Frame) -> Result<()>;

    /// Wait up to `timeout` for a key and return its code
    ///
    /// Codes follow ASCII: 27 for Escape, `'0'..='9'` for digits, lowercase
    /// letters for letter keys.
    fn poll_key(&mut self, timeout: Duration) -> Option<u32>;
}
