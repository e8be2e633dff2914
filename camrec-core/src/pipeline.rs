//! Per-session frame pipeline
//!
//! Each iteration every session goes through acquire, transform, overlay and
//! record, in that order. The resulting tile is both what was recorded and
//! what the compositor displays.

use chrono::{DateTime, Local};
use tracing::{debug, info, info_span, trace, warn};

use crate::frame::{self, Frame};
use crate::overlay::FrameOverlay;
use crate::session::CameraSession;

/// One session's output for one iteration
#[derive(Debug, Clone)]
pub enum Tile {
    /// A captured, transformed and recorded frame
    Live(Frame),
    /// Blank stand-in for a failed or empty read; never recorded
    Placeholder(Frame),
}

impl Tile {
    pub fn frame(&self) -> &Frame {
        match self {
            Self::Live(frame) | Self::Placeholder(frame) => frame,
        }
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        match self {
            Self::Live(frame) | Self::Placeholder(frame) => frame,
        }
    }

    pub fn into_frame(self) -> Frame {
        match self {
            Self::Live(frame) | Self::Placeholder(frame) => frame,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// Runs acquire -> transform -> overlay -> record for a session
#[derive(Debug, Clone)]
pub struct FramePipeline {
    overlay: FrameOverlay,
    cell_width: u32,
    cell_height: u32,
}

impl FramePipeline {
    pub fn new(overlay: FrameOverlay, cell_width: u32, cell_height: u32) -> Self {
        Self {
            overlay,
            cell_width,
            cell_height,
        }
    }

    pub fn overlay(&self) -> &FrameOverlay {
        &self.overlay
    }

    /// Blank frame of the configured cell size
    pub fn placeholder(&self) -> Frame {
        frame::blank(self.cell_width, self.cell_height)
    }

    /// Process one session for this iteration
    ///
    /// A failed or empty read yields a placeholder and leaves the session
    /// open. Only the first failure of a streak is logged as a warning. A
    /// failed write is logged; the tile is still returned.
    pub fn process(&self, session: &mut CameraSession, now: &DateTime<Local>) -> Tile {
        let id = session.id();
        let fps = session.fps();
        let transform = session.transform;
        let _span = info_span!("session", camera = id).entered();

        let mut tile = match session.acquire() {
            Ok(raw) => frame::transform(raw, transform),
            Err(e) => {
                match session.note_read_failure() {
                    1 => warn!("Failed to read frame: {}", e),
                    n => debug!("Failed to read frame ({} in a row): {}", n, e),
                }
                return Tile::Placeholder(self.placeholder());
            }
        };

        let missed = session.clear_read_failures();
        if missed > 0 {
            info!("Camera recovered after {} failed read(s)", missed);
        }

        self.overlay.render(&mut tile, id, fps, now);

        if let Err(e) = session.record(&tile) {
            warn!("Failed to record frame: {}", e);
        } else {
            trace!("frame recorded");
        }

        Tile::Live(tile)
    }

    /// Process every session in order
    pub fn process_all<'a>(
        &self,
        sessions: impl Iterator<Item = &'a mut CameraSession>,
        now: &DateTime<Local>,
    ) -> Vec<Tile> {
        sessions.map(|session| self.process(session, now)).collect()
    }
}
