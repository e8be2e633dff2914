//! Interactive controller
//!
//! Maps polled key codes to view changes, transform toggles, snapshots and
//! exit. The view is the only state kept here; rotation and mirror live on
//! each session.

use tracing::{debug, info};

use crate::session::SessionSet;
use crate::types::ViewState;

/// Key code for Escape
pub const KEY_ESC: u32 = 27;

/// Help lines describing the key bindings
pub const KEY_LEGEND: &[&str] = &[
    "ESC: exit",
    "1-9: show a single camera",
    "0: show the grid",
    "s: snapshot (current camera, or every camera in grid view)",
    "r: rotate every camera by 180°",
    "m: mirror every camera",
];

/// A decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Exit,
    Digit(u8),
    Snapshot,
    Rotate,
    Mirror,
    Ignored,
}

impl KeyCommand {
    pub fn from_code(code: u32) -> Self {
        if code == KEY_ESC {
            return Self::Exit;
        }
        match char::from_u32(code) {
            Some(c @ '0'..='9') => Self::Digit(c as u8 - b'0'),
            Some('s' | 'S') => Self::Snapshot,
            Some('r' | 'R') => Self::Rotate,
            Some('m' | 'M') => Self::Mirror,
            _ => Self::Ignored,
        }
    }
}

/// Which sessions a snapshot covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotScope {
    One(usize),
    All,
}

/// What the main loop does after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Continue,
    Exit,
    Snapshot(SnapshotScope),
}

/// View state machine
#[derive(Debug, Default, Clone)]
pub struct Controller {
    view: ViewState,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Apply one key to the view and the sessions
    pub fn handle(&mut self, command: KeyCommand, sessions: &mut SessionSet) -> ControlOutcome {
        match command {
            KeyCommand::Exit => {
                info!("Exit requested");
                ControlOutcome::Exit
            }
            KeyCommand::Digit(d) => {
                let index = (d as usize).checked_sub(1);
                self.view = ViewState::select(index, sessions.len());
                info!("Showing {}", self.view);
                ControlOutcome::Continue
            }
            KeyCommand::Snapshot => match self.view {
                ViewState::Single(i) => ControlOutcome::Snapshot(SnapshotScope::One(i)),
                ViewState::Grid => ControlOutcome::Snapshot(SnapshotScope::All),
            },
            KeyCommand::Rotate => {
                sessions.toggle_rotation();
                ControlOutcome::Continue
            }
            KeyCommand::Mirror => {
                sessions.toggle_mirror();
                ControlOutcome::Continue
            }
            KeyCommand::Ignored => ControlOutcome::Continue,
        }
    }

    /// Decode and apply a raw key code
    pub fn handle_key(&mut self, code: u32, sessions: &mut SessionSet) -> ControlOutcome {
        let command = KeyCommand::from_code(code);
        debug!(code, ?command, "key");
        self.handle(command, sessions)
    }
}
