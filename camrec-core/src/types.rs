//! Core types for camrec
//!
//! Plain data records shared by the session manager, the frame pipeline and
//! the controller.

use serde::{Deserialize, Serialize};

/// Frame rotation; only the two orientations a camera can be mounted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg180,
}

impl Rotation {
    /// The other orientation
    pub fn toggled(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg180,
            Self::Deg180 => Self::Deg0,
        }
    }

    /// Rotation in degrees
    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg180 => 180,
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Per-session transform flags, read at the start of every Transform step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transform {
    pub rotation: Rotation,
    pub mirror: bool,
}

impl Transform {
    /// Whether applying this transform leaves the frame unchanged
    pub fn is_identity(&self) -> bool {
        self.rotation == Rotation::Deg0 && !self.mirror
    }
}

/// What the preview window currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Mosaic of every session
    #[default]
    Grid,
    /// One session, by position in the session set
    Single(usize),
}

impl ViewState {
    /// Build a view for `index`, falling back to the grid when out of range
    pub fn select(index: Option<usize>, session_count: usize) -> Self {
        match index {
            Some(i) if i < session_count => Self::Single(i),
            _ => Self::Grid,
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grid => write!(f, "grid"),
            Self::Single(i) => write!(f, "camera #{}", i + 1),
        }
    }
}
