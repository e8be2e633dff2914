//! Error types for camrec

use thiserror::Error;

/// Result type alias using CamrecError
pub type Result<T> = std::result::Result<T, CamrecError>;

/// Main error type for camrec operations
#[derive(Debug, Error)]
pub enum CamrecError {
    /// Capture device could not be opened or is not ready
    #[error("Camera {id} unavailable: {reason}")]
    DeviceUnavailable { id: u32, reason: String },

    /// Recording writer could not be created for a session
    #[error("Writer for camera {id} failed to initialize: {reason}")]
    WriterInitFailed { id: u32, reason: String },

    /// Every candidate device failed to open
    #[error("No cameras available")]
    NoCamerasAvailable,

    /// A read returned no frame
    #[error("Empty frame read from camera {0}")]
    EmptyFrameRead(u32),

    /// Frame capture failed
    #[error("Capture error: {0}")]
    Capture(String),

    /// Encoding or writing a frame to the recording failed
    #[error("Encode/write failed: {0}")]
    EncodeWriteFailed(String),

    /// Preview window could not be created or updated
    #[error("Display error: {0}")]
    DisplayRenderFailed(String),

    /// Snapshot could not be written
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image buffer error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CamrecError>,
    },
}

impl CamrecError {
    /// Create a device-unavailable error
    pub fn device_unavailable(id: u32, reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            id,
            reason: reason.into(),
        }
    }

    /// Create a writer-init error
    pub fn writer_init(id: u32, reason: impl Into<String>) -> Self {
        Self::WriterInitFailed {
            id,
            reason: reason.into(),
        }
    }

    /// Create a capture error
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Create an encode/write error
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::EncodeWriteFailed(msg.into())
    }

    /// Create a display error
    pub fn display(msg: impl Into<String>) -> Self {
        Self::DisplayRenderFailed(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context wrappers
    pub fn root(&self) -> &CamrecError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// A short hint telling the user what to check
    pub fn user_hint(&self) -> Option<&'static str> {
        match self.root() {
            Self::DeviceUnavailable { .. } => {
                Some("Check that the camera is connected and not in use (see `camrec list`)")
            }
            Self::WriterInitFailed { .. } => {
                Some("Check that the output directory is writable and FFmpeg has an MPEG-4 encoder")
            }
            Self::NoCamerasAvailable => {
                Some("No camera could be opened; try raising --max-cam or run `camrec list`")
            }
            Self::DisplayRenderFailed(_) => {
                Some("A graphical session is required for the preview window")
            }
            Self::Config(_) => Some("Check ~/.config/camrec/config.toml or the command-line flags"),
            _ => None,
        }
    }

    /// Whether the loop can skip this unit of work and keep going
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.root(),
            Self::DeviceUnavailable { .. }
                | Self::WriterInitFailed { .. }
                | Self::EmptyFrameRead(_)
                | Self::Capture(_)
                | Self::EncodeWriteFailed(_)
                | Self::DisplayRenderFailed(_)
                | Self::Snapshot(_)
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

// Conversions from external error types

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for CamrecError {
    fn from(err: ffmpeg_next::Error) -> Self {
        Self::EncodeWriteFailed(err.to_string())
    }
}

#[cfg(feature = "window")]
impl From<minifb::Error> for CamrecError {
    fn from(err: minifb::Error) -> Self {
        Self::DisplayRenderFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CamrecError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("Failed to parse config file: {}", err))
    }
}

impl From<toml::ser::Error> for CamrecError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(format!("Failed to serialize config: {}", err))
    }
}
