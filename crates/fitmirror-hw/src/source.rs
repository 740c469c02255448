//! Video source abstraction.
//!
//! A [`CameraProvider`] hands out at most one live [`VideoStream`] at a
//! time. Streams must be released explicitly; the provider refuses a
//! second acquisition until the first stream is released.

use fitmirror_core::PixelBuffer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("device busy")]
    DeviceBusy,
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),
    #[error("streaming not supported")]
    StreamingNotSupported,
    #[error("stream released")]
    Released,
}

/// Which way the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user.
    #[default]
    User,
    /// Rear camera.
    Environment,
}

impl FacingMode {
    pub fn opposite(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Environment => "environment",
        })
    }
}

/// A live, exclusively held video stream.
pub trait VideoStream: Send {
    /// Frame dimensions, available once the source has produced its
    /// first frame. `None` while the source is still warming up.
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Grab the current frame.
    fn capture(&mut self) -> Result<PixelBuffer, CameraError>;

    /// Release the underlying device. Idempotent.
    fn release(&mut self);
}

/// Acquires camera devices by facing mode.
pub trait CameraProvider: Send {
    fn acquire(&mut self, facing: FacingMode) -> Result<Box<dyn VideoStream>, CameraError>;
}
