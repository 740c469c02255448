//! Pulls a single still frame from a live stream.

use crate::source::{CameraError, VideoStream};
use fitmirror_core::PixelBuffer;

/// Samples one frame per detection tick.
#[derive(Debug, Default)]
pub struct FrameSampler {
    sampled: u64,
}

impl FrameSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grab the current frame.
    ///
    /// Returns `Ok(None)` while the stream has no dimensions yet, or
    /// reports a zero-sized frame. A frame whose size disagrees with the
    /// stream's reported dimensions is an error.
    pub fn sample(&mut self, stream: &mut dyn VideoStream) -> Result<Option<PixelBuffer>, CameraError> {
        let Some((width, height)) = stream.dimensions() else {
            return Ok(None);
        };
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let frame = stream.capture()?;
        if (frame.width(), frame.height()) != (width, height) {
            return Err(CameraError::CaptureFailed(format!(
                "frame is {}x{}, stream reports {width}x{height}",
                frame.width(),
                frame.height()
            )));
        }

        self.sampled += 1;
        Ok(Some(frame))
    }

    /// Number of frames handed out so far.
    pub fn sampled(&self) -> u64 {
        self.sampled
    }
}
