//! Synthetic test-pattern camera.
//!
//! Stands in for a real device in demos and tests. Follows the same
//! exclusivity rules as the V4L2 provider.

use crate::source::{CameraError, CameraProvider, FacingMode, VideoStream};
use fitmirror_core::PixelBuffer;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

const BACKGROUND: [u8; 4] = [96, 96, 96, 255];
const STRIPE_DARK: [u8; 4] = [20, 20, 20, 255];
const STRIPE_LIGHT: [u8; 4] = [230, 230, 230, 255];
const SKIN_LIGHT: [u8; 4] = [220, 140, 100, 255];
const SKIN_DARK: [u8; 4] = [150, 80, 40, 255];

/// What the synthetic camera shows.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Flat grey: nothing to detect.
    Blank,
    /// Striped torso in the centre band with a striped skin patch above it.
    Figure,
    /// Replays the given frame.
    Still(PixelBuffer),
}

impl Pattern {
    pub fn render(&self, width: u32, height: u32) -> PixelBuffer {
        match self {
            Self::Blank => PixelBuffer::solid(width, height, BACKGROUND),
            Self::Figure => figure(width, height),
            Self::Still(buf) => buf.clone(),
        }
    }
}

fn figure(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::solid(width, height, BACKGROUND);

    // Torso: alternating one-pixel columns.
    let x0 = width * 3 / 10;
    let x1 = width * 7 / 10;
    for y in height / 4..height {
        for x in x0..x1 {
            let colour = if x % 2 == 0 { STRIPE_DARK } else { STRIPE_LIGHT };
            buf.put(x, y, colour);
        }
    }

    // Face: 40x40 skin patch striped by row, aligned to a 20px grid.
    let fx = (width / 2 / 20) * 20;
    let fy = (height / 12 / 20) * 20;
    for y in fy..(fy + 40).min(height) {
        let colour = if y % 2 == 0 { SKIN_LIGHT } else { SKIN_DARK };
        for x in fx..(fx + 40).min(width) {
            buf.put(x, y, colour);
        }
    }

    buf
}

/// Shared view of a provider's device state, for assertions after the
/// provider has been handed to a session.
#[derive(Debug, Clone)]
pub struct SyntheticUsage {
    in_use: Arc<AtomicBool>,
    acquisitions: Arc<AtomicUsize>,
}

impl SyntheticUsage {
    pub fn in_use(&self) -> bool {
        self.in_use.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

pub struct SyntheticProvider {
    width: u32,
    height: u32,
    pattern: Pattern,
    warmup_polls: u32,
    deny: bool,
    in_use: Arc<AtomicBool>,
    acquisitions: Arc<AtomicUsize>,
}

impl SyntheticProvider {
    pub fn new(width: u32, height: u32, pattern: Pattern) -> Self {
        Self {
            width,
            height,
            pattern,
            warmup_polls: 0,
            deny: false,
            in_use: Arc::new(AtomicBool::new(false)),
            acquisitions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report no dimensions for the first `polls` dimension queries.
    pub fn with_warmup(mut self, polls: u32) -> Self {
        self.warmup_polls = polls;
        self
    }

    /// Refuse every acquisition with a permission error.
    pub fn denying(mut self) -> Self {
        self.deny = true;
        self
    }

    pub fn usage(&self) -> SyntheticUsage {
        SyntheticUsage {
            in_use: Arc::clone(&self.in_use),
            acquisitions: Arc::clone(&self.acquisitions),
        }
    }
}

impl CameraProvider for SyntheticProvider {
    fn acquire(&mut self, facing: FacingMode) -> Result<Box<dyn VideoStream>, CameraError> {
        if self.deny {
            return Err(CameraError::PermissionDenied(format!("synthetic {facing} camera")));
        }
        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(CameraError::DeviceBusy);
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(%facing, width = self.width, height = self.height, "acquired synthetic camera");

        Ok(Box::new(SyntheticStream {
            frame: self.pattern.render(self.width, self.height),
            warmup_left: AtomicU32::new(self.warmup_polls),
            released: false,
            in_use: Arc::clone(&self.in_use),
        }))
    }
}

struct SyntheticStream {
    frame: PixelBuffer,
    warmup_left: AtomicU32,
    released: bool,
    in_use: Arc<AtomicBool>,
}

impl VideoStream for SyntheticStream {
    fn dimensions(&self) -> Option<(u32, u32)> {
        if self.released {
            return None;
        }
        let left = self.warmup_left.load(Ordering::SeqCst);
        if left > 0 {
            self.warmup_left.store(left - 1, Ordering::SeqCst);
            return None;
        }
        Some((self.frame.width(), self.frame.height()))
    }

    fn capture(&mut self) -> Result<PixelBuffer, CameraError> {
        if self.released {
            return Err(CameraError::Released);
        }
        Ok(self.frame.clone())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.in_use.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_acquisition() {
        let mut provider = SyntheticProvider::new(64, 48, Pattern::Blank);
        let usage = provider.usage();
        let mut stream = provider.acquire(FacingMode::User).unwrap();
        assert!(usage.in_use());
        assert!(matches!(provider.acquire(FacingMode::User), Err(CameraError::DeviceBusy)));

        stream.release();
        assert!(!usage.in_use());
        let _again = provider.acquire(FacingMode::Environment).unwrap();
        assert_eq!(usage.acquisitions(), 2);
    }

    #[test]
    fn test_drop_releases() {
        let mut provider = SyntheticProvider::new(64, 48, Pattern::Blank);
        let usage = provider.usage();
        drop(provider.acquire(FacingMode::User).unwrap());
        assert!(!usage.in_use());
    }

    #[test]
    fn test_warmup_delays_dimensions() {
        let mut provider = SyntheticProvider::new(64, 48, Pattern::Blank).with_warmup(2);
        let stream = provider.acquire(FacingMode::User).unwrap();
        assert_eq!(stream.dimensions(), None);
        assert_eq!(stream.dimensions(), None);
        assert_eq!(stream.dimensions(), Some((64, 48)));
    }

    #[test]
    fn test_denying_provider() {
        let mut provider = SyntheticProvider::new(64, 48, Pattern::Blank).denying();
        assert!(matches!(
            provider.acquire(FacingMode::User),
            Err(CameraError::PermissionDenied(_))
        ));
        assert_eq!(provider.usage().acquisitions(), 0);
    }

    #[test]
    fn test_capture_after_release_fails() {
        let mut provider = SyntheticProvider::new(8, 8, Pattern::Blank);
        let mut stream = provider.acquire(FacingMode::User).unwrap();
        stream.release();
        assert!(matches!(stream.capture(), Err(CameraError::Released)));
        assert_eq!(stream.dimensions(), None);
    }

    #[test]
    fn test_figure_pattern_has_torso_and_face() {
        let buf = Pattern::Figure.render(640, 480);
        // torso column stripe inside the centre band
        assert_ne!(buf.rgb(300, 300), buf.rgb(301, 300));
        // face patch
        assert_eq!(buf.rgb(320, 40), [220, 140, 100]);
        // background corner
        assert_eq!(buf.rgb(0, 0), [96, 96, 96]);
    }
}
