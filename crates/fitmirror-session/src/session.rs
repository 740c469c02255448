//! Try-on session controller.
//!
//! Owns the camera for its whole lifetime and runs the detection pipeline
//! one tick at a time. Scheduling lives in [`crate::engine`]; everything
//! here is synchronous.
//!
//! ```text
//! Idle --start--> Starting --ready--> Streaming --first frame--> Detecting
//!   ^                                                                |
//!   +---------------------------- stop ------------------------------+
//! ```

use crate::config::Config;
use fitmirror_core::{
    DetectionQuality, FaceEstimator, FaceRegion, Outfit, PixelBuffer, PoseEstimator, Skeleton,
};
use fitmirror_hw::{CameraError, CameraProvider, FacingMode, FrameSampler, VideoStream};
use fitmirror_render::RasterSurface;
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Body confidence required before an outfit selection is accepted.
pub const APPLY_BODY_THRESHOLD: f32 = 0.5;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("camera access failed: {0}")]
    CameraAccess(#[source] CameraError),
    #[error("session already active")]
    AlreadyActive,
    #[error("session is not streaming")]
    NotStreaming,
    #[error("body confidence {confidence:.2} is too low to apply an outfit")]
    GarmentApplyRejected { confidence: f32 },
    #[error("engine exited")]
    EngineClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    /// Camera acquired, waiting for the first frame dimensions.
    Starting,
    Streaming,
    /// Streaming, with at least one analyzed frame.
    Detecting,
}

impl SessionState {
    /// Holding a camera.
    pub fn is_active(self) -> bool {
        self != Self::Idle
    }

    pub fn is_streaming(self) -> bool {
        matches!(self, Self::Streaming | Self::Detecting)
    }
}

/// Result of one detection tick. Replaced wholesale every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Detection {
    pub face: Option<FaceRegion>,
    pub body: Option<Skeleton>,
    pub quality: DetectionQuality,
}

impl Detection {
    pub fn body_confidence(&self) -> Option<f32> {
        self.body.as_ref().map(|b| b.confidence)
    }

    /// Quality better than poor and a body confident enough for the
    /// outfit overlay, so a still taken now shows the garments.
    pub fn supports_capture(&self) -> bool {
        self.quality != DetectionQuality::Poor
            && self
                .body_confidence()
                .is_some_and(|c| c > fitmirror_render::OVERLAY_BODY_THRESHOLD)
    }
}

/// Everything the UI and render loop read from a session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub state: SessionState,
    pub facing: FacingMode,
    pub detection: Detection,
    pub outfit: Option<Outfit>,
    pub ticks: u64,
    /// Last camera failure; cleared by a successful start or by stop.
    pub error: Option<String>,
    #[serde(skip)]
    pub frame: Option<Arc<PixelBuffer>>,
}

impl Snapshot {
    pub fn status_text(&self) -> &'static str {
        self.detection.quality.status_text()
    }

    /// Compose the display frame, or `None` before the first frame.
    pub fn compose(&self) -> Option<RasterSurface> {
        let frame = self.frame.as_deref()?;
        Some(fitmirror_render::compose_display(
            frame,
            self.detection.face.as_ref(),
            self.detection.body.as_ref(),
            self.outfit.as_ref(),
        ))
    }
}

/// A captured still, ready to be written out.
#[derive(Debug, Clone)]
pub struct Still {
    pub file_name: String,
    pub image: RgbaImage,
}

impl Still {
    /// Write the still as PNG into `dir`.
    pub fn save(&self, dir: &Path) -> image::ImageResult<PathBuf> {
        let path = dir.join(&self.file_name);
        self.image.save(&path)?;
        Ok(path)
    }
}

pub struct Session {
    provider: Box<dyn CameraProvider>,
    stream: Option<Box<dyn VideoStream>>,
    facing: FacingMode,
    state: SessionState,
    sampler: FrameSampler,
    face: FaceEstimator,
    pose: PoseEstimator,
    rng: StdRng,
    detection: Detection,
    frame: Option<Arc<PixelBuffer>>,
    outfit: Option<Outfit>,
    ticks: u64,
    last_error: Option<String>,
}

impl Session {
    pub fn new(provider: Box<dyn CameraProvider>, config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            provider,
            stream: None,
            facing: FacingMode::default(),
            state: SessionState::Idle,
            sampler: FrameSampler::new(),
            face: FaceEstimator::new(config.face_block, config.jitter),
            pose: PoseEstimator::new(config.body_block),
            rng,
            detection: Detection::default(),
            frame: None,
            outfit: None,
            ticks: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    pub fn outfit(&self) -> Option<&Outfit> {
        self.outfit.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Acquire the camera for `facing`.
    ///
    /// Rejected while a camera is already held. On failure the session
    /// stays idle and the error is kept for display.
    pub fn start(&mut self, facing: FacingMode) -> Result<(), SessionError> {
        if self.state.is_active() {
            tracing::warn!(state = ?self.state, "start ignored: session already active");
            return Err(SessionError::AlreadyActive);
        }

        self.state = SessionState::Starting;
        self.facing = facing;
        match self.provider.acquire(facing) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.last_error = None;
                tracing::info!(%facing, "camera acquired");
                self.poll_ready();
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Idle;
                self.last_error = Some(e.to_string());
                tracing::warn!(%facing, error = %e, "camera access failed");
                Err(SessionError::CameraAccess(e))
            }
        }
    }

    /// Move from starting to streaming once the source reports its frame
    /// dimensions. Returns whether the session is streaming.
    pub fn poll_ready(&mut self) -> bool {
        if self.state == SessionState::Starting {
            let ready = self
                .stream
                .as_ref()
                .and_then(|s| s.dimensions())
                .filter(|&(w, h)| w > 0 && h > 0);
            if let Some((width, height)) = ready {
                self.state = SessionState::Streaming;
                tracing::info!(width, height, "streaming");
            }
        }
        self.state.is_streaming()
    }

    /// Run one detection pass. Returns whether a frame was analyzed.
    ///
    /// Missing frames and capture hiccups are tolerated; the previous
    /// detection stays in place until a frame is analyzed.
    pub fn tick(&mut self) -> Result<bool, SessionError> {
        if !self.state.is_active() {
            return Err(SessionError::NotStreaming);
        }
        if !self.poll_ready() {
            return Ok(false);
        }
        let Some(stream) = self.stream.as_deref_mut() else {
            return Err(SessionError::NotStreaming);
        };

        let frame = match self.sampler.sample(stream) {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(false),
            Err(e) => {
                tracing::warn!(error = %e, "frame sample failed");
                return Ok(false);
            }
        };

        let face = self.face.estimate(&frame, &mut self.rng);
        let body = self.pose.estimate(&frame);
        let quality = DetectionQuality::assess(face.as_ref(), body.as_ref());

        tracing::debug!(
            tick = self.ticks,
            face = face.as_ref().map(|f| f.confidence),
            body = body.as_ref().map(|b| b.confidence),
            %quality,
            "detection"
        );

        self.detection = Detection { face, body, quality };
        self.frame = Some(Arc::new(frame));
        self.state = SessionState::Detecting;
        self.ticks += 1;
        Ok(true)
    }

    /// Release the camera and clear detection state and any camera error.
    /// Leaves the camera untouched when idle.
    pub fn stop(&mut self) {
        self.last_error = None;
        if !self.state.is_active() {
            return;
        }
        self.state = SessionState::Idle;
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
        self.detection = Detection::default();
        self.frame = None;
        tracing::info!(facing = %self.facing, "session stopped");
    }

    /// Stop, then start on the opposite camera. While idle only the
    /// facing mode flips; the next start uses it.
    pub fn switch_camera(&mut self) -> Result<(), SessionError> {
        let next = self.facing.opposite();
        if !self.state.is_active() {
            tracing::debug!(from = %self.facing, to = %next, "facing changed while idle");
            self.facing = next;
            return Ok(());
        }
        tracing::info!(from = %self.facing, to = %next, "switching camera");
        self.stop();
        self.start(next)
    }

    /// Select an outfit. Rejected unless a body is detected with
    /// confidence above 0.5; a rejection leaves the selection unchanged.
    pub fn apply_outfit(&mut self, outfit: Outfit) -> Result<(), SessionError> {
        let confidence = self.detection.body_confidence().unwrap_or(0.0);
        if confidence <= APPLY_BODY_THRESHOLD {
            tracing::warn!(outfit = %outfit.name, confidence, "outfit rejected: body not detected clearly");
            return Err(SessionError::GarmentApplyRejected { confidence });
        }
        tracing::info!(outfit = %outfit.name, confidence, "outfit applied");
        self.outfit = Some(outfit);
        Ok(())
    }

    pub fn clear_outfit(&mut self) {
        self.outfit = None;
    }

    /// Streaming with an outfit selected and detection better than poor.
    pub fn can_capture(&self) -> bool {
        self.state.is_streaming()
            && self.outfit.is_some()
            && self.detection.quality != DetectionQuality::Poor
    }

    /// Compose the last frame with the outfit overlay, when capture is allowed.
    pub fn capture(&self) -> Option<Still> {
        if !self.can_capture() {
            return None;
        }
        let frame = self.frame.as_deref()?;
        let outfit = self.outfit.as_ref();
        Some(Still {
            file_name: fitmirror_render::capture_file_name(outfit),
            image: fitmirror_render::capture(frame, outfit, self.detection.body.as_ref()),
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            facing: self.facing,
            detection: self.detection.clone(),
            outfit: self.outfit.clone(),
            ticks: self.ticks,
            error: self.last_error.clone(),
            frame: self.frame.clone(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitmirror_core::{Garment, GarmentType};
    use fitmirror_hw::synthetic::SyntheticUsage;
    use fitmirror_hw::{Pattern, SyntheticProvider};

    fn config() -> Config {
        Config {
            jitter: 0.0,
            seed: Some(7),
            ..Config::default()
        }
    }

    fn session(provider: SyntheticProvider) -> (Session, SyntheticUsage) {
        let usage = provider.usage();
        (Session::new(Box::new(provider), &config()), usage)
    }

    fn outfit() -> Outfit {
        Outfit::from_items(
            "o1",
            "Professional Interview Look",
            vec![
                Garment::new("Navy Blazer", GarmentType::Top, "Navy Blue"),
                Garment::new("Dress Pants", GarmentType::Bottom, "Black"),
            ],
        )
    }

    #[test]
    fn test_start_then_ticks_reach_good_quality() {
        let (mut s, _) = session(SyntheticProvider::new(640, 480, Pattern::Figure));
        s.start(FacingMode::User).unwrap();
        assert_eq!(s.state(), SessionState::Streaming);

        for _ in 0..5 {
            assert!(s.tick().unwrap());
            let d = s.detection();
            assert!(d.body_confidence().unwrap() > 0.0);
            assert!(d.face.is_some());
            assert!(matches!(d.quality, DetectionQuality::Good | DetectionQuality::Excellent));
        }
        assert_eq!(s.state(), SessionState::Detecting);
        assert_eq!(s.snapshot().ticks, 5);
    }

    #[test]
    fn test_blank_frames_give_poor_quality() {
        let (mut s, _) = session(SyntheticProvider::new(320, 240, Pattern::Blank));
        s.start(FacingMode::User).unwrap();
        assert!(s.tick().unwrap());
        assert_eq!(*s.detection(), Detection::default());
    }

    #[test]
    fn test_warmup_keeps_session_starting() {
        let (mut s, _) =
            session(SyntheticProvider::new(320, 240, Pattern::Blank).with_warmup(2));
        s.start(FacingMode::User).unwrap();
        // start consumed one poll
        assert_eq!(s.state(), SessionState::Starting);
        assert!(!s.tick().unwrap());
        assert_eq!(s.state(), SessionState::Starting);
        assert!(s.tick().unwrap());
        assert_eq!(s.state(), SessionState::Detecting);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let (mut s, usage) = session(SyntheticProvider::new(64, 48, Pattern::Blank));
        s.stop();
        s.stop();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(usage.acquisitions(), 0);
    }

    #[test]
    fn test_double_start_acquires_once() {
        let (mut s, usage) = session(SyntheticProvider::new(64, 48, Pattern::Blank));
        s.start(FacingMode::User).unwrap();
        assert!(matches!(s.start(FacingMode::User), Err(SessionError::AlreadyActive)));
        assert_eq!(usage.acquisitions(), 1);
        assert!(usage.in_use());
    }

    #[test]
    fn test_stop_releases_and_clears() {
        let (mut s, usage) = session(SyntheticProvider::new(640, 480, Pattern::Figure));
        s.start(FacingMode::User).unwrap();
        s.tick().unwrap();
        s.stop();
        assert!(!usage.in_use());
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(*s.detection(), Detection::default());
        assert!(s.snapshot().frame.is_none());
        assert!(matches!(s.tick(), Err(SessionError::NotStreaming)));
    }

    #[test]
    fn test_denied_camera_returns_to_idle() {
        let (mut s, usage) = session(SyntheticProvider::new(64, 48, Pattern::Blank).denying());
        let err = s.start(FacingMode::User).unwrap_err();
        assert!(matches!(err, SessionError::CameraAccess(CameraError::PermissionDenied(_))));
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.last_error().is_some());
        assert!(!usage.in_use());
    }

    #[test]
    fn test_switch_camera_releases_before_acquiring() {
        let (mut s, usage) = session(SyntheticProvider::new(64, 48, Pattern::Blank));
        s.start(FacingMode::User).unwrap();
        s.switch_camera().unwrap();
        assert_eq!(s.facing(), FacingMode::Environment);
        assert_eq!(usage.acquisitions(), 2);
        assert!(usage.in_use());
    }

    /// Front camera works, rear camera is missing.
    struct FrontOnly(SyntheticProvider);

    impl CameraProvider for FrontOnly {
        fn acquire(&mut self, facing: FacingMode) -> Result<Box<dyn VideoStream>, CameraError> {
            match facing {
                FacingMode::User => self.0.acquire(facing),
                FacingMode::Environment => Err(CameraError::DeviceNotFound("/dev/video1".into())),
            }
        }
    }

    #[test]
    fn test_failed_switch_surfaces_error() {
        let provider = SyntheticProvider::new(64, 48, Pattern::Blank);
        let usage = provider.usage();
        let mut s = Session::new(Box::new(FrontOnly(provider)), &config());
        s.start(FacingMode::User).unwrap();

        let err = s.switch_camera().unwrap_err();
        assert!(matches!(err, SessionError::CameraAccess(CameraError::DeviceNotFound(_))));
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.snapshot().error.is_some());
        assert!(!usage.in_use());
    }

    #[test]
    fn test_switch_while_idle_only_flips_facing() {
        let (mut s, usage) = session(SyntheticProvider::new(64, 48, Pattern::Blank));
        s.switch_camera().unwrap();
        assert_eq!(s.facing(), FacingMode::Environment);
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(usage.acquisitions(), 0);

        s.start(s.facing()).unwrap();
        assert_eq!(usage.acquisitions(), 1);
        assert_eq!(s.snapshot().facing, FacingMode::Environment);
    }

    #[test]
    fn test_stop_clears_camera_error() {
        let (mut s, usage) = session(SyntheticProvider::new(64, 48, Pattern::Blank).denying());
        assert!(s.start(FacingMode::User).is_err());
        assert!(s.last_error().is_some());
        s.stop();
        assert!(s.last_error().is_none());
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(usage.acquisitions(), 0);
    }

    #[test]
    fn test_capture_support_needs_quality_and_overlay_body() {
        let face = |confidence| FaceRegion { x: 0.0, y: 0.0, width: 120.0, height: 160.0, confidence };
        let body = |confidence| Skeleton::synthesize(320.0, 72.0, confidence);
        let detection = |face: Option<FaceRegion>, body: Option<Skeleton>| Detection {
            quality: DetectionQuality::assess(face.as_ref(), body.as_ref()),
            face,
            body,
        };

        // poor: average of 0.55 and 0.6
        assert!(!detection(Some(face(0.55)), Some(body(0.6))).supports_capture());
        // good quality, but the overlay is not drawn at exactly 0.6
        assert!(!detection(None, Some(body(0.6))).supports_capture());
        assert!(!detection(Some(face(0.9)), None).supports_capture());
        assert!(detection(None, Some(body(0.7))).supports_capture());
        assert!(detection(Some(face(0.9)), Some(body(0.9))).supports_capture());
    }

    #[test]
    fn test_apply_outfit_rejected_on_weak_body() {
        let (mut s, _) = session(SyntheticProvider::new(64, 48, Pattern::Blank));
        s.detection.body = Some(Skeleton::synthesize(320.0, 72.0, 0.3));
        let err = s.apply_outfit(outfit()).unwrap_err();
        assert!(matches!(err, SessionError::GarmentApplyRejected { confidence } if (confidence - 0.3).abs() < 1e-6));
        assert!(s.outfit().is_none());

        s.detection.body = None;
        assert!(s.apply_outfit(outfit()).is_err());
        assert!(s.outfit().is_none());
    }

    #[test]
    fn test_apply_outfit_accepted_on_confident_body() {
        let (mut s, _) = session(SyntheticProvider::new(64, 48, Pattern::Blank));
        s.detection.body = Some(Skeleton::synthesize(320.0, 72.0, 0.6));
        s.apply_outfit(outfit()).unwrap();
        assert_eq!(s.outfit().map(|o| o.id.as_str()), Some("o1"));
    }

    #[test]
    fn test_capture_requires_outfit_and_quality() {
        let (mut s, _) = session(SyntheticProvider::new(640, 480, Pattern::Figure));
        assert!(!s.can_capture());
        s.start(FacingMode::User).unwrap();
        s.tick().unwrap();
        assert!(!s.can_capture());
        assert!(s.capture().is_none());

        s.apply_outfit(outfit()).unwrap();
        assert!(s.can_capture());
        let still = s.capture().unwrap();
        assert_eq!(still.file_name, "tryon-professional-interview-look.png");
        assert_eq!(still.image.dimensions(), (640, 480));
    }

    #[test]
    fn test_drop_releases_camera() {
        let (mut s, usage) = session(SyntheticProvider::new(64, 48, Pattern::Blank));
        s.start(FacingMode::User).unwrap();
        drop(s);
        assert!(!usage.in_use());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let (mut s, _) = session(SyntheticProvider::new(640, 480, Pattern::Figure));
        s.start(FacingMode::Environment).unwrap();
        s.tick().unwrap();
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["state"], "detecting");
        assert_eq!(json["facing"], "environment");
        assert!(json["detection"]["body"]["confidence"].is_number());
        assert!(json.get("frame").is_none());
    }
}
