//! fitmirror-hw — Camera capture and frame sampling.
//!
//! Provides the video-source abstraction the session drives, a V4L2
//! camera behind it, pixel-format conversion to RGBA, and a synthetic
//! test-pattern source.

pub mod camera;
pub mod frame;
pub mod sampler;
pub mod source;
pub mod synthetic;

pub use camera::{Camera, V4lProvider};
pub use frame::FrameError;
pub use sampler::FrameSampler;
pub use source::{CameraError, CameraProvider, FacingMode, VideoStream};
pub use synthetic::{Pattern, SyntheticProvider};
