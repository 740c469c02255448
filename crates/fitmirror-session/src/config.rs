use fitmirror_core::face::{DEFAULT_JITTER, FACE_BLOCK_SIZE};
use fitmirror_core::pose::BODY_BLOCK_SIZE;
use std::path::PathBuf;
use std::time::Duration;

/// Session configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// V4L2 device for the user-facing camera (default: /dev/video0).
    pub front_device: String,
    /// V4L2 device for the rear camera (default: /dev/video1).
    pub rear_device: String,
    /// Detection tick period in milliseconds.
    pub tick_ms: u64,
    /// Render loop period in milliseconds.
    pub render_ms: u64,
    pub face_block: u32,
    pub body_block: u32,
    /// Total spread of the face confidence jitter.
    pub jitter: f32,
    /// Fixed jitter seed; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// JSON outfit catalog; the built-in catalog is used when absent.
    pub catalog_path: Option<PathBuf>,
    /// Where captured stills are written.
    pub capture_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            front_device: "/dev/video0".to_string(),
            rear_device: "/dev/video1".to_string(),
            tick_ms: 100,
            render_ms: 33,
            face_block: FACE_BLOCK_SIZE,
            body_block: BODY_BLOCK_SIZE,
            jitter: DEFAULT_JITTER,
            seed: None,
            catalog_path: None,
            capture_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from `FITMIRROR_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            front_device: std::env::var("FITMIRROR_FRONT_DEVICE").unwrap_or(defaults.front_device),
            rear_device: std::env::var("FITMIRROR_REAR_DEVICE").unwrap_or(defaults.rear_device),
            tick_ms: env_u64("FITMIRROR_TICK_MS", defaults.tick_ms),
            render_ms: env_u64("FITMIRROR_RENDER_MS", defaults.render_ms),
            face_block: env_u32("FITMIRROR_FACE_BLOCK", defaults.face_block),
            body_block: env_u32("FITMIRROR_BODY_BLOCK", defaults.body_block),
            jitter: env_f32("FITMIRROR_JITTER", defaults.jitter),
            seed: std::env::var("FITMIRROR_SEED").ok().and_then(|v| v.parse().ok()),
            catalog_path: std::env::var("FITMIRROR_CATALOG").ok().map(PathBuf::from),
            capture_dir: std::env::var("FITMIRROR_CAPTURE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.capture_dir),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_ms.max(1))
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
