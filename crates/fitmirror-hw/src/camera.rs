//! V4L2 camera capture via the `v4l` crate.

use crate::frame;
use crate::source::{CameraError, CameraProvider, FacingMode, VideoStream};
use fitmirror_core::PixelBuffer;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use v4l::buffer::Type as BufType;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

const REQUESTED_WIDTH: u32 = 1280;
const REQUESTED_HEIGHT: u32 = 720;
const STREAM_BUFFERS: u32 = 4;

/// Negotiated pixel format for the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// YUYV 4:2:2 packed (2 bytes/pixel).
    Yuyv,
    /// Packed 24-bit RGB.
    Rgb3,
    /// 8-bit grayscale.
    Grey,
}

/// V4L2 camera device handle.
pub struct Camera {
    device: Option<Device>,
    pub width: u32,
    pub height: u32,
    pub device_path: String,
    pub fourcc: FourCC,
    pixel_format: PixelFormat,
    /// Shared with the provider; cleared on release.
    in_use: Arc<AtomicBool>,
}

impl Camera {
    /// Open a V4L2 camera device by path (e.g., "/dev/video0").
    fn open(device_path: &str, in_use: Arc<AtomicBool>) -> Result<Self, CameraError> {
        if !Path::new(device_path).exists() {
            return Err(CameraError::DeviceNotFound(device_path.to_string()));
        }

        let device = Device::with_path(device_path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => CameraError::PermissionDenied(device_path.to_string()),
            _ if e.raw_os_error() == Some(16) || e.to_string().contains("busy") => {
                CameraError::DeviceBusy
            }
            _ => CameraError::DeviceNotFound(format!("{device_path}: {e}")),
        })?;

        let caps = device.query_caps().map_err(|e| {
            CameraError::CaptureFailed(format!("failed to query capabilities: {e}"))
        })?;

        tracing::info!(
            device = device_path,
            driver = %caps.driver,
            card = %caps.card,
            "opened camera"
        );

        if !caps
            .capabilities
            .contains(v4l::capability::Flags::VIDEO_CAPTURE)
        {
            return Err(CameraError::StreamingNotSupported);
        }

        // Ask for YUYV at 1280x720; accept whatever RGB3/GREY the driver
        // negotiates instead.
        let mut fmt = device.format().map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to get format: {e}"))
        })?;
        fmt.fourcc = FourCC::new(b"YUYV");
        fmt.width = REQUESTED_WIDTH;
        fmt.height = REQUESTED_HEIGHT;

        let negotiated = device.set_format(&fmt).map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
        })?;

        let fourcc = negotiated.fourcc;
        let pixel_format = if fourcc == FourCC::new(b"YUYV") {
            PixelFormat::Yuyv
        } else if fourcc == FourCC::new(b"RGB3") {
            PixelFormat::Rgb3
        } else if fourcc == FourCC::new(b"GREY") {
            PixelFormat::Grey
        } else {
            return Err(CameraError::FormatNegotiationFailed(format!(
                "unsupported pixel format: {fourcc:?} (need YUYV, RGB3, or GREY)"
            )));
        };

        tracing::info!(
            width = negotiated.width,
            height = negotiated.height,
            fourcc = ?fourcc,
            "negotiated format"
        );

        Ok(Self {
            device: Some(device),
            width: negotiated.width,
            height: negotiated.height,
            device_path: device_path.to_string(),
            fourcc,
            pixel_format,
            in_use,
        })
    }

    /// Capture a single frame and convert it to RGBA.
    pub fn capture_frame(&self) -> Result<PixelBuffer, CameraError> {
        let device = self.device.as_ref().ok_or(CameraError::Released)?;
        let mut stream = MmapStream::with_buffers(device, BufType::VideoCapture, STREAM_BUFFERS)
            .map_err(|e| CameraError::CaptureFailed(format!("failed to create mmap stream: {e}")))?;

        let (buf, meta) = stream
            .next()
            .map_err(|e| CameraError::CaptureFailed(format!("failed to dequeue buffer: {e}")))?;
        tracing::trace!(seq = meta.sequence, bytes = buf.len(), "dequeued frame");

        self.buf_to_rgba(buf)
    }

    fn buf_to_rgba(&self, buf: &[u8]) -> Result<PixelBuffer, CameraError> {
        let converted = match self.pixel_format {
            PixelFormat::Yuyv => frame::yuyv_to_rgba(buf, self.width, self.height),
            PixelFormat::Rgb3 => frame::rgb_to_rgba(buf, self.width, self.height),
            PixelFormat::Grey => frame::grey_to_rgba(buf, self.width, self.height),
        };
        converted.map_err(|e| CameraError::CaptureFailed(format!("{:?} conversion failed: {e}", self.pixel_format)))
    }
}

impl VideoStream for Camera {
    fn dimensions(&self) -> Option<(u32, u32)> {
        self.device.as_ref().map(|_| (self.width, self.height))
    }

    fn capture(&mut self) -> Result<PixelBuffer, CameraError> {
        self.capture_frame()
    }

    fn release(&mut self) {
        if self.device.take().is_some() {
            self.in_use.store(false, Ordering::SeqCst);
            tracing::info!(device = %self.device_path, "released camera");
        }
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Maps facing modes to V4L2 device paths and enforces a single open device.
pub struct V4lProvider {
    front_device: String,
    rear_device: String,
    in_use: Arc<AtomicBool>,
}

impl V4lProvider {
    pub fn new(front_device: &str, rear_device: &str) -> Self {
        Self {
            front_device: front_device.to_string(),
            rear_device: rear_device.to_string(),
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn device_for(&self, facing: FacingMode) -> &str {
        match facing {
            FacingMode::User => &self.front_device,
            FacingMode::Environment => &self.rear_device,
        }
    }
}

impl CameraProvider for V4lProvider {
    fn acquire(&mut self, facing: FacingMode) -> Result<Box<dyn VideoStream>, CameraError> {
        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(CameraError::DeviceBusy);
        }
        let path = self.device_for(facing).to_string();
        match Camera::open(&path, Arc::clone(&self.in_use)) {
            Ok(camera) => Ok(Box::new(camera)),
            Err(e) => {
                self.in_use.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }
}
