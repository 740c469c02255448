//! Immutable RGBA snapshot of one sampled frame.

use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("invalid RGBA length for {width}x{height}: expected {expected}, got {actual}")]
    InvalidLength {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A single frame's raw colour data, 4 bytes per pixel (R, G, B, A).
///
/// Produced once per detection tick and read by both estimators. The
/// buffer never changes after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Wrap packed RGBA bytes. Fails if `data` does not hold exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(BufferError::InvalidLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Buffer filled with a single colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self { data, width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// RGB channels of the pixel at (x, y). Caller guarantees bounds.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Set one pixel. Used when building synthetic frames.
    pub fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Copy into an `image` buffer for compositing.
    pub fn to_image(&self) -> RgbaImage {
        // Length is validated at construction, so this cannot fail.
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
        }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Sum of absolute per-channel differences between two pixels.
#[inline]
pub(crate) fn channel_delta(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&p, &q)| (p as i32 - q as i32).unsigned_abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_length_mismatch() {
        let result = PixelBuffer::from_rgba(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(BufferError::InvalidLength { expected: 16, actual: 15, .. })
        ));
    }

    #[test]
    fn test_solid_and_rgb() {
        let buf = PixelBuffer::solid(3, 2, [10, 20, 30, 255]);
        assert_eq!(buf.as_raw().len(), 24);
        assert_eq!(buf.rgb(2, 1), [10, 20, 30]);
    }

    #[test]
    fn test_put_out_of_bounds_ignored() {
        let mut buf = PixelBuffer::solid(2, 2, [0, 0, 0, 255]);
        buf.put(5, 5, [255, 255, 255, 255]);
        buf.put(1, 0, [255, 0, 0, 255]);
        assert_eq!(buf.rgb(1, 0), [255, 0, 0]);
        assert_eq!(buf.rgb(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_image_conversion() {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 4]));
        let buf = PixelBuffer::from(img);
        assert_eq!((buf.width(), buf.height()), (4, 3));
        let back = buf.to_image();
        assert_eq!(back.get_pixel(3, 2).0, [1, 2, 3, 4]);
    }

    #[test]
    fn test_channel_delta() {
        assert_eq!(channel_delta([10, 20, 30], [20, 10, 30]), 20);
        assert_eq!(channel_delta([0, 0, 0], [255, 255, 255]), 765);
    }
}
