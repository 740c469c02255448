//! Pixel-format conversion into RGBA frames.

use fitmirror_core::{BufferError, PixelBuffer};

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid {format} length: expected {expected}, got {actual}")]
    InvalidLength {
        format: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

fn check_len(format: &'static str, buf: &[u8], expected: usize) -> Result<(), FrameError> {
    if buf.len() < expected {
        return Err(FrameError::InvalidLength {
            format,
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// BT.601 full-range YUV to RGB.
#[inline]
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;
    let r = y + 1.402 * v;
    let g = y - 0.344_136 * u - 0.714_136 * v;
    let b = y + 1.772 * u;
    [
        r.round().clamp(0.0, 255.0) as u8,
        g.round().clamp(0.0, 255.0) as u8,
        b.round().clamp(0.0, 255.0) as u8,
    ]
}

/// Convert packed YUYV (4:2:2) to RGBA.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]; both pixels share
/// the chroma pair.
pub fn yuyv_to_rgba(yuyv: &[u8], width: u32, height: u32) -> Result<PixelBuffer, FrameError> {
    let pixels = width as usize * height as usize;
    check_len("YUYV", yuyv, pixels * 2)?;

    let mut rgba = Vec::with_capacity(pixels * 4);
    for chunk in yuyv[..pixels * 2].chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        for y in [y0, y1] {
            let [r, g, b] = yuv_to_rgb(y, u, v);
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }
    // Odd widths leave one pixel in a trailing half chunk.
    if pixels % 2 == 1 {
        let tail = pixels * 2 - 2;
        let [r, g, b] = yuv_to_rgb(yuyv[tail], yuyv[tail + 1], 128);
        rgba.extend_from_slice(&[r, g, b, 255]);
    }

    Ok(PixelBuffer::from_rgba(width, height, rgba)?)
}

/// Convert packed 24-bit RGB to RGBA.
pub fn rgb_to_rgba(rgb: &[u8], width: u32, height: u32) -> Result<PixelBuffer, FrameError> {
    let pixels = width as usize * height as usize;
    check_len("RGB3", rgb, pixels * 3)?;

    let mut rgba = Vec::with_capacity(pixels * 4);
    for px in rgb[..pixels * 3].chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    Ok(PixelBuffer::from_rgba(width, height, rgba)?)
}

/// Replicate an 8-bit grey channel into RGBA.
pub fn grey_to_rgba(grey: &[u8], width: u32, height: u32) -> Result<PixelBuffer, FrameError> {
    let pixels = width as usize * height as usize;
    check_len("GREY", grey, pixels)?;

    let mut rgba = Vec::with_capacity(pixels * 4);
    for &p in &grey[..pixels] {
        rgba.extend_from_slice(&[p, p, p, 255]);
    }
    Ok(PixelBuffer::from_rgba(width, height, rgba)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_neutral_chroma_is_grey() {
        // 2x1 image: [Y0=100, U=128, Y1=200, V=128]
        let buf = yuyv_to_rgba(&[100, 128, 200, 128], 2, 1).unwrap();
        assert_eq!(buf.rgb(0, 0), [100, 100, 100]);
        assert_eq!(buf.rgb(1, 0), [200, 200, 200]);
    }

    #[test]
    fn test_yuyv_red_chroma() {
        // Strong V pushes red up and green down.
        let buf = yuyv_to_rgba(&[128, 128, 128, 240], 2, 1).unwrap();
        let [r, g, b] = buf.rgb(0, 0);
        assert!(r > 250);
        assert!(g < 60);
        assert_eq!(b, 128);
    }

    #[test]
    fn test_yuyv_invalid_length() {
        assert!(matches!(
            yuyv_to_rgba(&[100, 128], 2, 1),
            Err(FrameError::InvalidLength { format: "YUYV", expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn test_yuyv_odd_pixel_count() {
        // 3x1 needs 6 bytes: one full chunk and a half chunk.
        let buf = yuyv_to_rgba(&[10, 128, 20, 128, 30, 128], 3, 1).unwrap();
        assert_eq!(buf.rgb(2, 0), [30, 30, 30]);
    }

    #[test]
    fn test_rgb_to_rgba() {
        let buf = rgb_to_rgba(&[1, 2, 3, 4, 5, 6], 2, 1).unwrap();
        assert_eq!(buf.as_raw(), &[1, 2, 3, 255, 4, 5, 6, 255]);
        assert!(rgb_to_rgba(&[1, 2], 1, 1).is_err());
    }

    #[test]
    fn test_grey_to_rgba() {
        let buf = grey_to_rgba(&[7, 9], 1, 2).unwrap();
        assert_eq!(buf.rgb(0, 1), [9, 9, 9]);
    }
}
