//! Display composition and still capture.

use crate::markers;
use crate::overlay;
use crate::surface::RasterSurface;
use fitmirror_core::{FaceRegion, Outfit, PixelBuffer, Skeleton};
use image::RgbaImage;

/// The outfit is only composited over a confidently detected body.
pub const OVERLAY_BODY_THRESHOLD: f32 = 0.6;

fn overlay_outfit(surface: &mut RasterSurface, outfit: Option<&Outfit>, body: Option<&Skeleton>) {
    if let (Some(outfit), Some(body)) = (outfit, body) {
        if body.confidence > OVERLAY_BODY_THRESHOLD {
            overlay::draw_outfit(surface, outfit, body);
        }
    }
}

/// One display frame: video, detection markers, then the outfit overlay.
pub fn compose_display(
    frame: &PixelBuffer,
    face: Option<&FaceRegion>,
    body: Option<&Skeleton>,
    outfit: Option<&Outfit>,
) -> RasterSurface {
    let mut surface = RasterSurface::new(frame.to_image());
    if let Some(face) = face {
        markers::draw_face(&mut surface, face);
    }
    if let Some(body) = body {
        markers::draw_skeleton(&mut surface, body);
    }
    overlay_outfit(&mut surface, outfit, body);
    surface
}

/// Compose the frame with the garment overlay into a still image.
///
/// Detection markers are left out; the result depends only on the inputs.
pub fn capture(frame: &PixelBuffer, outfit: Option<&Outfit>, skeleton: Option<&Skeleton>) -> RgbaImage {
    let mut surface = RasterSurface::new(frame.to_image());
    overlay_outfit(&mut surface, outfit, skeleton);
    surface.into_image()
}

/// `tryon-<slug>.png` for a selected outfit, `tryon-photo.png` otherwise.
pub fn capture_file_name(outfit: Option<&Outfit>) -> String {
    match outfit {
        Some(outfit) => format!("tryon-{}.png", outfit.slug()),
        None => "tryon-photo.png".to_string(),
    }
}
