//! Garment overlay: one translucent shape per garment, anchored to
//! skeleton joints.
//!
//! Garments are drawn in outfit order, so later items paint over earlier
//! ones. A garment whose anchor joints are not confident enough, or whose
//! type has no body region (accessories), is skipped silently.

use crate::palette;
use crate::surface::{Area, Surface};
use fitmirror_core::{Garment, GarmentType, Joint, Outfit, Skeleton};
use image::Rgba;

const OVERLAY_ALPHA: f32 = 0.6;
const OUTLINE: [u8; 3] = [0x33, 0x33, 0x33];
const OUTLINE_WIDTH: f32 = 2.0;

const PANEL_JOINT_THRESHOLD: f32 = 0.6;
const SHOE_JOINT_THRESHOLD: f32 = 0.5;

const TOP_PAD_X: f32 = 20.0;
const TOP_PAD_Y: f32 = 10.0;
const TOP_EXTRA_HEIGHT: f32 = 20.0;
const TOP_RADIUS: f32 = 10.0;

const BOTTOM_PAD_X: f32 = 10.0;
const BOTTOM_HEIGHT_TRIM: f32 = 20.0;
const BOTTOM_RADIUS: f32 = 5.0;

const SHOE_WIDTH: f32 = 50.0;
const SHOE_HEIGHT: f32 = 25.0;
const SHOE_LABEL_DROP: f32 = 40.0;

/// Where a garment lands on the body.
#[derive(Debug, Clone, PartialEq)]
pub enum GarmentShape {
    /// Rounded panel covering the torso (top) or legs (bottom).
    Panel { area: Area, radius: f32 },
    /// One box per confident ankle; at least one is present.
    Shoes {
        left: Option<Area>,
        right: Option<Area>,
        label_at: (f32, f32),
    },
}

impl GarmentShape {
    pub fn label_at(&self) -> (f32, f32) {
        match self {
            Self::Panel { area, .. } => area.center(),
            Self::Shoes { label_at, .. } => *label_at,
        }
    }
}

/// Compute the shape for a garment type, or `None` if it is not drawn.
pub fn garment_shape(kind: GarmentType, skeleton: &Skeleton) -> Option<GarmentShape> {
    let kp = |j: Joint| skeleton.keypoint(j);

    match kind {
        GarmentType::Top => {
            let (ls, rs) = (kp(Joint::LeftShoulder), kp(Joint::RightShoulder));
            if ls.confidence <= PANEL_JOINT_THRESHOLD || rs.confidence <= PANEL_JOINT_THRESHOLD {
                return None;
            }
            let lh = kp(Joint::LeftHip);
            let area = Area::new(
                ls.x - TOP_PAD_X,
                ls.y - TOP_PAD_Y,
                (rs.x - ls.x).abs() + 2.0 * TOP_PAD_X,
                (lh.y - ls.y).abs() + TOP_EXTRA_HEIGHT,
            );
            Some(GarmentShape::Panel { area, radius: TOP_RADIUS })
        }
        GarmentType::Bottom => {
            let (lh, rh) = (kp(Joint::LeftHip), kp(Joint::RightHip));
            if lh.confidence <= PANEL_JOINT_THRESHOLD || rh.confidence <= PANEL_JOINT_THRESHOLD {
                return None;
            }
            let la = kp(Joint::LeftAnkle);
            let area = Area::new(
                lh.x - BOTTOM_PAD_X,
                lh.y,
                (rh.x - lh.x).abs() + 2.0 * BOTTOM_PAD_X,
                (la.y - lh.y).abs() - BOTTOM_HEIGHT_TRIM,
            );
            Some(GarmentShape::Panel { area, radius: BOTTOM_RADIUS })
        }
        GarmentType::Shoes => {
            let (la, ra) = (kp(Joint::LeftAnkle), kp(Joint::RightAnkle));
            let shoe = |x: f32, y: f32| Area::new(x - SHOE_WIDTH / 2.0, y, SHOE_WIDTH, SHOE_HEIGHT);
            let left = (la.confidence > SHOE_JOINT_THRESHOLD).then(|| shoe(la.x, la.y));
            let right = (ra.confidence > SHOE_JOINT_THRESHOLD).then(|| shoe(ra.x, ra.y));
            if left.is_none() && right.is_none() {
                return None;
            }
            let label_at = ((la.x + ra.x) / 2.0, la.y.max(ra.y) + SHOE_LABEL_DROP);
            Some(GarmentShape::Shoes { left, right, label_at })
        }
        GarmentType::Accessory | GarmentType::Other => None,
    }
}

fn outline() -> Rgba<u8> {
    palette::with_alpha(OUTLINE, OVERLAY_ALPHA)
}

/// Draw one garment. Returns whether anything was drawn.
pub fn draw_garment(surface: &mut dyn Surface, garment: &Garment, skeleton: &Skeleton) -> bool {
    let Some(shape) = garment_shape(garment.kind, skeleton) else {
        tracing::trace!(garment = %garment.name, kind = ?garment.kind, "garment not drawn");
        return false;
    };

    let fill = palette::garment_fill(&garment.color, OVERLAY_ALPHA);
    match &shape {
        GarmentShape::Panel { area, radius } => {
            surface.fill_rounded_rect(*area, *radius, fill);
            surface.stroke_rounded_rect(*area, *radius, outline(), OUTLINE_WIDTH);
        }
        GarmentShape::Shoes { left, right, .. } => {
            for area in [left, right].into_iter().flatten() {
                surface.fill_rect(*area, fill);
                surface.stroke_rect(*area, outline(), OUTLINE_WIDTH);
            }
        }
    }
    surface.label(
        &garment.name,
        shape.label_at(),
        palette::label_color(&garment.color, OVERLAY_ALPHA),
    );
    true
}

/// Draw every garment of the outfit in item order.
pub fn draw_outfit(surface: &mut dyn Surface, outfit: &Outfit, skeleton: &Skeleton) -> usize {
    let drawn = outfit
        .items
        .iter()
        .filter(|g| draw_garment(surface, g, skeleton))
        .count();
    tracing::trace!(outfit = %outfit.name, drawn, total = outfit.items.len(), "outfit overlay");
    drawn
}
