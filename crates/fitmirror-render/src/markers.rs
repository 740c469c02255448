//! Detection markers: face box and body skeleton.

use crate::palette::with_alpha;
use crate::surface::{Area, Surface};
use fitmirror_core::{FaceRegion, Joint, Skeleton};
use image::Rgba;

/// Minimum confidence for a detection (or a joint) to be shown.
const SHOW_THRESHOLD: f32 = 0.5;
const LINE_WIDTH: f32 = 3.0;
const DASH: f32 = 5.0;
const JOINT_RADIUS: f32 = 4.0;
const FACE_LABEL_RAISE: f32 = 10.0;
const BODY_LABEL_RAISE: f32 = 30.0;

/// Limb connections drawn between joints.
pub const LIMBS: [(Joint, Joint); 12] = [
    (Joint::LeftShoulder, Joint::RightShoulder),
    (Joint::LeftShoulder, Joint::LeftElbow),
    (Joint::LeftElbow, Joint::LeftWrist),
    (Joint::RightShoulder, Joint::RightElbow),
    (Joint::RightElbow, Joint::RightWrist),
    (Joint::LeftShoulder, Joint::LeftHip),
    (Joint::RightShoulder, Joint::RightHip),
    (Joint::LeftHip, Joint::RightHip),
    (Joint::LeftHip, Joint::LeftKnee),
    (Joint::LeftKnee, Joint::LeftAnkle),
    (Joint::RightHip, Joint::RightKnee),
    (Joint::RightKnee, Joint::RightAnkle),
];

/// Green above 0.8, yellow above 0.6, orange otherwise.
pub fn confidence_color(confidence: f32) -> Rgba<u8> {
    if confidence > 0.8 {
        with_alpha([0x00, 0xff, 0x00], 1.0)
    } else if confidence > 0.6 {
        with_alpha([0xff, 0xff, 0x00], 1.0)
    } else {
        with_alpha([0xff, 0x66, 0x00], 1.0)
    }
}

fn percent(confidence: f32) -> u32 {
    (confidence * 100.0).round() as u32
}

/// Dashed face box with a confidence label above it.
pub fn draw_face(surface: &mut dyn Surface, face: &FaceRegion) -> bool {
    if face.confidence <= SHOW_THRESHOLD {
        return false;
    }
    let color = confidence_color(face.confidence);
    let area = Area::new(face.x, face.y, face.width, face.height);
    surface.stroke_dashed_rect(area, color, LINE_WIDTH, DASH);
    surface.label(
        &format!("Face: {}%", percent(face.confidence)),
        (face.x + face.width / 2.0, face.y - FACE_LABEL_RAISE),
        color,
    );
    true
}

/// Limbs, joints, and a confidence label above the nose.
pub fn draw_skeleton(surface: &mut dyn Surface, skeleton: &Skeleton) -> bool {
    if skeleton.confidence <= SHOW_THRESHOLD {
        return false;
    }
    let color = confidence_color(skeleton.confidence);

    for (a, b) in LIMBS {
        let (p, q) = (skeleton.keypoint(a), skeleton.keypoint(b));
        if p.confidence > SHOW_THRESHOLD && q.confidence > SHOW_THRESHOLD {
            surface.line((p.x, p.y), (q.x, q.y), color, LINE_WIDTH);
        }
    }
    for (_, point) in skeleton.iter() {
        if point.confidence > SHOW_THRESHOLD {
            surface.dot((point.x, point.y), JOINT_RADIUS, color);
        }
    }

    let nose = skeleton.keypoint(Joint::Nose);
    surface.label(
        &format!("Body: {}%", percent(skeleton.confidence)),
        (nose.x, nose.y - BODY_LABEL_RAISE),
        color,
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;
    use image::RgbaImage;

    fn canvas() -> RasterSurface {
        RasterSurface::new(RgbaImage::from_pixel(640, 600, Rgba([0, 0, 0, 255])))
    }

    #[test]
    fn test_confidence_colors() {
        assert_eq!(confidence_color(0.81), Rgba([0, 255, 0, 255]));
        assert_eq!(confidence_color(0.8), Rgba([255, 255, 0, 255]));
        assert_eq!(confidence_color(0.6), Rgba([255, 102, 0, 255]));
    }

    #[test]
    fn test_face_label_and_threshold() {
        let mut s = canvas();
        let face = FaceRegion { x: 100.0, y: 50.0, width: 120.0, height: 160.0, confidence: 0.93 };
        assert!(draw_face(&mut s, &face));
        assert_eq!(s.labels()[0].text, "Face: 93%");
        assert_eq!((s.labels()[0].x, s.labels()[0].y), (160.0, 40.0));
        // dashed outline starts at the corner
        assert_eq!(*s.image().get_pixel(100, 50), Rgba([0, 255, 0, 255]));

        let weak = FaceRegion { confidence: 0.5, ..face };
        let mut s = canvas();
        assert!(!draw_face(&mut s, &weak));
        assert!(s.labels().is_empty());
    }

    #[test]
    fn test_skeleton_drawn_with_joints() {
        let mut s = canvas();
        let skeleton = Skeleton::synthesize(320.0, 72.0, 0.9);
        assert!(draw_skeleton(&mut s, &skeleton));
        assert_eq!(s.labels()[0].text, "Body: 90%");
        // joint dot at the left shoulder; shoulder line midpoint
        assert_ne!(*s.image().get_pixel(260, 152), Rgba([0, 0, 0, 255]));
        assert_ne!(*s.image().get_pixel(320, 152), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_weak_skeleton_hidden() {
        let mut s = canvas();
        let skeleton = Skeleton::synthesize(320.0, 72.0, 0.4);
        assert!(!draw_skeleton(&mut s, &skeleton));
        assert!(s.image().pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_low_confidence_joints_skipped() {
        let mut s = canvas();
        // overall 0.6: wrists/ankles/ears at 0.42 are hidden, shoulders 0.54 shown
        let skeleton = Skeleton::synthesize(320.0, 72.0, 0.6);
        assert!(draw_skeleton(&mut s, &skeleton));
        assert_eq!(*s.image().get_pixel(230, 272), Rgba([0, 0, 0, 255])); // left wrist
        assert_ne!(*s.image().get_pixel(260, 152), Rgba([0, 0, 0, 255])); // left shoulder
    }
}
