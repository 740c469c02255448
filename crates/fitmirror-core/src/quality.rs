//! Three-level detection quality from face and body confidences.

use crate::types::{FaceRegion, Skeleton};
use serde::{Deserialize, Serialize};

const EXCELLENT_THRESHOLD: f32 = 0.8;
const GOOD_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionQuality {
    #[default]
    Poor,
    Good,
    Excellent,
}

impl DetectionQuality {
    /// Classify from optional confidences.
    ///
    /// With both present the average must strictly exceed 0.8 (excellent)
    /// or 0.6 (good). A single present detection is always good.
    pub fn classify(face: Option<f32>, body: Option<f32>) -> Self {
        match (face, body) {
            (Some(cf), Some(cb)) => {
                let avg = (cf + cb) / 2.0;
                if avg > EXCELLENT_THRESHOLD {
                    Self::Excellent
                } else if avg > GOOD_THRESHOLD {
                    Self::Good
                } else {
                    Self::Poor
                }
            }
            (Some(_), None) | (None, Some(_)) => Self::Good,
            (None, None) => Self::Poor,
        }
    }

    pub fn assess(face: Option<&FaceRegion>, body: Option<&Skeleton>) -> Self {
        Self::classify(face.map(|f| f.confidence), body.map(|b| b.confidence))
    }

    pub fn status_text(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent Detection",
            Self::Good => "Good Detection",
            Self::Poor => "Poor Detection",
        }
    }
}

impl std::fmt::Display for DetectionQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Poor => "poor",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_high_is_excellent() {
        assert_eq!(DetectionQuality::classify(Some(0.9), Some(0.9)), DetectionQuality::Excellent);
    }

    #[test]
    fn test_average_exactly_six_tenths_is_poor() {
        assert_eq!(DetectionQuality::classify(Some(0.7), Some(0.5)), DetectionQuality::Poor);
        assert_eq!(DetectionQuality::classify(Some(0.6), Some(0.6)), DetectionQuality::Poor);
    }

    #[test]
    fn test_average_exactly_eight_tenths_is_good() {
        assert_eq!(DetectionQuality::classify(Some(0.8), Some(0.8)), DetectionQuality::Good);
    }

    #[test]
    fn test_middle_band_is_good() {
        assert_eq!(DetectionQuality::classify(Some(0.9), Some(0.5)), DetectionQuality::Good);
    }

    #[test]
    fn test_single_detection_is_good() {
        assert_eq!(DetectionQuality::classify(Some(0.1), None), DetectionQuality::Good);
        assert_eq!(DetectionQuality::classify(None, Some(0.4)), DetectionQuality::Good);
    }

    #[test]
    fn test_nothing_is_poor() {
        assert_eq!(DetectionQuality::classify(None, None), DetectionQuality::Poor);
        assert_eq!(DetectionQuality::default(), DetectionQuality::Poor);
    }

    #[test]
    fn test_assess_from_records() {
        let face = FaceRegion { x: 0.0, y: 0.0, width: 120.0, height: 160.0, confidence: 0.95 };
        let body = Skeleton::synthesize(320.0, 72.0, 0.9);
        assert_eq!(DetectionQuality::assess(Some(&face), Some(&body)), DetectionQuality::Excellent);
        assert_eq!(DetectionQuality::assess(None, Some(&body)), DetectionQuality::Good);
    }

    #[test]
    fn test_serde_and_text() {
        assert_eq!(serde_json::to_string(&DetectionQuality::Good).unwrap(), "\"good\"");
        assert_eq!(DetectionQuality::Excellent.status_text(), "Excellent Detection");
        assert_eq!(DetectionQuality::Poor.to_string(), "poor");
    }
}
