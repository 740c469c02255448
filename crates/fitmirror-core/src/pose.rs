//! Body presence by vertical-edge density, with a synthesized skeleton.
//!
//! Only the central band of the frame is scanned (20–80% of the width,
//! 20–100% of the height). When more than three blocks show enough
//! vertical edges, a body is assumed and a fixed-proportion skeleton is
//! laid out from a single anchor at the top centre of the frame.

use crate::buffer::{channel_delta, PixelBuffer};
use crate::types::Skeleton;

pub const BODY_BLOCK_SIZE: u32 = 30;
const VERTICAL_EDGE_THRESHOLD: u32 = 40;
const EDGE_RATIO_THRESHOLD: f32 = 0.15;
const MIN_REGIONS_EXCLUSIVE: usize = 3;
const REGIONS_PER_UNIT_CONFIDENCE: f32 = 10.0;
const MAX_CONFIDENCE: f32 = 0.9;
const SCAN_LEFT: f32 = 0.2;
const SCAN_RIGHT: f32 = 0.8;
const SCAN_TOP: f32 = 0.2;
const ANCHOR_TOP: f32 = 0.15;

/// A block of the scan band with enough vertical edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyRegion {
    pub center_x: f32,
    pub center_y: f32,
    pub edge_ratio: f32,
}

#[derive(Debug, Clone)]
pub struct PoseEstimator {
    block_size: u32,
}

impl Default for PoseEstimator {
    fn default() -> Self {
        Self::new(BODY_BLOCK_SIZE)
    }
}

impl PoseEstimator {
    pub fn new(block_size: u32) -> Self {
        Self {
            block_size: block_size.max(2),
        }
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Share of block pixels whose right-hand neighbour differs sharply.
    fn vertical_edge_ratio(&self, buf: &PixelBuffer, x0: u32, y0: u32) -> f32 {
        let b = self.block_size;
        let mut edges = 0u32;
        for dy in 0..b {
            for dx in 0..b - 1 {
                let here = buf.rgb(x0 + dx, y0 + dy);
                let right = buf.rgb(x0 + dx + 1, y0 + dy);
                if channel_delta(here, right) > VERTICAL_EDGE_THRESHOLD {
                    edges += 1;
                }
            }
        }
        edges as f32 / (b * b) as f32
    }

    /// Body-candidate blocks inside the scan band, in scan order.
    pub fn regions(&self, buf: &PixelBuffer) -> Vec<BodyRegion> {
        let b = self.block_size;
        let (w, h) = (buf.width(), buf.height());
        let x_start = (w as f32 * SCAN_LEFT).floor() as u32;
        let x_end = w as f32 * SCAN_RIGHT;
        let y_start = (h as f32 * SCAN_TOP).floor() as u32;
        let half = b as f32 / 2.0;

        let mut out = Vec::new();
        let mut y = y_start;
        while y + b <= h {
            let mut x = x_start;
            while (x as f32) < x_end && x + b <= w {
                let edge_ratio = self.vertical_edge_ratio(buf, x, y);
                if edge_ratio > EDGE_RATIO_THRESHOLD {
                    out.push(BodyRegion {
                        center_x: x as f32 + half,
                        center_y: y as f32 + half,
                        edge_ratio,
                    });
                }
                x += b;
            }
            y += b;
        }
        out
    }

    /// Skeleton when a body silhouette is present, otherwise `None`.
    pub fn estimate(&self, buf: &PixelBuffer) -> Option<Skeleton> {
        let count = self.regions(buf).len();
        tracing::trace!(regions = count, "body estimate");

        if count <= MIN_REGIONS_EXCLUSIVE {
            return None;
        }

        let confidence = (count as f32 / REGIONS_PER_UNIT_CONFIDENCE).min(MAX_CONFIDENCE);
        let center_x = buf.width() as f32 / 2.0;
        let top_y = buf.height() as f32 * ANCHOR_TOP;
        Some(Skeleton::synthesize(center_x, top_y, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Joint;

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    /// Alternating one-pixel black/white columns across the whole frame.
    fn striped(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::solid(w, h, BLACK);
        for y in 0..h {
            for x in (1..w).step_by(2) {
                buf.put(x, y, WHITE);
            }
        }
        buf
    }

    /// Stripe only the given scan-band block columns of one block row.
    fn striped_blocks(w: u32, h: u32, blocks: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::solid(w, h, BLACK);
        let x0 = (w as f32 * SCAN_LEFT).floor() as u32;
        let y0 = (h as f32 * SCAN_TOP).floor() as u32;
        for y in y0..y0 + BODY_BLOCK_SIZE {
            for x in (x0..x0 + blocks * BODY_BLOCK_SIZE).step_by(2) {
                buf.put(x + 1, y, WHITE);
            }
        }
        buf
    }

    #[test]
    fn test_solid_frame_has_no_body() {
        let estimator = PoseEstimator::default();
        for colour in [BLACK, WHITE, [200, 130, 90, 255]] {
            let buf = PixelBuffer::solid(640, 480, colour);
            assert!(estimator.regions(&buf).is_empty());
            assert!(estimator.estimate(&buf).is_none());
        }
    }

    #[test]
    fn test_striped_frame_full_confidence() {
        let estimator = PoseEstimator::default();
        let buf = striped(640, 480);
        let regions = estimator.regions(&buf);
        // rows 96..=426 (12), columns 128..=488 (13)
        assert_eq!(regions.len(), 156);
        assert!(regions
            .iter()
            .all(|r| (r.edge_ratio - 29.0 * 30.0 / 900.0).abs() < 1e-6));

        let skeleton = estimator.estimate(&buf).unwrap();
        assert!((skeleton.confidence - 0.9).abs() < 1e-6);
        let nose = skeleton.keypoint(Joint::Nose);
        assert_eq!(nose.x, 320.0);
        assert_eq!(nose.y, 480.0 * 0.15 + 20.0);
    }

    #[test]
    fn test_scan_band_excludes_edges() {
        let estimator = PoseEstimator::default();
        // stripes only in the outer 20% columns and the top 20% rows
        let mut buf = PixelBuffer::solid(500, 500, BLACK);
        for y in 0..500 {
            for x in (1..100).step_by(2) {
                buf.put(x, y, WHITE);
            }
        }
        for y in 0..100 {
            for x in (1..500).step_by(2) {
                buf.put(x, y, WHITE);
            }
        }
        assert!(estimator.regions(&buf).is_empty());
        assert!(estimator.estimate(&buf).is_none());
    }

    #[test]
    fn test_three_regions_is_not_a_body() {
        let estimator = PoseEstimator::default();
        let buf = striped_blocks(640, 480, 3);
        assert_eq!(estimator.regions(&buf).len(), 3);
        assert!(estimator.estimate(&buf).is_none());
    }

    #[test]
    fn test_four_regions_scale_confidence() {
        let estimator = PoseEstimator::default();
        let buf = striped_blocks(640, 480, 4);
        assert_eq!(estimator.regions(&buf).len(), 4);
        let skeleton = estimator.estimate(&buf).unwrap();
        assert!((skeleton.confidence - 0.4).abs() < 1e-6);
        let shoulder = skeleton.keypoint(Joint::LeftShoulder);
        assert!((shoulder.confidence - 0.36).abs() < 1e-6);
    }

    #[test]
    fn test_small_frame_does_not_panic() {
        let estimator = PoseEstimator::default();
        for (w, h) in [(1, 1), (10, 10), (31, 31), (40, 200)] {
            let buf = striped(w, h);
            let _ = estimator.estimate(&buf);
        }
    }
}
