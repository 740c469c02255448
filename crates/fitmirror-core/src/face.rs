//! Face region estimation by block-wise skin-tone and edge density.
//!
//! The frame is split into non-overlapping square blocks, scanned
//! left-to-right, top-to-bottom. Each block is scored on the share of
//! skin-coloured pixels and the share of pixels that differ sharply from
//! their upper-left neighbour. The best candidate block, perturbed by a
//! small jitter, becomes a fixed-size face box.

use crate::buffer::{channel_delta, PixelBuffer};
use crate::types::FaceRegion;
use rand::Rng;

// --- Heuristic contract (thresholds are compared strictly) ---
pub const FACE_BLOCK_SIZE: u32 = 20;
const EDGE_DELTA_THRESHOLD: u32 = 30;
const SKIN_RATIO_THRESHOLD: f32 = 0.3;
const EDGE_RATIO_THRESHOLD: f32 = 0.1;
const SKIN_WEIGHT: f32 = 0.7;
const EDGE_WEIGHT: f32 = 0.3;
const ACCEPT_THRESHOLD: f32 = 0.5;
const MAX_CONFIDENCE: f32 = 0.95;
const FACE_BOX_WIDTH: f32 = 120.0;
const FACE_BOX_HEIGHT: f32 = 160.0;

/// Default jitter spread: the score moves by at most ±0.05.
pub const DEFAULT_JITTER: f32 = 0.1;

/// Per-block pixel statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStats {
    pub skin_ratio: f32,
    pub edge_ratio: f32,
}

impl BlockStats {
    pub fn score(&self) -> f32 {
        SKIN_WEIGHT * self.skin_ratio + EDGE_WEIGHT * self.edge_ratio
    }

    pub fn is_candidate(&self) -> bool {
        self.skin_ratio > SKIN_RATIO_THRESHOLD && self.edge_ratio > EDGE_RATIO_THRESHOLD
    }
}

/// A block that passed both thresholds, located by its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceCandidate {
    pub center_x: f32,
    pub center_y: f32,
    pub score: f32,
}

/// Simple RGB skin-tone rule.
#[inline]
pub fn is_skin_tone([r, g, b]: [u8; 3]) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95
        && g > 40
        && b > 20
        && max - min > 15
        && (r as i16 - g as i16).abs() > 15
        && r > g
        && r > b
}

#[derive(Debug, Clone)]
pub struct FaceEstimator {
    block_size: u32,
    jitter: f32,
}

impl Default for FaceEstimator {
    fn default() -> Self {
        Self::new(FACE_BLOCK_SIZE, DEFAULT_JITTER)
    }
}

impl FaceEstimator {
    /// `jitter` is the total spread of the uniform noise added to the
    /// winning score; zero disables it.
    pub fn new(block_size: u32, jitter: f32) -> Self {
        Self {
            block_size: block_size.max(2),
            jitter: jitter.max(0.0),
        }
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Skin and edge ratios for the block whose top-left corner is (x0, y0).
    pub fn block_stats(&self, buf: &PixelBuffer, x0: u32, y0: u32) -> BlockStats {
        let b = self.block_size;
        let mut skin = 0u32;
        let mut edges = 0u32;

        for dy in 0..b {
            for dx in 0..b {
                let px = buf.rgb(x0 + dx, y0 + dy);
                if is_skin_tone(px) {
                    skin += 1;
                }
                if dx > 0 && dy > 0 {
                    let diag = buf.rgb(x0 + dx - 1, y0 + dy - 1);
                    if channel_delta(px, diag) > EDGE_DELTA_THRESHOLD {
                        edges += 1;
                    }
                }
            }
        }

        let total = (b * b) as f32;
        BlockStats {
            skin_ratio: skin as f32 / total,
            edge_ratio: edges as f32 / total,
        }
    }

    /// All candidate blocks in scan order. Partial trailing blocks are skipped.
    pub fn candidates(&self, buf: &PixelBuffer) -> Vec<FaceCandidate> {
        let b = self.block_size;
        let half = b as f32 / 2.0;
        let mut out = Vec::new();

        let mut y = 0;
        while y + b <= buf.height() {
            let mut x = 0;
            while x + b <= buf.width() {
                let stats = self.block_stats(buf, x, y);
                if stats.is_candidate() {
                    out.push(FaceCandidate {
                        center_x: x as f32 + half,
                        center_y: y as f32 + half,
                        score: stats.score(),
                    });
                }
                x += b;
            }
            y += b;
        }

        out
    }

    /// Estimate the face region, or `None` when no block is convincing.
    ///
    /// Ties between candidates go to the first one in scan order. The
    /// jitter is drawn from `rng` only when a candidate exists.
    pub fn estimate<R: Rng + ?Sized>(&self, buf: &PixelBuffer, rng: &mut R) -> Option<FaceRegion> {
        let candidates = self.candidates(buf);
        let best = candidates
            .iter()
            .copied()
            .reduce(|best, c| if c.score > best.score { c } else { best })?;

        let noise = if self.jitter > 0.0 {
            (rng.gen::<f32>() - 0.5) * self.jitter
        } else {
            0.0
        };
        let confidence = (best.score + noise).min(MAX_CONFIDENCE).clamp(0.0, 1.0);

        tracing::trace!(
            candidates = candidates.len(),
            score = best.score,
            confidence,
            "face estimate"
        );

        if confidence <= ACCEPT_THRESHOLD {
            return None;
        }

        Some(FaceRegion {
            x: (best.center_x - FACE_BOX_WIDTH / 2.0).max(0.0),
            y: (best.center_y - FACE_BOX_HEIGHT / 2.0).max(0.0),
            width: FACE_BOX_WIDTH,
            height: FACE_BOX_HEIGHT,
            confidence,
        })
    }
}
