//! fitmirror-core — Pixel-heuristic face and body estimation.
//!
//! Scans RGBA frames in fixed-size blocks for skin-tone and edge density,
//! synthesizes a proportioned skeleton when a body silhouette is present,
//! and classifies the combined detection quality. Also carries the outfit
//! records supplied by the catalog.

pub mod buffer;
pub mod catalog;
pub mod face;
pub mod outfit;
pub mod pose;
pub mod quality;
pub mod types;

pub use buffer::{BufferError, PixelBuffer};
pub use catalog::{Catalog, CatalogError};
pub use face::FaceEstimator;
pub use outfit::{Garment, GarmentType, Outfit};
pub use pose::PoseEstimator;
pub use quality::DetectionQuality;
pub use types::{FaceRegion, Joint, Keypoint, Skeleton};
