//! fitmirror-render — Drawing detections and garments over camera frames.
//!
//! All drawing goes through the [`Surface`] trait; [`RasterSurface`]
//! implements it over an RGBA image with alpha blending.

pub mod capture;
pub mod glyph;
pub mod markers;
pub mod overlay;
pub mod palette;
pub mod surface;

pub use capture::{capture, capture_file_name, compose_display, OVERLAY_BODY_THRESHOLD};
pub use overlay::{draw_outfit, garment_shape, GarmentShape};
pub use surface::{Area, Label, RasterSurface, Surface};
