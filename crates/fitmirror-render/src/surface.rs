//! Drawing surface seam and its raster implementation.

use crate::glyph;
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, Blend};
use serde::Serialize;

/// Axis-aligned rectangle in frame coordinates. May extend past the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Area {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn inset(&self, by: f32) -> Self {
        Self {
            x: self.x + by,
            y: self.y + by,
            width: self.width - 2.0 * by,
            height: self.height - 2.0 * by,
        }
    }

    /// Whether the point lies inside the rectangle with corners rounded
    /// to `radius`.
    fn contains_rounded(&self, px: f32, py: f32, radius: f32) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 {
            return false;
        }
        if px < self.x || py < self.y || px > self.x + self.width || py > self.y + self.height {
            return false;
        }
        let r = radius.max(0.0).min(self.width / 2.0).min(self.height / 2.0);
        if r == 0.0 {
            return true;
        }
        let cx = px.clamp(self.x + r, self.x + self.width - r);
        let cy = py.clamp(self.y + r, self.y + self.height - r);
        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= r * r
    }
}

/// A text label placed on the surface, centred on (`x`, `y`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(skip)]
    pub color: Rgba<u8>,
}

/// Anything the overlay can be drawn on. Colours carry their opacity in
/// the alpha channel.
pub trait Surface {
    fn fill_rounded_rect(&mut self, area: Area, radius: f32, color: Rgba<u8>);

    fn stroke_rounded_rect(&mut self, area: Area, radius: f32, color: Rgba<u8>, width: f32);

    fn fill_rect(&mut self, area: Area, color: Rgba<u8>) {
        self.fill_rounded_rect(area, 0.0, color);
    }

    fn stroke_rect(&mut self, area: Area, color: Rgba<u8>, width: f32) {
        self.stroke_rounded_rect(area, 0.0, color, width);
    }

    /// Outline drawn as `dash`-long segments separated by equal gaps.
    fn stroke_dashed_rect(&mut self, area: Area, color: Rgba<u8>, width: f32, dash: f32);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>, width: f32);

    fn dot(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>);

    fn label(&mut self, text: &str, at: (f32, f32), color: Rgba<u8>);
}

/// Alpha-blending raster surface over an RGBA image.
///
/// Labels are rasterized with the bitmap font in [`glyph`] and also kept
/// alongside the image; read them back with [`labels`](Self::labels).
pub struct RasterSurface {
    canvas: Blend<RgbaImage>,
    labels: Vec<Label>,
}

impl RasterSurface {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            canvas: Blend(image),
            labels: Vec::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas.0
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas.0
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        let (w, h) = self.canvas.0.dimensions();
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            return;
        }
        self.canvas.0.get_pixel_mut(x as u32, y as u32).blend(&color);
    }

    /// Visit every pixel centre inside `area` (clipped to the image).
    fn for_each_pixel(&mut self, area: Area, mut f: impl FnMut(&mut Self, i64, i64, f32, f32)) {
        let (w, h) = self.canvas.0.dimensions();
        let x0 = area.x.floor().max(0.0) as i64;
        let y0 = area.y.floor().max(0.0) as i64;
        let x1 = (area.x + area.width).ceil().min(w as f32) as i64;
        let y1 = (area.y + area.height).ceil().min(h as f32) as i64;
        for y in y0..y1 {
            for x in x0..x1 {
                f(self, x, y, x as f32 + 0.5, y as f32 + 0.5);
            }
        }
    }

    fn segment(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>, width: f32) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            self.dot(from, width / 2.0, color);
            return;
        }
        // Thick lines as parallel one-pixel strokes along the normal.
        let (nx, ny) = (-dy / len, dx / len);
        let passes = width.round().max(1.0) as i32;
        for i in 0..passes {
            let off = i as f32 - (passes - 1) as f32 / 2.0;
            draw_line_segment_mut(
                &mut self.canvas,
                (from.0 + nx * off, from.1 + ny * off),
                (to.0 + nx * off, to.1 + ny * off),
                color,
            );
        }
    }
}

impl Surface for RasterSurface {
    fn fill_rounded_rect(&mut self, area: Area, radius: f32, color: Rgba<u8>) {
        self.for_each_pixel(area, |s, x, y, px, py| {
            if area.contains_rounded(px, py, radius) {
                s.blend_pixel(x, y, color);
            }
        });
    }

    fn stroke_rounded_rect(&mut self, area: Area, radius: f32, color: Rgba<u8>, width: f32) {
        let inner = area.inset(width);
        let inner_radius = (radius - width).max(0.0);
        self.for_each_pixel(area, |s, x, y, px, py| {
            if area.contains_rounded(px, py, radius) && !inner.contains_rounded(px, py, inner_radius) {
                s.blend_pixel(x, y, color);
            }
        });
    }

    fn stroke_dashed_rect(&mut self, area: Area, color: Rgba<u8>, width: f32, dash: f32) {
        let Area { x, y, width: w, height: h } = area;
        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)];
        let dash = dash.max(1.0);
        for edge in corners.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
            let mut t = 0.0;
            while t < len {
                let end = (t + dash).min(len);
                let p = |d: f32| (a.0 + (b.0 - a.0) * d / len, a.1 + (b.1 - a.1) * d / len);
                self.segment(p(t), p(end), color, width);
                t += 2.0 * dash;
            }
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>, width: f32) {
        self.segment(from, to, color, width);
    }

    fn dot(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>) {
        draw_filled_circle_mut(
            &mut self.canvas,
            (center.0.round() as i32, center.1.round() as i32),
            radius.round().max(1.0) as i32,
            color,
        );
    }

    fn label(&mut self, text: &str, at: (f32, f32), color: Rgba<u8>) {
        let (w, h) = glyph::text_size(text);
        let x0 = at.0.round() as i64 - w / 2;
        let y0 = at.1.round() as i64 - h / 2;
        glyph::for_each_pixel(text, x0, y0, |x, y| self.blend_pixel(x, y, color));
        self.labels.push(Label {
            text: text.to_string(),
            x: at.0,
            y: at.1,
            color,
        });
    }
}
