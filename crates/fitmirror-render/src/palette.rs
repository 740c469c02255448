//! Garment colour names to drawable colours.

use image::Rgba;

/// Fixed palette for catalog colour names, matched case-insensitively.
const GARMENT_PALETTE: [(&str, &str); 4] = [
    ("navy blue", "#000080"),
    ("white", "#ffffff"),
    ("black", "#000000"),
    ("blue", "#0066cc"),
];

/// Basic CSS names accepted when a catalog colour passes through unmapped.
const CSS_NAMES: [(&str, [u8; 3]); 12] = [
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("beige", [245, 245, 220]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("navy", [0, 0, 128]),
    ("maroon", [128, 0, 0]),
];

/// Used when a colour cannot be parsed.
const FALLBACK: [u8; 3] = [128, 128, 128];

/// Map a catalog colour to its CSS value. Unmapped colours pass through
/// lowercased.
pub fn resolve(color: &str) -> String {
    let lower = color.trim().to_lowercase();
    GARMENT_PALETTE
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, hex)| hex.to_string())
        .unwrap_or(lower)
}

/// Parse `#rgb`, `#rrggbb`, or a basic CSS colour name.
pub fn parse_css(value: &str) -> Option<[u8; 3]> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<Vec<u8>>>()?;
        return match digits.as_slice() {
            [r, g, b] => Some([r * 17, g * 17, b * 17]),
            [r1, r0, g1, g0, b1, b0] => Some([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0]),
            _ => None,
        };
    }
    let lower = value.to_lowercase();
    CSS_NAMES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgb)| *rgb)
}

/// Drawable fill for a catalog colour at the given opacity.
pub fn garment_fill(color: &str, alpha: f32) -> Rgba<u8> {
    let css = resolve(color);
    let rgb = parse_css(&css).unwrap_or_else(|| {
        tracing::debug!(color, css = %css, "unparseable garment colour; using fallback");
        FALLBACK
    });
    with_alpha(rgb, alpha)
}

/// Label text colour: black on white garments, white otherwise.
pub fn label_color(color: &str, alpha: f32) -> Rgba<u8> {
    if resolve(color) == "#ffffff" {
        with_alpha([0, 0, 0], alpha)
    } else {
        with_alpha([255, 255, 255], alpha)
    }
}

pub fn with_alpha([r, g, b]: [u8; 3], alpha: f32) -> Rgba<u8> {
    Rgba([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
}
