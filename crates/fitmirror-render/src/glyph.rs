//! 3x5 bitmap font for overlay labels.
//!
//! Letters are case-folded; characters without a glyph render as blanks
//! but still advance the cursor.

/// Pixel scale applied to each glyph cell.
pub const SCALE: i64 = 2;
const GLYPH_WIDTH: i64 = 3;
const GLYPH_HEIGHT: i64 = 5;
/// Horizontal distance between glyph origins, in glyph cells.
const ADVANCE: i64 = 4;

/// Rows of a glyph, top to bottom; bit 2 is the leftmost column.
pub fn glyph(ch: char) -> [u8; 5] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '&' => [0b010, 0b101, 0b010, 0b101, 0b011],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        _ => [0; 5],
    }
}

/// Rendered size of `text` in pixels.
pub fn text_size(text: &str) -> (i64, i64) {
    let n = text.chars().count() as i64;
    if n == 0 {
        return (0, 0);
    }
    (((n - 1) * ADVANCE + GLYPH_WIDTH) * SCALE, GLYPH_HEIGHT * SCALE)
}

/// Visit every lit pixel of `text` with its top-left corner at (`x`, `y`).
pub fn for_each_pixel(text: &str, x: i64, y: i64, mut f: impl FnMut(i64, i64)) {
    for (i, ch) in text.chars().enumerate() {
        let origin = x + i as i64 * ADVANCE * SCALE;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        f(origin + col * SCALE + dx, y + row as i64 * SCALE + dy);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_size() {
        assert_eq!(text_size(""), (0, 0));
        assert_eq!(text_size("A"), (6, 10));
        assert_eq!(text_size("Face: 93%"), ((8 * 4 + 3) * 2, 10));
    }

    #[test]
    fn test_letters_are_case_folded() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_ne!(glyph('A'), glyph('B'));
        assert_eq!(glyph('~'), [0; 5]);
    }

    #[test]
    fn test_pixels_follow_bitmap() {
        let mut lit = Vec::new();
        for_each_pixel("-", 10, 20, |x, y| lit.push((x, y)));
        // middle row of three cells, each 2x2
        assert_eq!(lit.len(), 3 * 4);
        assert!(lit.iter().all(|&(_, y)| y == 24 || y == 25));
        assert_eq!(lit.iter().map(|&(x, _)| x).min(), Some(10));
        assert_eq!(lit.iter().map(|&(x, _)| x).max(), Some(15));
    }

    #[test]
    fn test_blank_glyph_still_advances() {
        let mut xs = Vec::new();
        for_each_pixel(" 1", 0, 0, |x, _| xs.push(x));
        assert!(xs.iter().all(|&x| x >= 8));
    }
}
