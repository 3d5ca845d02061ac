//! Built-in 5x7 font used when no bitmap font is active.
//!
//! Glyphs are stored column-major, five bytes per character, least
//! significant bit at the top. Each character occupies a 6x8 cell.

pub const CELL_WIDTH: i32 = 6;
pub const CELL_HEIGHT: i32 = 8;

/// Pixel size assumed when a font name carries no size hint.
pub const DEFAULT_PX: i32 = 7;

const FIRST: u8 = 0x20;
const LAST: u8 = 0x7E;

#[rustfmt::skip]
const GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00],
    [0x00, 0x07, 0x00, 0x07, 0x00],
    [0x14, 0x7F, 0x14, 0x7F, 0x14],
    [0x24, 0x2A, 0x7F, 0x2A, 0x12],
    [0x23, 0x13, 0x08, 0x64, 0x62],
    [0x36, 0x49, 0x56, 0x20, 0x50],
    [0x00, 0x08, 0x07, 0x03, 0x00],
    [0x00, 0x1C, 0x22, 0x41, 0x00],
    [0x00, 0x41, 0x22, 0x1C, 0x00],
    [0x2A, 0x1C, 0x7F, 0x1C, 0x2A],
    [0x08, 0x08, 0x3E, 0x08, 0x08],
    [0x00, 0x80, 0x70, 0x30, 0x00],
    [0x08, 0x08, 0x08, 0x08, 0x08],
    [0x00, 0x00, 0x60, 0x60, 0x00],
    [0x20, 0x10, 0x08, 0x04, 0x02],
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00],
    [0x72, 0x49, 0x49, 0x49, 0x46],
    [0x21, 0x41, 0x49, 0x4D, 0x33],
    [0x18, 0x14, 0x12, 0x7F, 0x10],
    [0x27, 0x45, 0x45, 0x45, 0x39],
    [0x3C, 0x4A, 0x49, 0x49, 0x31],
    [0x41, 0x21, 0x11, 0x09, 0x07],
    [0x36, 0x49, 0x49, 0x49, 0x36],
    [0x46, 0x49, 0x49, 0x29, 0x1E],
    [0x00, 0x00, 0x14, 0x00, 0x00],
    [0x00, 0x40, 0x34, 0x00, 0x00],
    [0x00, 0x08, 0x14, 0x22, 0x41],
    [0x14, 0x14, 0x14, 0x14, 0x14],
    [0x00, 0x41, 0x22, 0x14, 0x08],
    [0x02, 0x01, 0x59, 0x09, 0x06],
    [0x3E, 0x41, 0x5D, 0x59, 0x4E], // '@'
    [0x7C, 0x12, 0x11, 0x12, 0x7C],
    [0x7F, 0x49, 0x49, 0x49, 0x36],
    [0x3E, 0x41, 0x41, 0x41, 0x22],
    [0x7F, 0x41, 0x41, 0x41, 0x3E],
    [0x7F, 0x49, 0x49, 0x49, 0x41],
    [0x7F, 0x09, 0x09, 0x09, 0x01],
    [0x3E, 0x41, 0x41, 0x51, 0x73],
    [0x7F, 0x08, 0x08, 0x08, 0x7F],
    [0x00, 0x41, 0x7F, 0x41, 0x00],
    [0x20, 0x40, 0x41, 0x3F, 0x01],
    [0x7F, 0x08, 0x14, 0x22, 0x41],
    [0x7F, 0x40, 0x40, 0x40, 0x40],
    [0x7F, 0x02, 0x1C, 0x02, 0x7F],
    [0x7F, 0x04, 0x08, 0x10, 0x7F],
    [0x3E, 0x41, 0x41, 0x41, 0x3E],
    [0x7F, 0x09, 0x09, 0x09, 0x06],
    [0x3E, 0x41, 0x51, 0x21, 0x5E],
    [0x7F, 0x09, 0x19, 0x29, 0x46],
    [0x26, 0x49, 0x49, 0x49, 0x32],
    [0x03, 0x01, 0x7F, 0x01, 0x03],
    [0x3F, 0x40, 0x40, 0x40, 0x3F],
    [0x1F, 0x20, 0x40, 0x20, 0x1F],
    [0x3F, 0x40, 0x38, 0x40, 0x3F],
    [0x63, 0x14, 0x08, 0x14, 0x63],
    [0x03, 0x04, 0x78, 0x04, 0x03],
    [0x61, 0x59, 0x49, 0x4D, 0x43],
    [0x00, 0x7F, 0x41, 0x41, 0x41],
    [0x02, 0x04, 0x08, 0x10, 0x20],
    [0x00, 0x41, 0x41, 0x41, 0x7F],
    [0x04, 0x02, 0x01, 0x02, 0x04],
    [0x40, 0x40, 0x40, 0x40, 0x40],
    [0x00, 0x03, 0x07, 0x08, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x78, 0x40],
    [0x7F, 0x28, 0x44, 0x44, 0x38],
    [0x38, 0x44, 0x44, 0x44, 0x28],
    [0x38, 0x44, 0x44, 0x28, 0x7F],
    [0x38, 0x54, 0x54, 0x54, 0x18],
    [0x00, 0x08, 0x7E, 0x09, 0x02],
    [0x18, 0xA4, 0xA4, 0x9C, 0x78],
    [0x7F, 0x08, 0x04, 0x04, 0x78],
    [0x00, 0x44, 0x7D, 0x40, 0x00],
    [0x20, 0x40, 0x40, 0x3D, 0x00],
    [0x7F, 0x10, 0x28, 0x44, 0x00],
    [0x00, 0x41, 0x7F, 0x40, 0x00],
    [0x7C, 0x04, 0x78, 0x04, 0x78],
    [0x7C, 0x08, 0x04, 0x04, 0x78],
    [0x38, 0x44, 0x44, 0x44, 0x38],
    [0xFC, 0x18, 0x24, 0x24, 0x18],
    [0x18, 0x24, 0x24, 0x18, 0xFC],
    [0x7C, 0x08, 0x04, 0x04, 0x08],
    [0x48, 0x54, 0x54, 0x54, 0x24],
    [0x04, 0x04, 0x3F, 0x44, 0x24],
    [0x3C, 0x40, 0x40, 0x20, 0x7C],
    [0x1C, 0x20, 0x40, 0x20, 0x1C],
    [0x3C, 0x40, 0x30, 0x40, 0x3C],
    [0x44, 0x28, 0x10, 0x28, 0x44],
    [0x4C, 0x90, 0x90, 0x90, 0x7C],
    [0x44, 0x64, 0x54, 0x4C, 0x44],
    [0x00, 0x08, 0x36, 0x41, 0x00],
    [0x00, 0x00, 0x77, 0x00, 0x00],
    [0x00, 0x41, 0x36, 0x08, 0x00],
    [0x02, 0x01, 0x02, 0x04, 0x02], // '~'
];

/// Column bytes for a printable ASCII character.
pub fn glyph(ch: char) -> Option<&'static [u8; 5]> {
    if ch.is_ascii() && (FIRST..=LAST).contains(&(ch as u8)) {
        Some(&GLYPHS[(ch as u8 - FIRST) as usize])
    } else {
        None
    }
}

/// Device pixels per font dot for a nominal pixel size at a given scale.
pub fn dot_size(px: i32, scale: i64) -> i64 {
    (px as f64 * scale as f64 / CELL_HEIGHT as f64).round().max(1.0) as i64
}

/// Advance in display units, or `None` when the text has characters the
/// built-in font cannot draw.
pub fn measure(text: &str, px: i32, scale: i64) -> Option<i32> {
    if !text.chars().all(|ch| glyph(ch).is_some()) {
        return None;
    }
    let k = dot_size(px, scale) as f64;
    let width = text.chars().count() as f64 * CELL_WIDTH as f64 * k;
    Some((width / scale.max(1) as f64).round() as i32)
}

/// Pixel size hinted by a font name: the larger side of an `AxB` pair,
/// else the largest number in the name.
pub fn guess_size(name: &str) -> Option<i32> {
    let runs = digit_runs(name);
    for pair in runs.windows(2) {
        let ((_, a_end, a), (b_start, _, b)) = (pair[0], pair[1]);
        if b_start == a_end + 1 && name[a_end..b_start].eq_ignore_ascii_case("x") {
            return Some(a.max(b));
        }
    }
    runs.iter().map(|&(_, _, n)| n).max()
}

/// Fallback pixel size for a font name that could not be resolved.
pub fn guess_px(name: &str) -> i32 {
    guess_size(name).unwrap_or(DEFAULT_PX)
}

fn digit_runs(name: &str) -> Vec<(usize, usize, i32)> {
    let mut runs = vec![];
    let mut start = None;
    for (index, ch) in name.char_indices().chain(std::iter::once((name.len(), ' '))) {
        match (ch.is_ascii_digit(), start) {
            (true, None) => start = Some(index),
            (false, Some(s)) => {
                if let Ok(n) = name[s..index].parse() {
                    runs.push((s, index, n));
                }
                start = None;
            }
            _ => {}
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_px() {
        assert_eq!(guess_px("unknown_font_12x16"), 16);
        assert_eq!(guess_px("u8g2_font_ncenB14_tr"), 14);
        assert_eq!(guess_px("u8g2_font_6x10_tf"), 10);
        assert_eq!(guess_px("Helvetica"), 7);
    }

    #[test]
    fn test_glyph_range() {
        assert!(glyph(' ').is_some());
        assert_eq!(glyph('0'), Some(&[0x3E, 0x51, 0x49, 0x45, 0x3E]));
        assert_eq!(glyph('~'), Some(&[0x02, 0x01, 0x02, 0x04, 0x02]));
        assert!(glyph('\u{7f}').is_none());
        assert!(glyph('é').is_none());
    }

    #[test]
    fn test_measure() {
        assert_eq!(dot_size(7, 2), 2);
        assert_eq!(dot_size(7, 1), 1);
        assert_eq!(measure("hi", 7, 2), Some(12));
        assert_eq!(measure("héllo", 7, 2), None);
        assert!(dot_size(i32::MAX, u32::MAX as i64) > i32::MAX as i64);
        assert_eq!(measure("hi", i32::MAX, 2), Some(i32::MAX));
    }
}
