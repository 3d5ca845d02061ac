use super::{BitmapFont, Glyph};
use std::collections::BTreeMap;

/// Parses BDF text. Header lines that fail to parse are ignored and glyph
/// blocks without a usable `ENCODING` are dropped; parsing itself never
/// fails.
pub fn parse_bdf(text: &str) -> BitmapFont {
    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let mut name = String::from("BDF");
    let mut ascent = 8;
    let mut descent = 0;
    let mut glyphs = BTreeMap::new();
    while let Some(line) = lines.next() {
        if let Some(rest) = line.strip_prefix("FONT ") {
            name = rest.trim().to_string();
        } else if line.starts_with("FONT_ASCENT") {
            ascent = field(line, 1).unwrap_or(ascent);
        } else if line.starts_with("FONT_DESCENT") {
            descent = field(line, 1).unwrap_or(descent);
        } else if line.starts_with("STARTCHAR") {
            if let Some(glyph) = parse_glyph(&mut lines) {
                glyphs.insert(glyph.codepoint, glyph);
            }
        }
    }
    let line_height = match ascent.saturating_add(descent) {
        0 => 8,
        n => n,
    };
    BitmapFont {
        name,
        ascent,
        descent,
        line_height,
        glyphs,
    }
}

/// Glyphs wider or taller than this are dropped.
const MAX_GLYPH_SIDE: i32 = 4096;

fn field(line: &str, index: usize) -> Option<i32> {
    line.split_whitespace().nth(index)?.parse().ok()
}

fn parse_glyph<'a, I: Iterator<Item = &'a str>>(lines: &mut I) -> Option<Glyph> {
    let mut encoding: i64 = -1;
    let mut device_width = 0;
    let (mut width, mut height, mut x_offset, mut y_offset) = (0, 0, 0, 0);
    for line in lines.by_ref() {
        if line.starts_with("ENCODING") {
            encoding = line
                .split_whitespace()
                .nth(1)
                .and_then(|s| s.parse().ok())
                .unwrap_or(-1);
        } else if line.starts_with("DWIDTH") {
            device_width = field(line, 1).unwrap_or(device_width);
        } else if line.starts_with("BBX") {
            let bbx: Option<Vec<i32>> = (1..=4).map(|i| field(line, i)).collect();
            if let Some(bbx) = bbx {
                width = bbx[0].max(0);
                height = bbx[1].max(0);
                x_offset = bbx[2];
                y_offset = bbx[3];
            }
        } else if line.starts_with("BITMAP") {
            break;
        }
    }
    let mut rows = vec![];
    for line in lines.by_ref() {
        if line.starts_with("ENDCHAR") {
            break;
        }
        if rows.len() < height as usize && width <= MAX_GLYPH_SIDE {
            rows.push(hex_to_bits(line.trim(), width as usize));
        }
    }
    if encoding < 0 || encoding > u32::max_value() as i64 {
        return None;
    }
    if width > MAX_GLYPH_SIDE || height > MAX_GLYPH_SIDE {
        return None;
    }
    Some(Glyph {
        codepoint: encoding as u32,
        width,
        height,
        x_offset,
        y_offset,
        device_width: if device_width == 0 { width } else { device_width },
        rows,
    })
}

/// Decodes one bitmap row to exactly `width` bits, most significant first.
///
/// The row value sits right-aligned in `max(width, 4 * digits)` bits and
/// the leading `width` bits are kept, so extra low-order padding is cut and
/// a short row gains leading zeros. Decoding stops at the first character
/// that is not a hex digit.
pub fn hex_to_bits(hex: &str, width: usize) -> Vec<bool> {
    let total = width.max(hex.chars().count() * 4);
    let digits: Vec<u32> = hex.chars().map_while(|c| c.to_digit(16)).collect();
    let padding = std::iter::repeat(false).take(total - digits.len() * 4);
    let value = digits
        .iter()
        .flat_map(|digit| (0..4).rev().map(move |shift| (digit >> shift) & 1 == 1));
    padding.chain(value).take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_bits_truncates_low_bits() {
        assert_eq!(
            hex_to_bits("F8", 5),
            vec![true, true, true, true, true]
        );
        assert_eq!(
            hex_to_bits("A0", 3),
            vec![true, false, true]
        );
    }

    #[test]
    fn test_hex_to_bits_pads_short_rows() {
        assert_eq!(
            hex_to_bits("F", 6),
            vec![false, false, true, true, true, true]
        );
        assert_eq!(hex_to_bits("", 2), vec![false, false]);
    }

    #[test]
    fn test_hex_to_bits_invalid_digit() {
        assert_eq!(
            hex_to_bits("8Z", 8),
            vec![false, false, false, false, true, false, false, false]
        );
    }

    #[test]
    fn test_header_defaults() {
        let font = parse_bdf("STARTFONT 2.1\nFONT_ASCENT x\n");
        assert_eq!(font.name, "BDF");
        assert_eq!(font.ascent, 8);
        assert_eq!(font.descent, 0);
        assert_eq!(font.line_height, 8);
    }

    #[test]
    fn test_oversized_glyph_is_dropped() {
        let font = parse_bdf(
            "FONT_ASCENT 2147483647\nFONT_DESCENT 9\n\
             STARTCHAR a\nENCODING 65\nBBX 1 2000000000 0 0\nBITMAP\n80\nENDCHAR\n\
             STARTCHAR b\nENCODING 66\nBBX 2000000000 1 0 0\nBITMAP\nFF\nENDCHAR\n\
             STARTCHAR c\nENCODING 67\nBBX 2 1 0 0\nBITMAP\nC0\nENDCHAR\n",
        );
        assert_eq!(font.glyphs.keys().copied().collect::<Vec<u32>>(), vec![67]);
        assert_eq!(font.line_height, i32::MAX);
    }

    #[test]
    fn test_short_bitmap_stops_at_endchar() {
        let font = parse_bdf(
            "STARTCHAR a\nENCODING 65\nBBX 3 4 0 0\nBITMAP\nE0\nENDCHAR\n\
             STARTCHAR b\nENCODING 66\nBBX 1 1 0 0\nBITMAP\n80\nENDCHAR\n",
        );
        assert_eq!(font.glyphs.len(), 2);
        let a = font.glyph('A').unwrap();
        assert_eq!(a.rows, vec![vec![true, true, true]]);
        assert_eq!(a.height, 4);
    }

    #[test]
    fn test_zero_metrics_line_height() {
        let font = parse_bdf("FONT_ASCENT 0\nFONT_DESCENT 0\n");
        assert_eq!(font.line_height, 8);
    }
}
