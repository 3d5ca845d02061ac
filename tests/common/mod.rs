#![allow(dead_code)]

use chrono::NaiveDate;
use u8g2::font::{parse_bdf, BitmapFont};
use u8g2::lang::{compile, CompileResult, Dimensions, FixedClock};
use u8g2::mach::Operation;

/// One glyph, `A` (65): 5x6 box, advance 6, baseline at the bottom row.
pub const FONT_A: &str = "\
STARTFONT 2.1
FONT -Test-Tiny-Medium-R-Normal--6-60-75-75-C-60-ISO10646-1
SIZE 6 75 75
FONTBOUNDINGBOX 5 6 0 0
FONT_ASCENT 6
FONT_DESCENT 2
CHARS 1
STARTCHAR A
ENCODING 65
SWIDTH 500 0
DWIDTH 6 0
BBX 5 6 0 0
BITMAP
20
50
88
F8
88
88
ENDCHAR
ENDFONT
";

pub fn clock() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap(),
    )
}

pub fn compile_str(source: &str) -> CompileResult {
    compile(source, &Dimensions::default(), &clock())
}

pub fn ops(source: &str) -> Vec<Operation> {
    compile_str(source).operations
}

pub fn errors(source: &str) -> Vec<String> {
    compile_str(source)
        .diagnostics
        .iter()
        .map(|e| e.to_string())
        .collect()
}

pub fn font_a() -> BitmapFont {
    parse_bdf(FONT_A)
}

/// `FONT_A` with a 13 pixel line.
pub fn font_tall() -> BitmapFont {
    parse_bdf(
        &FONT_A
            .replace("FONT_ASCENT 6", "FONT_ASCENT 10")
            .replace("FONT_DESCENT 2", "FONT_DESCENT 3"),
    )
}
