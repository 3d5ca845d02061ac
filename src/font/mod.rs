/*!
# Fonts

BDF bitmap fonts, the built-in 5x7 fallback, and resolution of U8g2 font
identifiers to BDF files in a local cache or a remote font repository.

*/

mod bdf;
mod resolve;
pub mod system;

pub use bdf::{hex_to_bits, parse_bdf};
pub use resolve::{
    candidates_for, font_names, DirectorySource, FontCache, FontResolver, FontSource, HttpSource,
    Resolved, EXPLICIT,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Advance for characters a font has no glyph for.
pub const MISSING_ADVANCE: i32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    #[serde(rename = "code")]
    pub codepoint: u32,
    #[serde(rename = "w")]
    pub width: i32,
    #[serde(rename = "h")]
    pub height: i32,
    #[serde(rename = "xoff")]
    pub x_offset: i32,
    #[serde(rename = "yoff")]
    pub y_offset: i32,
    #[serde(rename = "dwidth")]
    pub device_width: i32,
    #[serde(with = "bits")]
    pub rows: Vec<Vec<bool>>,
}

impl Glyph {
    /// Pen advance after drawing this glyph.
    pub fn advance(&self) -> i32 {
        if self.device_width == 0 {
            self.width
        } else {
            self.device_width
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitmapFont {
    pub name: String,
    #[serde(default = "default_ascent")]
    pub ascent: i32,
    #[serde(default)]
    pub descent: i32,
    #[serde(default = "default_line_height")]
    pub line_height: i32,
    #[serde(default)]
    pub glyphs: BTreeMap<u32, Glyph>,
}

fn default_ascent() -> i32 {
    8
}

fn default_line_height() -> i32 {
    8
}

impl BitmapFont {
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&(ch as u32))
    }

    /// Baseline offset from the top of a text line. A font declaring no
    /// ascent is treated as 7 pixels tall.
    pub fn baseline(&self) -> i32 {
        if self.ascent == 0 {
            7
        } else {
            self.ascent
        }
    }

    /// Width of `text` in font units.
    pub fn measure(&self, text: &str) -> i32 {
        text.chars()
            .map(|ch| self.glyph(ch).map_or(MISSING_ADVANCE, Glyph::advance))
            .fold(0, i32::saturating_add)
    }
}

/// Glyph rows travel as arrays of 0 and 1.
mod bits {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rows: &[Vec<bool>], serializer: S) -> Result<S::Ok, S::Error> {
        rows.iter()
            .map(|row| row.iter().map(|&bit| bit as u8).collect())
            .collect::<Vec<Vec<u8>>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<bool>>, D::Error> {
        let rows = Vec::<Vec<u8>>::deserialize(deserializer)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(|bit| bit != 0).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_wire_shape() {
        let glyph = Glyph {
            codepoint: 65,
            width: 2,
            height: 1,
            x_offset: 0,
            y_offset: -1,
            device_width: 3,
            rows: vec![vec![true, false]],
        };
        assert_eq!(
            serde_json::to_string(&glyph).unwrap(),
            r#"{"code":65,"w":2,"h":1,"xoff":0,"yoff":-1,"dwidth":3,"rows":[[1,0]]}"#
        );
    }

    #[test]
    fn test_font_from_json() {
        let font: BitmapFont = serde_json::from_str(
            r#"{"name":"t","ascent":0,"descent":2,"lineHeight":10,"glyphs":{
                "66":{"code":66,"w":1,"h":1,"xoff":0,"yoff":0,"dwidth":0,"rows":[[1]]}}}"#,
        )
        .unwrap();
        assert_eq!(font.line_height, 10);
        assert_eq!(font.baseline(), 7);
        assert_eq!(font.glyph('B').map(Glyph::advance), Some(1));
        assert_eq!(font.measure("BZ"), 1 + MISSING_ADVANCE);
    }
}
