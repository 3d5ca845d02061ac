use super::{blend, Canvas, Operation, MAX_SIDE};
use crate::font::{system, BitmapFont, EXPLICIT};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

const BLACK: u8 = 0;
const WHITE: u8 = 255;
const GRID_AMOUNT: f64 = 0.15;

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default)]
    pub invert: bool,
    #[serde(default)]
    pub grid: bool,
    #[serde(default)]
    pub ops: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<BTreeMap<String, BitmapFont>>,
    /// Single font from older hosts, used only when `fonts` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<BitmapFont>,
    #[serde(default = "default_text_use_draw_color")]
    pub text_use_draw_color: bool,
}

fn default_scale() -> u32 {
    2
}

fn default_text_use_draw_color() -> bool {
    true
}

impl RenderRequest {
    pub fn new(width: u32, height: u32) -> RenderRequest {
        RenderRequest {
            width,
            height,
            scale: default_scale(),
            invert: false,
            grid: false,
            ops: vec![],
            fonts: None,
            font: None,
            text_use_draw_color: true,
        }
    }

    /// Fonts available to `setFont`, keyed by name.
    pub fn font_map(&self) -> Cow<'_, BTreeMap<String, BitmapFont>> {
        match (&self.fonts, &self.font) {
            (Some(fonts), _) => Cow::Borrowed(fonts),
            (None, Some(font)) => {
                let mut fonts = BTreeMap::new();
                fonts.insert(EXPLICIT.to_string(), font.clone());
                Cow::Owned(fonts)
            }
            (None, None) => Cow::Owned(BTreeMap::new()),
        }
    }
}

/// What the native executor prints: the canvas size it ran with and the
/// drawing calls it recorded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutorOutput {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub ops: Vec<Operation>,
}

/// Mutable drawing state carried between operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub foreground: bool,
    pub cursor_x: i32,
    pub cursor_y: i32,
    /// Key of the active bitmap font. `None` draws with the built-in font.
    pub font: Option<String>,
    pub font_name: Option<String>,
    pub fallback_px: i32,
}

impl DisplayState {
    fn new(fonts: &BTreeMap<String, BitmapFont>) -> DisplayState {
        let first = if fonts.contains_key(EXPLICIT) {
            Some(EXPLICIT.to_string())
        } else {
            fonts.keys().next().cloned()
        };
        DisplayState {
            foreground: true,
            cursor_x: 0,
            cursor_y: 8,
            font: first.clone(),
            font_name: first,
            fallback_px: system::DEFAULT_PX,
        }
    }
}

/// A finished render.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub canvas: Canvas,
    pub state: DisplayState,
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub ops: usize,
}

impl Frame {
    /// `128x64 @x2 ops:5 font:u8g2_font_6x10_tf(10px) crc:1A2B3C4D`. The
    /// pixel size only appears while drawing with the built-in font.
    pub fn summary(&self) -> String {
        let mut s = format!("{}x{} @x{} ops:{}", self.width, self.height, self.scale, self.ops);
        if let Some(name) = &self.state.font_name {
            s.push_str(&format!(" font:{}", name));
            if self.state.font.is_none() {
                s.push_str(&format!("({}px)", self.state.fallback_px));
            }
        }
        s.push_str(&format!(" crc:{:08X}", self.canvas.checksum()));
        s
    }
}

pub fn render(request: &RenderRequest) -> Frame {
    let fonts = request.font_map();
    let mut rasterizer = Rasterizer::new(request, &fonts);
    for op in &request.ops {
        rasterizer.execute(op);
    }
    rasterizer.finish()
}

/// Executes operations against a display state and a canvas of
/// `width * scale` by `height * scale` pixels.
pub struct Rasterizer<'a> {
    fonts: &'a BTreeMap<String, BitmapFont>,
    canvas: Canvas,
    state: DisplayState,
    width: u32,
    height: u32,
    scale: i64,
    fg: u8,
    bg: u8,
    text_use_draw_color: bool,
    ops: usize,
}

impl<'a> Rasterizer<'a> {
    pub fn new(request: &RenderRequest, fonts: &'a BTreeMap<String, BitmapFont>) -> Rasterizer<'a> {
        let scale = request.scale.max(1);
        let (fg, bg) = if request.invert {
            (WHITE, BLACK)
        } else {
            (BLACK, WHITE)
        };
        let side = |units: u32| units.checked_mul(scale).unwrap_or(MAX_SIDE);
        let mut canvas = Canvas::new(side(request.width), side(request.height), bg);
        if request.grid && scale >= 2 {
            let value = blend(bg, fg, GRID_AMOUNT);
            let (w, h) = (canvas.width() as i64, canvas.height() as i64);
            for x in (0..w).step_by(scale as usize) {
                canvas.fill_rect(x, 0, 1, h, value);
            }
            for y in (0..h).step_by(scale as usize) {
                canvas.fill_rect(0, y, w, 1, value);
            }
        }
        Rasterizer {
            fonts,
            canvas,
            state: DisplayState::new(fonts),
            width: request.width,
            height: request.height,
            scale: scale as i64,
            fg,
            bg,
            text_use_draw_color: request.text_use_draw_color,
            ops: 0,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    fn color(&self) -> u8 {
        if self.state.foreground {
            self.fg
        } else {
            self.bg
        }
    }

    fn text_color(&self) -> u8 {
        if self.text_use_draw_color {
            self.color()
        } else {
            self.fg
        }
    }

    fn active_font(&self) -> Option<&'a BitmapFont> {
        let fonts = self.fonts;
        self.state.font.as_ref().and_then(|key| fonts.get(key))
    }

    /// Display units to device pixels.
    fn px(&self, units: i32) -> i64 {
        (units as i64).saturating_mul(self.scale)
    }

    fn fill(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let color = self.color();
        let (x, y, w, h) = (self.px(x), self.px(y), self.px(w), self.px(h));
        self.canvas.fill_rect(x, y, w, h, color);
    }

    pub fn execute(&mut self, op: &Operation) {
        self.ops += 1;
        let color = self.color();
        match op {
            Operation::SetDrawColor { c } => self.state.foreground = *c != 0,
            Operation::DrawPixel { x, y } => self.fill(*x, *y, 1, 1),
            Operation::DrawLine { x0, y0, x1, y1 } | Operation::GfxLine { x0, y0, x1, y1 } => {
                let (x0, y0, x1, y1) = (self.px(*x0), self.px(*y0), self.px(*x1), self.px(*y1));
                self.canvas.line(x0, y0, x1, y1, color)
            }
            Operation::DrawBox { x, y, w, h } | Operation::GfxFillRect { x, y, w, h } => {
                self.fill(*x, *y, *w, *h)
            }
            Operation::DrawFrame { x, y, w, h } | Operation::GfxRect { x, y, w, h } => {
                let (x, y, w, h) = (self.px(*x), self.px(*y), self.px(*w), self.px(*h));
                self.canvas.stroke_rect(x, y, w, h, color)
            }
            Operation::DrawCircle { x, y, r } => {
                let (x, y, r) = (self.px(*x), self.px(*y), self.px(*r));
                self.canvas.circle(x, y, r, color)
            }
            Operation::DrawDisc { x, y, r } => {
                let (x, y, r) = (self.px(*x), self.px(*y), self.px(*r));
                self.canvas.disc(x, y, r, color)
            }
            Operation::DrawStr { x, y, text } => {
                self.draw_text(*x, *y, text);
            }
            Operation::SetFont { name } => self.set_font(name),
            Operation::SetCursor { x, y } => {
                self.state.cursor_x = *x;
                self.state.cursor_y = *y;
            }
            Operation::Print { text } => {
                let advance = self
                    .draw_text(self.state.cursor_x, self.state.cursor_y, text)
                    .unwrap_or_else(|| {
                        clamp_i32(text.chars().count() as i64 * system::CELL_WIDTH as i64)
                    });
                self.state.cursor_x = self.state.cursor_x.saturating_add(advance);
            }
            Operation::Println { text } => {
                self.draw_text(self.state.cursor_x, self.state.cursor_y, text);
                let line_height = match self.active_font() {
                    Some(font) if font.line_height != 0 => font.line_height,
                    _ => 8,
                };
                self.state.cursor_x = 0;
                self.state.cursor_y = self.state.cursor_y.saturating_add(line_height);
            }
            Operation::GfxVLine { x, y, h } => self.fill(*x, *y, 1, *h),
            Operation::GfxHLine { x, y, w } => self.fill(*x, *y, *w, 1),
        }
    }

    fn set_font(&mut self, name: &str) {
        let key = if self.fonts.contains_key(name) {
            Some(name)
        } else if self.fonts.contains_key(EXPLICIT) {
            Some(EXPLICIT)
        } else {
            None
        };
        self.state.font = key.map(String::from);
        self.state.font_name = Some(name.to_string());
        if key.is_none() {
            self.state.fallback_px = system::guess_px(name);
        }
    }

    /// Draws `text` with its top-left (built-in font) or baseline (bitmap
    /// font) at `(x, y)`. Returns the advance in display units, or `None`
    /// when it cannot be measured.
    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Option<i32> {
        match self.active_font() {
            Some(font) => Some(self.draw_bitmap_text(font, x, y, text)),
            None => self.draw_system_text(x, y, text),
        }
    }

    fn draw_bitmap_text(&mut self, font: &BitmapFont, x: i32, y: i32, text: &str) -> i32 {
        let (s, color) = (self.scale, self.text_color());
        let mut pen = x as i64;
        for ch in text.chars() {
            let glyph = match font.glyph(ch) {
                Some(glyph) => glyph,
                None => {
                    pen += crate::font::MISSING_ADVANCE as i64;
                    continue;
                }
            };
            let gx = (pen + glyph.x_offset as i64).saturating_mul(s);
            let top = y as i64 - font.baseline() as i64 - glyph.y_offset as i64;
            let gy = top.saturating_mul(s);
            for (row, bits) in glyph.rows.iter().enumerate() {
                let py = gy.saturating_add((row as i64).saturating_mul(s));
                for (col, &bit) in bits.iter().enumerate() {
                    if bit {
                        let px = gx.saturating_add((col as i64).saturating_mul(s));
                        self.canvas.fill_rect(px, py, s, s, color);
                    }
                }
            }
            pen += glyph.advance() as i64;
        }
        clamp_i32(pen - x as i64)
    }

    fn draw_system_text(&mut self, x: i32, y: i32, text: &str) -> Option<i32> {
        let (s, color) = (self.scale, self.text_color());
        let size = self.state.fallback_px;
        let k = system::dot_size(size, s);
        let (left, top) = (self.px(x), self.px(y));
        let dot = |n: i64| n.saturating_mul(k);
        for (index, ch) in text.chars().enumerate() {
            let columns = match system::glyph(ch) {
                Some(columns) => columns,
                None => continue,
            };
            let cell = left.saturating_add(dot(index as i64 * system::CELL_WIDTH as i64));
            for (col, bits) in columns.iter().enumerate() {
                for row in 0..system::CELL_HEIGHT {
                    if (bits >> row) & 1 == 1 {
                        let px = cell.saturating_add(dot(col as i64));
                        let py = top.saturating_add(dot(row as i64));
                        self.canvas.fill_rect(px, py, k, k, color);
                    }
                }
            }
        }
        system::measure(text, size, s)
    }

    pub fn finish(self) -> Frame {
        Frame {
            canvas: self.canvas,
            state: self.state,
            width: self.width,
            height: self.height,
            scale: self.scale as u32,
            ops: self.ops,
        }
    }
}

fn clamp_i32(n: i64) -> i32 {
    n.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ops: Vec<Operation>) -> RenderRequest {
        let mut request = RenderRequest::new(16, 16);
        request.scale = 1;
        request.ops = ops;
        request
    }

    #[test]
    fn test_draw_color_and_pixels() {
        let frame = render(&request(vec![
            Operation::DrawBox { x: 0, y: 0, w: 4, h: 4 },
            Operation::SetDrawColor { c: 0 },
            Operation::DrawPixel { x: 1, y: 1 },
        ]));
        assert_eq!(frame.canvas.get(0, 0), Some(BLACK));
        assert_eq!(frame.canvas.get(1, 1), Some(WHITE));
        assert!(!frame.state.foreground);
    }

    #[test]
    fn test_invert_and_grid() {
        let mut req = request(vec![]);
        req.scale = 2;
        req.invert = true;
        req.grid = true;
        let frame = render(&req);
        assert_eq!(frame.canvas.get(0, 0), Some(38));
        assert_eq!(frame.canvas.get(1, 1), Some(BLACK));
        assert_eq!(frame.canvas.width(), 32);
    }

    #[test]
    fn test_shapes_cover_grid() {
        let mut req = request(vec![
            Operation::DrawBox { x: 0, y: 0, w: 2, h: 2 },
            Operation::SetDrawColor { c: 0 },
            Operation::DrawPixel { x: 3, y: 3 },
        ]);
        req.scale = 2;
        req.grid = true;
        let frame = render(&req);
        assert_eq!(frame.canvas.get(0, 0), Some(BLACK));
        assert_eq!(frame.canvas.get(2, 1), Some(BLACK));
        assert_eq!(frame.canvas.get(4, 0), Some(217));
        assert_eq!(frame.canvas.get(5, 1), Some(WHITE));
        assert_eq!(frame.canvas.get(6, 6), Some(WHITE));
        assert_eq!(frame.canvas.get(6, 8), Some(217));
    }

    #[test]
    fn test_oversized_canvas_is_capped() {
        let mut req = RenderRequest::new(u32::MAX, 3);
        req.scale = 2;
        let frame = render(&req);
        assert_eq!((frame.canvas.width(), frame.canvas.height()), (MAX_SIDE, 6));
    }

    #[test]
    fn test_grid_needs_scale() {
        let mut req = request(vec![]);
        req.grid = true;
        assert_eq!(render(&req).canvas.get(0, 0), Some(WHITE));
    }

    #[test]
    fn test_print_without_font() {
        let frame = render(&request(vec![
            Operation::SetCursor { x: 2, y: 0 },
            Operation::Print { text: "ab".into() },
            Operation::Print { text: "é".into() },
        ]));
        assert_eq!(frame.state.cursor_x, 2 + 12 + 6);
        assert_eq!(frame.state.font_name, None);
    }

    #[test]
    fn test_text_ignores_draw_color() {
        let mut req = request(vec![
            Operation::SetDrawColor { c: 0 },
            Operation::DrawStr { x: 0, y: 0, text: "|".into() },
        ]);
        req.text_use_draw_color = false;
        let frame = render(&req);
        assert!(frame.canvas.pixels().contains(&BLACK));
    }

    #[test]
    fn test_summary() {
        let frame = render(&request(vec![Operation::SetFont {
            name: "u8g2_font_5x8_tr".into(),
        }]));
        let summary = frame.summary();
        assert!(summary.starts_with("16x16 @x1 ops:1 font:u8g2_font_5x8_tr(8px) crc:"));
    }
}
