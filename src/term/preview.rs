use ansi_term::{ANSIString, ANSIStrings, Colour, Style};
use u8g2::mach::Canvas;

const UPPER_HALF: &str = "\u{2580}";

/// Terminal rendering of a canvas, two pixel rows per text row.
///
/// Only every `step`-th pixel is sampled, so a frame rendered at scale `n`
/// can be shown at display resolution with `step = n`.
pub fn half_blocks(canvas: &Canvas, step: u32) -> String {
    let step = step.max(1) as i64;
    let columns = canvas.width() as i64 / step;
    let rows = canvas.height() as i64 / step;
    let mut out = String::new();
    for row in (0..rows).step_by(2) {
        let mut cells: Vec<ANSIString<'static>> = Vec::with_capacity(columns as usize);
        for col in 0..columns {
            let top = canvas.get(col * step, row * step).unwrap_or(0);
            let bottom = canvas.get(col * step, (row + 1) * step).unwrap_or(0);
            cells.push(Style::new().fg(gray(top)).on(gray(bottom)).paint(UPPER_HALF));
        }
        out.push_str(&ANSIStrings(&cells).to_string());
        out.push('\n');
    }
    out
}

/// Nearest step on the xterm 256-colour grayscale ramp.
fn gray(value: u8) -> Colour {
    match value {
        0..=3 => Colour::Fixed(16),
        252..=255 => Colour::Fixed(231),
        v => Colour::Fixed(232 + ((v as u16 - 4) * 23 / 247) as u8),
    }
}

