/// Largest canvas side in device pixels.
pub const MAX_SIDE: u32 = 8192;

/// Grayscale pixel buffer in device pixels, row-major, one byte per pixel.
///
/// Every drawing primitive clips to the buffer, so callers may pass any
/// coordinates. Work is bounded by the buffer size, not by the extent of
/// the shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Sides larger than `MAX_SIDE` are cut down to it.
    pub fn new(width: u32, height: u32, value: u8) -> Canvas {
        let (width, height) = (width.min(MAX_SIDE), height.min(MAX_SIDE));
        Canvas {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: i64, y: i64) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }

    pub fn set(&mut self, x: i64, y: i64, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = value;
        }
    }

    /// Solid rectangle. Negative extents grow left and up from `(x, y)`.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, value: u8) {
        let (x, w) = normalize(x, w);
        let (y, h) = normalize(y, h);
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i64);
        let y1 = y.saturating_add(h).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in y0..y1 {
            let start = row as usize * self.width as usize;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(value);
        }
    }

    /// One pixel outline through the corners `(x, y)` and `(x + w, y + h)`,
    /// both inclusive.
    pub fn stroke_rect(&mut self, x: i64, y: i64, w: i64, h: i64, value: u8) {
        let (x, w) = normalize(x, w);
        let (y, h) = normalize(y, h);
        let (right, bottom) = (x.saturating_add(w), y.saturating_add(h));
        let (across, down) = (w.saturating_add(1), h.saturating_add(1));
        self.fill_rect(x, y, across, 1, value);
        self.fill_rect(x, bottom, across, 1, value);
        self.fill_rect(x, y, 1, down, value);
        self.fill_rect(right, y, 1, down, value);
    }

    /// Bresenham line, both endpoints inclusive. A line leaving the buffer
    /// is first cut to the part that crosses it.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, value: u8) {
        let (x0, y0, x1, y1) = match self.clip_line(x0, y0, x1, y1) {
            Some(segment) => segment,
            None => return,
        };
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        loop {
            self.set(x, y, value);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Liang-Barsky clip against the pixel grid.
    fn clip_line(&self, x0: i64, y0: i64, x1: i64, y1: i64) -> Option<(i64, i64, i64, i64)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let (xmax, ymax) = (self.width as i64 - 1, self.height as i64 - 1);
        let inside = |x: i64, y: i64| (0..=xmax).contains(&x) && (0..=ymax).contains(&y);
        if inside(x0, y0) && inside(x1, y1) {
            return Some((x0, y0, x1, y1));
        }
        let (fx, fy) = (x0 as f64, y0 as f64);
        let (dx, dy) = (x1 as f64 - fx, y1 as f64 - fy);
        let (mut t0, mut t1) = (0f64, 1f64);
        for &(p, q) in &[
            (-dx, fx),
            (dx, xmax as f64 - fx),
            (-dy, fy),
            (dy, ymax as f64 - fy),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return None;
            }
        }
        let at = |t: f64| {
            (
                ((fx + t * dx).round() as i64).clamp(0, xmax),
                ((fy + t * dy).round() as i64).clamp(0, ymax),
            )
        };
        let ((ax, ay), (bx, by)) = (at(t0), at(t1));
        Some((ax, ay, bx, by))
    }

    /// Midpoint circle outline.
    ///
    /// Only the steps of the octant walk that can land inside the buffer are
    /// visited; each one solves for the `x` the walk would have reached.
    pub fn circle(&mut self, cx: i64, cy: i64, r: i64, value: u8) {
        if r <= 0 {
            self.set(cx, cy, value);
            return;
        }
        let rows = (0..self.height as i64).map(|row| row.saturating_sub(cy).saturating_abs());
        let columns = (0..self.width as i64).map(|col| col.saturating_sub(cx).saturating_abs());
        let mut steps: Vec<i64> = rows.chain(columns).filter(|&y| y <= r).collect();
        steps.sort_unstable();
        steps.dedup();
        for y in steps {
            let x = midpoint_x(r, y);
            if x < y {
                break;
            }
            for &(px, py) in &[
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                self.set(cx.saturating_add(px), cy.saturating_add(py), value);
            }
        }
    }

    /// Fills every pixel whose centre lies within `r` of `(cx, cy)`.
    pub fn disc(&mut self, cx: i64, cy: i64, r: i64, value: u8) {
        let r = r.saturating_abs();
        let limit = (r as f64) * (r as f64);
        let (w, h) = (self.width as i64, self.height as i64);
        let top = cy.saturating_sub(r).saturating_sub(1).max(0);
        let bottom = cy.saturating_add(r).min(h - 1);
        let left = cx.saturating_sub(r).saturating_sub(1).max(0);
        let right = cx.saturating_add(r).min(w - 1);
        for py in top..=bottom {
            for px in left..=right {
                let dx = px as f64 + 0.5 - cx as f64;
                let dy = py as f64 + 0.5 - cy as f64;
                if dx * dx + dy * dy <= limit {
                    self.set(px, py, value);
                }
            }
        }
    }

    /// Nearest-neighbour enlargement by a whole factor, held to `MAX_SIDE`.
    pub fn zoomed(&self, factor: u32) -> Canvas {
        let longest = self.width.max(self.height).max(1);
        let factor = factor.clamp(1, (MAX_SIDE / longest).max(1));
        let mut zoomed = Canvas::new(self.width * factor, self.height * factor, 0);
        for (i, value) in zoomed.pixels.iter_mut().enumerate() {
            let x = (i % zoomed.width as usize) / factor as usize;
            let y = (i / zoomed.width as usize) / factor as usize;
            *value = self.pixels[y * self.width as usize + x];
        }
        zoomed
    }

    /// CRC-32 (IEEE) of the pixel bytes.
    pub fn checksum(&self) -> u32 {
        crc::crc32::checksum_ieee(&self.pixels)
    }

    /// Binary PGM (`P5`) image.
    pub fn to_pgm(&self) -> Vec<u8> {
        let mut out = format!("P5\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.extend_from_slice(&self.pixels);
        out
    }
}

fn normalize(start: i64, extent: i64) -> (i64, i64) {
    if extent < 0 {
        (start.saturating_add(extent), extent.saturating_neg())
    } else {
        (start, extent)
    }
}

/// The `x` a midpoint walk of radius `r` holds at step `y`: the largest `x`
/// with `x * x - x + y * y < r * r`.
fn midpoint_x(r: i64, y: i64) -> i64 {
    let d = (r as i128) * (r as i128) - (y as i128) * (y as i128);
    let mut x = ((1.0 + (1.0 + 4.0 * d as f64).sqrt()) / 2.0) as i128;
    while x > 0 && x * x - x >= d {
        x -= 1;
    }
    while (x + 1) * (x + 1) - (x + 1) < d {
        x += 1;
    }
    x as i64
}

/// Mixes `amount` of `to` into `from`.
pub fn blend(from: u8, to: u8, amount: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * amount).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(canvas: &Canvas, value: u8) -> usize {
        canvas.pixels().iter().filter(|&&p| p == value).count()
    }

    #[test]
    fn test_fill_rect_clips_and_normalizes() {
        let mut canvas = Canvas::new(4, 4, 255);
        canvas.fill_rect(3, 3, -2, -2, 0);
        assert_eq!(count(&canvas, 0), 4);
        assert_eq!(canvas.get(1, 1), Some(0));
        canvas.fill_rect(-10, 3, 100, 5, 0);
        assert_eq!(count(&canvas, 0), 8);
    }

    #[test]
    fn test_stroke_rect() {
        let mut canvas = Canvas::new(8, 8, 255);
        canvas.stroke_rect(1, 1, 3, 2, 0);
        assert_eq!(count(&canvas, 0), 10);
        assert_eq!(canvas.get(4, 3), Some(0));
        assert_eq!(canvas.get(2, 2), Some(255));
    }

    #[test]
    fn test_line_endpoints() {
        let mut canvas = Canvas::new(8, 8, 255);
        canvas.line(0, 0, 7, 3, 0);
        assert_eq!(canvas.get(0, 0), Some(0));
        assert_eq!(canvas.get(7, 3), Some(0));
        assert_eq!(count(&canvas, 0), 8);
    }

    #[test]
    fn test_circle_and_disc() {
        let mut ring = Canvas::new(16, 16, 255);
        ring.circle(8, 8, 4, 0);
        assert_eq!(ring.get(12, 8), Some(0));
        assert_eq!(ring.get(8, 8), Some(255));
        let mut disc = Canvas::new(16, 16, 255);
        disc.disc(8, 8, 4, 0);
        assert_eq!(disc.get(8, 8), Some(0));
        assert_eq!(disc.get(8, 13), Some(255));
    }

    fn walked_circle(canvas: &mut Canvas, cx: i64, cy: i64, r: i64) {
        let (mut x, mut y) = (r, 0);
        let mut err = 1 - r;
        while x >= y {
            for &(px, py) in &[(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                canvas.set(cx + px, cy + py, 0);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    #[test]
    fn test_circle_matches_walk() {
        for &(cx, cy) in &[(8, 8), (0, 3), (-5, 20), (30, -2)] {
            for r in 1..24 {
                let mut walked = Canvas::new(24, 16, 255);
                walked_circle(&mut walked, cx, cy, r);
                let mut circle = Canvas::new(24, 16, 255);
                circle.circle(cx, cy, r, 0);
                assert_eq!(circle, walked, "centre ({}, {}) radius {}", cx, cy, r);
            }
        }
    }

    #[test]
    fn test_huge_shapes_are_clipped() {
        let mut canvas = Canvas::new(256, 128, 255);
        canvas.disc(128, 64, i64::MAX, 0);
        assert_eq!(count(&canvas, 0), 256 * 128);
        let mut canvas = Canvas::new(256, 128, 255);
        canvas.circle(128, 64, 4_000_000_000, 0);
        assert_eq!(count(&canvas, 0), 0);
        canvas.circle(-4_000_000_000, 64, 4_000_000_000, 0);
        assert_eq!(canvas.get(0, 64), Some(0));
        let mut canvas = Canvas::new(8, 8, 255);
        canvas.line(0, 0, 4_000_000_000, 0, 0);
        assert_eq!(count(&canvas, 0), 8);
        canvas.line(-10, -10, -10, 100, 0);
        assert_eq!(count(&canvas, 0), 8);
        canvas.fill_rect(i64::MIN, i64::MIN, i64::MIN, i64::MAX, 0);
        canvas.stroke_rect(i64::MAX, 0, i64::MAX, i64::MAX, 0);
        assert_eq!(count(&canvas, 0), 8);
    }

    #[test]
    fn test_clipped_line_keeps_inside_part() {
        let mut canvas = Canvas::new(8, 8, 255);
        canvas.line(-4, -4, 11, 11, 0);
        assert_eq!(count(&canvas, 0), 8);
        assert_eq!(canvas.get(0, 0), Some(0));
        assert_eq!(canvas.get(7, 7), Some(0));
    }

    #[test]
    fn test_size_is_capped() {
        let canvas = Canvas::new(MAX_SIDE * 4, 2, 255);
        assert_eq!((canvas.width(), canvas.height()), (MAX_SIDE, 2));
        assert_eq!(canvas.zoomed(u32::MAX).width(), MAX_SIDE);
    }

    #[test]
    fn test_zoom_and_pgm() {
        let mut canvas = Canvas::new(2, 1, 255);
        canvas.set(1, 0, 0);
        let zoomed = canvas.zoomed(2);
        assert_eq!(zoomed.pixels(), &[255, 255, 0, 0, 255, 255, 0, 0]);
        assert_eq!(canvas.to_pgm(), b"P5\n2 1\n255\n\xff\x00".to_vec());
    }

    #[test]
    fn test_blend() {
        assert_eq!(blend(255, 0, 0.15), 217);
        assert_eq!(blend(0, 255, 0.15), 38);
    }
}
