pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub const HIRES_WIDTH: usize = 128;
pub const HIRES_HEIGHT: usize = 64;

/// Monochrome frame buffer, row-major, one `bool` per pixel.
///
/// Low resolution is the classic 64x32 CHIP-8 screen; SUPER-CHIP programs can
/// switch to 128x64. Switching clears the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bit_buffer: Vec<bool>,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: vec![false; WIDTH * HEIGHT],
            width: WIDTH,
            height: HEIGHT,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_hires(&self) -> bool {
        self.width == HIRES_WIDTH
    }

    pub fn set_hires(&mut self, hires: bool) {
        let (width, height) = if hires {
            (HIRES_WIDTH, HIRES_HEIGHT)
        } else {
            (WIDTH, HEIGHT)
        };
        self.width = width;
        self.height = height;
        self.bit_buffer = vec![false; width * height];
    }

    pub fn clear_buffer(&mut self) {
        self.bit_buffer.fill(false);
    }

    /// Pixel at (x, y); out-of-range coordinates read as unlit.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bit_buffer[y * self.width + x]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.bit_buffer
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.bit_buffer.chunks(self.width)
    }

    /// XORs `rows` onto the screen with the top-left corner at (x, y).
    ///
    /// Each row is `row_width` bits wide (8, or 16 for SUPER-CHIP big
    /// sprites), most significant bit leftmost. The origin always wraps; the
    /// rest of the sprite either wraps or is clipped at the screen edge.
    /// Returns true if any lit pixel was switched off.
    pub fn paint(&mut self, x: u8, y: u8, rows: &[u16], row_width: usize, clip: bool) -> bool {
        let (x0, y0) = (x as usize % self.width, y as usize % self.height);
        let mut collision = false;
        for (i, row) in rows.iter().enumerate() {
            let ny = y0 + i;
            if clip && ny >= self.height {
                break;
            }
            let ny = ny % self.height;
            for j in 0..row_width {
                if (row >> (row_width - 1 - j)) & 1 == 0 {
                    continue;
                }
                let nx = x0 + j;
                if clip && nx >= self.width {
                    break;
                }
                let index = ny * self.width + nx % self.width;
                collision |= self.bit_buffer[index];
                self.bit_buffer[index] ^= true;
            }
        }
        collision
    }

    pub fn scroll_down(&mut self, n: usize) {
        let n = n.min(self.height);
        let shift = n * self.width;
        self.bit_buffer.rotate_right(shift);
        self.bit_buffer[..shift].fill(false);
    }

    pub fn scroll_right(&mut self, n: usize) {
        let n = n.min(self.width);
        for row in self.bit_buffer.chunks_mut(self.width) {
            row.rotate_right(n);
            row[..n].fill(false);
        }
    }

    pub fn scroll_left(&mut self, n: usize) {
        let n = n.min(self.width);
        for row in self.bit_buffer.chunks_mut(self.width) {
            row.rotate_left(n);
            let len = row.len();
            row[len - n..].fill(false);
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|&on| if on { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(fb: &FrameBuffer) -> usize {
        fb.pixels().iter().filter(|&&p| p).count()
    }

    #[test]
    fn paint_xors_and_reports_collision() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.paint(0, 0, &[0xFF], 8, false));
        assert_eq!(lit(&fb), 8);
        assert!(fb.paint(0, 0, &[0xFF], 8, false));
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn paint_without_overlap_has_no_collision() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0xF0], 8, false);
        assert!(!fb.paint(0, 0, &[0x0F], 8, false));
        assert_eq!(lit(&fb), 8);
    }

    #[test]
    fn paint_wraps_around_edges() {
        let mut fb = FrameBuffer::new();
        fb.paint(62, 31, &[0xC0 | 0x30, 0x80], 8, false);
        assert!(fb.get(62, 31));
        assert!(fb.get(63, 31));
        assert!(fb.get(0, 31));
        assert!(fb.get(1, 31));
        assert!(fb.get(62, 0));
    }

    #[test]
    fn paint_clips_at_edges() {
        let mut fb = FrameBuffer::new();
        fb.paint(62, 31, &[0xF0, 0x80], 8, true);
        assert!(fb.get(62, 31));
        assert!(fb.get(63, 31));
        assert!(!fb.get(0, 31));
        assert!(!fb.get(62, 0));
        assert_eq!(lit(&fb), 2);
    }

    #[test]
    fn origin_wraps_even_when_clipping() {
        let mut fb = FrameBuffer::new();
        fb.paint(64 + 3, 32 + 1, &[0x80], 8, true);
        assert!(fb.get(3, 1));
    }

    #[test]
    fn wide_sprites() {
        let mut fb = FrameBuffer::new();
        fb.set_hires(true);
        fb.paint(0, 0, &[0x8001], 16, false);
        assert!(fb.get(0, 0));
        assert!(fb.get(15, 0));
        assert_eq!(lit(&fb), 2);
    }

    #[test]
    fn resolution_switch_clears() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0xFF], 8, false);
        fb.set_hires(true);
        assert_eq!((fb.width(), fb.height()), (128, 64));
        assert_eq!(lit(&fb), 0);
        fb.set_hires(false);
        assert_eq!(fb.pixels().len(), WIDTH * HEIGHT);
    }

    #[test]
    fn scrolling() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0x80], 8, false);
        fb.scroll_down(2);
        assert!(fb.get(0, 2));
        fb.scroll_right(4);
        assert!(fb.get(4, 2));
        fb.scroll_left(4);
        assert!(fb.get(0, 2));
        fb.scroll_left(4);
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn renders_as_text() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0xA0], 8, false);
        let text = fb.to_string();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("#.#."));
        assert_eq!(first.len(), WIDTH);
        assert_eq!(text.lines().count(), HEIGHT);
    }
}
