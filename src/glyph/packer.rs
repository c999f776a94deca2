// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Row-based bin packing for the shared glyph texture.  One cursor is
//! shared by every cached font size: rects are assigned left to right and
//! wrap to a fresh row when the texture width would be exceeded.

/// Top-left corner assigned to a glyph bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Debug)]
pub struct AtlasCursor {
    width: u32,
    height: u32,
    next_x: u32,
    next_y: u32,
    row_max_height: u32,
    unicode_row_start: u32,
}

impl AtlasCursor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_x: 0,
            next_y: 0,
            row_max_height: 0,
            unicode_row_start: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Back to the base state (a fresh or fully cleared texture).
    pub fn reset(&mut self) {
        self.next_x = 0;
        self.next_y = 0;
        self.row_max_height = 0;
        self.unicode_row_start = 0;
    }

    /// Assigns the next rect for a `w` x `h` bitmap, wrapping to a new row
    /// when the current one is out of horizontal space.  The vertical bound
    /// is not checked here; callers reject a placement whose
    /// `y + h` exceeds `height()` instead of corrupting the cursor.
    pub fn place(&mut self, w: u32, h: u32) -> Placement {
        if self.next_x + w > self.width {
            self.next_y += self.row_max_height;
            self.next_x = 0;
            self.row_max_height = 0;
        }
        let assigned = Placement {
            x: self.next_x,
            y: self.next_y,
        };
        self.next_x += w;
        self.row_max_height = self.row_max_height.max(h);
        assigned
    }

    pub fn fits_vertically(&self, y: u32, h: u32) -> bool {
        y + h <= self.height
    }

    /// Closes out the standard-glyph rows: dynamic glyphs start on the row
    /// just under everything placed so far.
    pub fn start_unicode_rows(&mut self) {
        self.unicode_row_start = self.next_y + self.row_max_height;
        self.next_y = self.unicode_row_start;
        self.next_x = 0;
        self.row_max_height = 0;
    }

    pub fn unicode_row_start(&self) -> u32 {
        self.unicode_row_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: (Placement, u32, u32), b: (Placement, u32, u32)) -> bool {
        let (pa, wa, ha) = a;
        let (pb, wb, hb) = b;
        pa.x < pb.x + wb && pb.x < pa.x + wa && pa.y < pb.y + hb && pb.y < pa.y + ha
    }

    #[test]
    fn placements_advance_left_to_right() {
        let mut cursor = AtlasCursor::new(100, 100);
        assert_eq!(cursor.place(30, 10), Placement { x: 0, y: 0 });
        assert_eq!(cursor.place(30, 12), Placement { x: 30, y: 0 });
        assert_eq!(cursor.place(30, 8), Placement { x: 60, y: 0 });
    }

    #[test]
    fn wraps_to_new_row_at_width_tracking_tallest_glyph() {
        let mut cursor = AtlasCursor::new(100, 100);
        cursor.place(60, 10);
        cursor.place(30, 25);
        // 60 + 30 + 20 > 100: wraps, and the new row starts below the
        // tallest glyph of the previous row.
        assert_eq!(cursor.place(20, 5), Placement { x: 0, y: 25 });
    }

    #[test]
    fn no_two_placements_overlap() {
        let mut cursor = AtlasCursor::new(64, 1000);
        let sizes = [
            (10u32, 12u32),
            (30, 7),
            (25, 20),
            (25, 3),
            (64, 1),
            (9, 9),
            (40, 18),
            (40, 2),
        ];
        let mut placed = Vec::new();
        for &(w, h) in &sizes {
            let p = cursor.place(w, h);
            assert!(p.x + w <= 64);
            placed.push((p, w, h));
        }
        for i in 0..placed.len() {
            for j in i + 1..placed.len() {
                assert!(
                    !overlaps(placed[i], placed[j]),
                    "{:?} overlaps {:?}",
                    placed[i],
                    placed[j]
                );
            }
        }
    }

    #[test]
    fn vertical_bound_is_reported_not_enforced() {
        let mut cursor = AtlasCursor::new(10, 20);
        cursor.place(10, 15);
        let p = cursor.place(10, 15);
        assert_eq!(p, Placement { x: 0, y: 15 });
        assert!(!cursor.fits_vertically(p.y, 15));
        assert!(cursor.fits_vertically(p.y, 5));
    }

    #[test]
    fn unicode_rows_start_under_standard_rows() {
        let mut cursor = AtlasCursor::new(100, 100);
        cursor.place(40, 10);
        cursor.place(40, 16);
        cursor.start_unicode_rows();
        assert_eq!(cursor.unicode_row_start(), 16);
        assert_eq!(cursor.place(12, 12), Placement { x: 0, y: 16 });
    }

    #[test]
    fn reset_returns_to_base_state() {
        let mut cursor = AtlasCursor::new(100, 100);
        cursor.place(40, 10);
        cursor.start_unicode_rows();
        cursor.reset();
        assert_eq!(cursor.unicode_row_start(), 0);
        assert_eq!(cursor.place(5, 5), Placement { x: 0, y: 0 });
    }

    #[test]
    fn zero_sized_bitmap_takes_no_space() {
        // Space characters rasterize to empty bitmaps.
        let mut cursor = AtlasCursor::new(100, 100);
        cursor.place(0, 0);
        assert_eq!(cursor.place(10, 10), Placement { x: 0, y: 0 });
    }
}
