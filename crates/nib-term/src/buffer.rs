// SPDX-License-Identifier: MIT
//
// FrameBuffer: the cell grid a frame is painted into.
//
// The application paints a whole frame here, then the diff renderer
// compares it with the previous one and writes only what changed.
//
// Storage is a flat row-major `Vec<Cell>`; a row is a contiguous slice,
// which is exactly what the renderer's row-skip check compares.
//
// One cell per `char`. Wide characters are not given a second column;
// text that needs grapheme-aware layout is out of scope for this editor.

use crate::cell::{Attr, Cell};

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A 2D grid of cells.
///
/// ```
/// use nib_term::buffer::FrameBuffer;
/// use nib_term::cell::Cell;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// buf.set(5, 3, Cell::new('X'));
/// assert_eq!(buf.get(5, 3).map(|c| c.ch), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// A buffer of blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// The cell at `(x, y)`, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    /// Row `y` as a slice, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            self.cells.get(start..start + usize::from(self.width))
        } else {
            None
        }
    }

    /// Row `y` as text, attributes dropped. Handy in tests.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|cells| cells.iter().map(|c| c.ch).collect())
            .unwrap_or_default()
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Change dimensions. All content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Overwrite this buffer with `other`, reusing the allocation when the
    /// sizes already match.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.clone_from(other);
        }
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Bounds-checked write of one cell. Returns `false` when `(x, y)` is
    /// outside the grid.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Paint `text` left to right from `(x, y)`, one cell per `char`.
    ///
    /// Stops at the right edge. Control characters (a literal tab among
    /// them) are drawn as a space so they never move the real cursor.
    /// Returns the number of columns painted.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, attrs: Attr) -> u16 {
        if y >= self.height {
            return 0;
        }

        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let ch = if ch.is_control() { ' ' } else { ch };
            self.set(col, y, Cell { ch, attrs });
            col += 1;
        }
        col - x
    }

    /// Set `attrs` on every cell of row `y`, keeping the characters.
    pub fn fill_row_attrs(&mut self, y: u16, attrs: Attr) {
        if y >= self.height {
            return;
        }
        let start = self.index(0, y);
        let end = start + usize::from(self.width);
        for cell in &mut self.cells[start..end] {
            cell.attrs = attrs;
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_is_blank() {
        let buf = FrameBuffer::new(4, 2);
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.row_text(0), "    ");
        assert_eq!(buf.row_text(1), "    ");
    }

    #[test]
    fn zero_size_has_no_rows() {
        let buf = FrameBuffer::new(0, 0);
        assert!(buf.row(0).is_none());
        assert!(buf.get(0, 0).is_none());
    }

    // ── Access ──────────────────────────────────────────────────────────

    #[test]
    fn set_and_get() {
        let mut buf = FrameBuffer::new(3, 3);
        assert!(buf.set(2, 1, Cell::new('z')));
        assert_eq!(buf.get(2, 1), Some(&Cell::new('z')));
    }

    #[test]
    fn set_out_of_bounds_is_rejected() {
        let mut buf = FrameBuffer::new(3, 3);
        assert!(!buf.set(3, 0, Cell::new('z')));
        assert!(!buf.set(0, 3, Cell::new('z')));
    }

    #[test]
    fn row_out_of_bounds() {
        let buf = FrameBuffer::new(3, 3);
        assert!(buf.row(3).is_none());
        assert_eq!(buf.row_text(3), "");
    }

    // ── put_str ─────────────────────────────────────────────────────────

    #[test]
    fn put_str_paints_from_offset() {
        let mut buf = FrameBuffer::new(6, 1);
        assert_eq!(buf.put_str(1, 0, "abc", Attr::empty()), 3);
        assert_eq!(buf.row_text(0), " abc  ");
    }

    #[test]
    fn put_str_clips_at_right_edge() {
        let mut buf = FrameBuffer::new(3, 1);
        assert_eq!(buf.put_str(0, 0, "abcdef", Attr::empty()), 3);
        assert_eq!(buf.row_text(0), "abc");
    }

    #[test]
    fn put_str_counts_chars_not_bytes() {
        let mut buf = FrameBuffer::new(4, 1);
        assert_eq!(buf.put_str(0, 0, "héé", Attr::empty()), 3);
        assert_eq!(buf.row_text(0), "héé ");
    }

    #[test]
    fn put_str_blanks_control_chars() {
        let mut buf = FrameBuffer::new(3, 1);
        buf.put_str(0, 0, "a\tb", Attr::empty());
        assert_eq!(buf.row_text(0), "a b");
    }

    #[test]
    fn put_str_below_grid_is_noop() {
        let mut buf = FrameBuffer::new(3, 1);
        assert_eq!(buf.put_str(0, 1, "abc", Attr::empty()), 0);
    }

    #[test]
    fn put_str_carries_attrs() {
        let mut buf = FrameBuffer::new(2, 1);
        buf.put_str(0, 0, "x", Attr::INVERSE);
        assert_eq!(buf.get(0, 0).map(|c| c.attrs), Some(Attr::INVERSE));
        assert_eq!(buf.get(1, 0).map(|c| c.attrs), Some(Attr::empty()));
    }

    #[test]
    fn fill_row_attrs_keeps_text() {
        let mut buf = FrameBuffer::new(3, 2);
        buf.put_str(0, 1, "ok", Attr::empty());
        buf.fill_row_attrs(1, Attr::INVERSE);
        assert_eq!(buf.row_text(1), "ok ");
        assert!(buf.row(1).unwrap().iter().all(|c| c.attrs == Attr::INVERSE));
        assert!(buf.row(0).unwrap().iter().all(|c| c.attrs.is_empty()));
    }

    // ── Clear / Resize / Copy ───────────────────────────────────────────

    #[test]
    fn clear_blanks_everything() {
        let mut buf = FrameBuffer::new(2, 2);
        buf.put_str(0, 0, "xy", Attr::BOLD);
        buf.clear();
        assert_eq!(buf, FrameBuffer::new(2, 2));
    }

    #[test]
    fn resize_discards_content() {
        let mut buf = FrameBuffer::new(2, 2);
        buf.put_str(0, 0, "xy", Attr::empty());
        buf.resize(5, 1);
        assert_eq!(buf.width(), 5);
        assert_eq!(buf.height(), 1);
        assert_eq!(buf.row_text(0), "     ");
    }

    #[test]
    fn copy_from_same_and_different_size() {
        let mut src = FrameBuffer::new(3, 1);
        src.put_str(0, 0, "abc", Attr::empty());

        let mut same = FrameBuffer::new(3, 1);
        same.copy_from(&src);
        assert_eq!(same, src);

        let mut other = FrameBuffer::new(10, 10);
        other.copy_from(&src);
        assert_eq!(other, src);
    }

    #[test]
    fn debug_shows_dimensions() {
        assert_eq!(format!("{:?}", FrameBuffer::new(80, 24)), "FrameBuffer(80x24)");
    }
}
