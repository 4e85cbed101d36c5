//! Cursor model: position in the buffer plus the first visible line.
//!
//! `CursorModel` does not own or borrow the buffer. Movement methods take the
//! [`LineBuffer`] as a parameter, the same way every editing operation does.
//!
//! # Clamping
//!
//! Moves stop at the document edges instead of wrapping. Moving to a shorter
//! line truncates the column; there is no remembered "desired column".
//!
//! The column is a byte offset that always lands on a `char` boundary, in
//! `0..=len`. Horizontal moves step one whole character.
//!
//! # Scrolling
//!
//! [`normalize`](CursorModel::normalize) is the one place the invariants are
//! restored. It runs after every key and before every frame, and moves the
//! scroll offset just far enough to keep the cursor line on screen.

use crate::buffer::{floor_boundary, next_boundary, prev_boundary, LineBuffer};

/// Cursor position and scroll offset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CursorModel {
    line: usize,
    column: usize,
    scroll: usize,
}

impl CursorModel {
    /// Cursor at the top-left of the document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            line: 0,
            column: 0,
            scroll: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Byte offset into the current line.
    #[inline]
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Index of the first line shown in the text area.
    #[inline]
    #[must_use]
    pub const fn scroll(&self) -> usize {
        self.scroll
    }

    // -- Positioning --------------------------------------------------------

    /// Put the cursor at `(line, column)` as given. Out-of-range values are
    /// fixed by the next [`normalize`](Self::normalize).
    pub const fn set_position(&mut self, line: usize, column: usize) {
        self.line = line;
        self.column = column;
    }

    // -- Movement -----------------------------------------------------------

    /// One character left, stopping at column 0.
    pub fn move_left(&mut self, buf: &LineBuffer) {
        let text = buf.line(self.line).unwrap_or_default();
        self.column = prev_boundary(text, self.column);
    }

    /// One character right, stopping at the end of the line.
    pub fn move_right(&mut self, buf: &LineBuffer) {
        let text = buf.line(self.line).unwrap_or_default();
        self.column = next_boundary(text, self.column);
    }

    /// One line up, stopping at the first line.
    pub fn move_up(&mut self, buf: &LineBuffer) {
        self.line = self.line.saturating_sub(1);
        self.clamp_column(buf);
    }

    /// One line down, stopping at the last line.
    pub fn move_down(&mut self, buf: &LineBuffer) {
        if self.line + 1 < buf.line_count() {
            self.line += 1;
        }
        self.clamp_column(buf);
    }

    // -- Normalization ------------------------------------------------------

    /// Clamp line and column into the buffer and scroll so the cursor line
    /// is within `height` rows starting at the scroll offset.
    ///
    /// A `height` of 0 is treated as 1.
    pub fn normalize(&mut self, buf: &LineBuffer, height: usize) {
        self.line = self.line.min(buf.line_count() - 1);
        self.clamp_column(buf);

        let height = height.max(1);
        if self.line >= self.scroll + height {
            self.scroll = self.line + 1 - height;
        } else if self.line < self.scroll {
            self.scroll = self.line;
        }
    }

    fn clamp_column(&mut self, buf: &LineBuffer) {
        let text = buf.line(self.line).unwrap_or_default();
        self.column = floor_boundary(text, self.column);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_buffer() -> LineBuffer {
        // "hello"   5
        // "hi"      2
        // ""        0
        // "goodbye" 7
        LineBuffer::from_lines(["hello", "hi", "", "goodbye"])
    }

    fn at(line: usize, column: usize) -> CursorModel {
        let mut c = CursorModel::new();
        c.set_position(line, column);
        c
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_at_origin() {
        let c = CursorModel::new();
        assert_eq!((c.line(), c.column(), c.scroll()), (0, 0, 0));
        assert_eq!(c, CursorModel::default());
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn move_right_stops_at_line_end() {
        let buf = sample_buffer();
        let mut c = at(1, 0);
        c.move_right(&buf);
        c.move_right(&buf);
        assert_eq!(c.column(), 2);
        c.move_right(&buf);
        assert_eq!(c.column(), 2);
    }

    #[test]
    fn move_left_stops_at_zero() {
        let buf = sample_buffer();
        let mut c = at(0, 1);
        c.move_left(&buf);
        c.move_left(&buf);
        assert_eq!(c.column(), 0);
    }

    #[test]
    fn horizontal_moves_step_whole_chars() {
        let buf = LineBuffer::from_lines(["a中b"]);
        let mut c = at(0, 1);
        c.move_right(&buf);
        assert_eq!(c.column(), 4);
        c.move_left(&buf);
        assert_eq!(c.column(), 1);
    }

    // -- Vertical -----------------------------------------------------------

    #[test]
    fn move_down_truncates_column() {
        let buf = sample_buffer();
        let mut c = at(0, 4);
        c.move_down(&buf);
        assert_eq!((c.line(), c.column()), (1, 2));
        c.move_down(&buf);
        assert_eq!((c.line(), c.column()), (2, 0));
        // No sticky column: the longer line does not restore column 4.
        c.move_down(&buf);
        assert_eq!((c.line(), c.column()), (3, 0));
    }

    #[test]
    fn vertical_moves_stop_at_edges() {
        let buf = sample_buffer();
        let mut c = at(0, 0);
        c.move_up(&buf);
        assert_eq!(c.line(), 0);
        c.set_position(3, 0);
        c.move_down(&buf);
        assert_eq!(c.line(), 3);
    }

    #[test]
    fn vertical_move_floors_to_char_boundary() {
        let buf = LineBuffer::from_lines(["abcd", "中文"]);
        let mut c = at(0, 4);
        c.move_down(&buf);
        // 4 is inside 文 (3..6), so back to 3.
        assert_eq!(c.column(), 3);
    }

    // -- Normalization ------------------------------------------------------

    #[test]
    fn normalize_clamps_line_and_column() {
        let buf = sample_buffer();
        let mut c = at(99, 99);
        c.normalize(&buf, 10);
        assert_eq!((c.line(), c.column()), (3, 7));
    }

    #[test]
    fn normalize_scrolls_minimally() {
        let buf = LineBuffer::from_lines((0..100).map(|i| i.to_string()));
        let mut c = at(50, 0);
        c.normalize(&buf, 10);
        assert_eq!(c.scroll(), 41);

        // Anywhere in the visible window leaves scroll alone.
        c.set_position(45, 0);
        c.normalize(&buf, 10);
        assert_eq!(c.scroll(), 41);

        c.set_position(5, 0);
        c.normalize(&buf, 10);
        assert_eq!(c.scroll(), 5);
    }

    #[test]
    fn normalize_zero_height_tracks_cursor_line() {
        let buf = LineBuffer::from_lines(["a", "b", "c"]);
        let mut c = at(2, 0);
        c.normalize(&buf, 0);
        assert_eq!(c.scroll(), 2);
    }

    #[test]
    fn normalize_after_shrink() {
        let mut buf = LineBuffer::from_lines(["one", "two", "three"]);
        let mut c = at(2, 5);
        buf.remove_line(2);
        c.normalize(&buf, 10);
        assert_eq!((c.line(), c.column()), (1, 3));
    }
}
