//! Viewport rendering: buffer, cursor and mode onto a terminal frame.
//!
//! The frame's last row is the status row. Every row above it is text:
//!
//! ```text
//! ┌────────────────────────────┐
//! │ line scroll + 0            │
//! │ line scroll + 1            │ ← text_height = rows - 1
//! │ (blank past end of buffer) │
//! ├────────────────────────────┤
//! │ -- NORMAL --   or   :cmd   │ ← status row
//! └────────────────────────────┘
//! ```
//!
//! One character is one terminal column. Text past the right edge is not
//! drawn; there is no wrapping and no horizontal scroll. Control characters
//! such as tab show as a single blank.
//!
//! Rendering reads state only. The cursor must already be normalized
//! against [`text_height`] so its line falls inside the window.

use nib_term::buffer::FrameBuffer;
use nib_term::cell::Attr;

use crate::buffer::{floor_boundary, LineBuffer};
use crate::cursor::CursorModel;
use crate::mode::Mode;

/// Rows available for text in a terminal `rows` tall.
#[inline]
#[must_use]
pub fn text_height(rows: u16) -> usize {
    usize::from(rows.saturating_sub(1))
}

/// Screen column of byte offset `column` in `line`: the number of
/// characters before it.
#[must_use]
pub fn display_col(line: &str, column: usize) -> usize {
    line[..floor_boundary(line, column)].chars().count()
}

/// Paint the editor into `frame` and return where the cursor goes.
///
/// `frame` is expected to be blank. Returns `None` when the frame has no
/// area.
pub fn render(
    buf: &LineBuffer,
    cursor: &CursorModel,
    mode: &Mode,
    frame: &mut FrameBuffer,
) -> Option<(u16, u16)> {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return None;
    }

    let status_y = height - 1;

    // -- Text rows ----------------------------------------------------------

    for (y, index) in (0..status_y).zip(cursor.scroll()..) {
        match buf.line(index) {
            Some(text) => {
                frame.put_str(0, y, text, Attr::empty());
            }
            None => break,
        }
    }

    // -- Status row ---------------------------------------------------------

    let max_x = usize::from(width - 1);
    let (x, y) = if let Mode::Command(line) = mode {
        frame.put_str(0, status_y, ":", Attr::empty());
        frame.put_str(1, status_y, line.as_str(), Attr::empty());
        (line.char_len() + 1, status_y)
    } else {
        if let Some(label) = mode.label() {
            frame.put_str(0, status_y, label, Attr::empty());
        }
        // The whole row, not just the label.
        frame.fill_row_attrs(status_y, Attr::INVERSE);

        let text = buf.line(cursor.line()).unwrap_or_default();
        let row = cursor.line().saturating_sub(cursor.scroll());
        let y = u16::try_from(row).unwrap_or(u16::MAX).min(status_y);
        (display_col(text, cursor.column()), y)
    };

    // Both are clamped to the frame, which is at most u16::MAX wide.
    #[allow(clippy::cast_possible_truncation)]
    let x = x.min(max_x) as u16;
    Some((x, y))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
