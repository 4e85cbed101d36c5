// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
//   OutputBuffer: collects a whole frame's bytes so it reaches the
//   terminal in one write() instead of hundreds.
//
//   CellWriter: remembers where the terminal cursor is and which
//   attributes are active, so consecutive cells on a row need no cursor
//   move and an unchanged style needs no SGR.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// Byte buffer for one frame of terminal output.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 8_192;

impl OutputBuffer {
    /// An empty buffer with room for a typical frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes collected.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The collected bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append `ch` as UTF-8.
    pub fn write_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf
            .extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Drop the contents, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write everything to stdout in one go and clear.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.flush_to(&mut lock)
    }

    /// Write everything to `w` and clear.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    // Real flushing goes through flush_stdout / flush_to.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Emits cells while skipping escapes that would change nothing.
///
/// - Cursor: no CUP when the cell is directly right of the last one.
/// - Attributes: on change, SGR 0 (only if something was active) and then
///   the new set.
#[derive(Debug)]
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_attrs: Attr,
}

impl CellWriter {
    /// A writer that assumes nothing about the terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_attrs: Attr::empty(),
        }
    }

    /// Forget tracked state. Call after anything that resets the terminal.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// Emit one cell at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out` (never happens for a Vec).
    pub fn render_cell(
        &mut self,
        out: &mut OutputBuffer,
        x: u16,
        y: u16,
        cell: &Cell,
    ) -> io::Result<()> {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y)?;
        }

        if cell.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                ansi::reset(out)?;
            }
            ansi::attrs(out, cell.attrs)?;
            self.last_attrs = cell.attrs;
        }

        out.write_char(cell.ch);

        self.last_x = xi;
        self.last_y = yi;
        Ok(())
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
