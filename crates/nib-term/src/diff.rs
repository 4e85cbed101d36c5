// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Each frame is compared with the one before it and only changed cells are
// written. A keystroke in an editor typically touches one text row and the
// status row, so most of the screen is never resent.
//
// Per frame:
//
//   1. The application paints a FrameBuffer.
//   2. `render` diffs it against the stored previous frame, handing changed
//      cells to a CellWriter that writes into an OutputBuffer.
//   3. `flush` sends the whole thing in one write().
//
// Unchanged rows are skipped with a single slice comparison. The first
// frame, a size change, or `force_redraw` clears and repaints everything.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Counters from one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells written because they changed.
    pub cells_rendered: usize,
    /// Cells left alone because they matched the previous frame.
    pub cells_skipped: usize,
    /// Bytes of ANSI generated.
    pub bytes_written: usize,
}

impl RenderStats {
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Renders frames by diffing against the previous one.
///
/// ```no_run
/// use nib_term::buffer::FrameBuffer;
/// use nib_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(80, 24);
/// renderer.render(&frame)?;
/// renderer.flush()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// A renderer whose first frame will be drawn in full.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame and queue the ANSI output.
    ///
    /// # Errors
    ///
    /// Only if writing into the in-memory output fails, which it does not.
    pub fn render(&mut self, current: &FrameBuffer) -> io::Result<RenderStats> {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        if width == 0 || height == 0 {
            self.store_frame(current);
            return Ok(stats);
        }

        ansi::begin_sync(&mut self.output)?;

        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == height);

        if previous.is_none() {
            ansi::reset(&mut self.output)?;
            ansi::clear_screen(&mut self.output)?;
        }

        for y in 0..height {
            let Some(row) = current.row(y) else { continue };
            let prev_row = previous.and_then(|p| p.row(y));

            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }

            for (x, cell) in (0..width).zip(row) {
                let unchanged = prev_row.and_then(|r| r.get(usize::from(x))) == Some(cell);
                if unchanged {
                    stats.cells_skipped += 1;
                } else {
                    self.writer.render_cell(&mut self.output, x, y, cell)?;
                    stats.cells_rendered += 1;
                }
            }
        }

        // Leave the terminal with default attributes between frames.
        ansi::reset(&mut self.output)?;
        ansi::end_sync(&mut self.output)?;

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        Ok(stats)
    }

    /// Bytes queued by the last [`render`](Self::render).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Send queued output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// Send queued output to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Forget the previous frame so the next render repaints everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
