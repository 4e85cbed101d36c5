//! Line buffer: the document as a list of owned lines.
//!
//! A [`LineBuffer`] is a `Vec<String>` with one entry per line and no line
//! terminators stored. It always holds at least one line: an empty document
//! is a single empty line.
//!
//! # Coordinates
//!
//! Lines are 0-indexed. Columns are **byte offsets** into the line, valid in
//! `0..=len`. Every mutating operation checks that its column sits on a
//! `char` boundary and refuses otherwise, so a multi-byte character is
//! never split. The cursor layer keeps its column on a boundary using
//! [`prev_boundary`], [`next_boundary`] and [`floor_boundary`].
//!
//! # Cost
//!
//! Edits touch one or two `String`s, so they are linear in the length of
//! the lines involved. Adding or removing a line shifts the `Vec`.

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A buffer operation was asked to work outside the document.
///
/// The buffer is never changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("line {line} is out of range (buffer has {count} lines)")]
    LineOutOfRange { line: usize, count: usize },

    #[error("column {column} is past the end of line {line} ({len} bytes)")]
    ColumnOutOfRange { line: usize, column: usize, len: usize },

    #[error("column {column} of line {line} is inside a multi-byte character")]
    NotCharBoundary { line: usize, column: usize },

    #[error("line {line} is the last line, there is nothing to join")]
    LastLine { line: usize },
}

// ---------------------------------------------------------------------------
// LineBuffer
// ---------------------------------------------------------------------------

/// An ordered list of text lines that is never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    modified: bool,
}

impl LineBuffer {
    // -- Construction -------------------------------------------------------

    /// A document with one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            modified: false,
        }
    }

    /// A document with the given lines. No lines at all becomes one empty
    /// line.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            modified: false,
        }
    }

    /// Split file text into lines.
    ///
    /// Lines end at `\n`, and one `\r` before it is dropped, so CRLF files
    /// load cleanly. A final line terminator does not produce an extra empty
    /// line. Empty text gives one empty line.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut parts: Vec<&str> = text.split('\n').collect();
        if parts.last() == Some(&"") {
            parts.pop();
        }
        Self::from_lines(parts.into_iter().map(|l| l.strip_suffix('\r').unwrap_or(l)))
    }

    /// Like [`from_text`](Self::from_text) for raw file bytes. Invalid UTF-8
    /// is replaced with U+FFFD rather than rejected.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_text(&String::from_utf8_lossy(bytes))
    }

    // -- Access -------------------------------------------------------------

    /// Number of lines, always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line `line`, without terminator.
    #[inline]
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    /// Byte length of line `line`.
    #[inline]
    #[must_use]
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(String::len)
    }

    /// All lines.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The document as saved: lines joined with `\n`, no trailing newline.
    #[must_use]
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    /// Whether anything changed since load or the last [`mark_saved`](Self::mark_saved).
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` at byte `column` of `line`.
    ///
    /// # Errors
    ///
    /// Fails if `line` does not exist or `column` is not a char boundary
    /// within `0..=len`.
    pub fn insert_char(&mut self, line: usize, column: usize, ch: char) -> Result<(), BufferError> {
        let text = self.checked_line_mut(line, column)?;
        text.insert(column, ch);
        self.modified = true;
        Ok(())
    }

    /// Remove the character starting at byte `column` of `line`.
    ///
    /// Returns the removed character, or `None` (buffer untouched) when
    /// there is nothing there: `column` at or past the end, a missing line,
    /// or a column inside a character.
    pub fn delete_char(&mut self, line: usize, column: usize) -> Option<char> {
        let text = self.lines.get_mut(line)?;
        if column >= text.len() || !text.is_char_boundary(column) {
            return None;
        }
        let ch = text.remove(column);
        self.modified = true;
        Some(ch)
    }

    /// Break `line` at `column`: the line keeps `[0, column)` and a new line
    /// holding `[column, len)` is inserted right after it.
    ///
    /// # Errors
    ///
    /// Same conditions as [`insert_char`](Self::insert_char).
    pub fn split_at(&mut self, line: usize, column: usize) -> Result<(), BufferError> {
        let text = self.checked_line_mut(line, column)?;
        let tail = text.split_off(column);
        self.lines.insert(line + 1, tail);
        self.modified = true;
        Ok(())
    }

    /// Append line `line + 1` to `line` and remove it.
    ///
    /// Returns the byte length `line` had before the join, which is where
    /// the two halves meet.
    ///
    /// # Errors
    ///
    /// Fails if `line` does not exist or is the last line.
    pub fn join_with_next(&mut self, line: usize) -> Result<usize, BufferError> {
        self.check_line(line)?;
        if line + 1 >= self.lines.len() {
            return Err(BufferError::LastLine { line });
        }
        let next = self.lines.remove(line + 1);
        let text = &mut self.lines[line];
        let joint = text.len();
        text.push_str(&next);
        self.modified = true;
        Ok(joint)
    }

    /// Insert an empty line after `line`.
    ///
    /// # Errors
    ///
    /// Fails if `line` does not exist.
    pub fn open_line_after(&mut self, line: usize) -> Result<(), BufferError> {
        self.insert_line(line + 1, String::new())
    }

    /// Insert `text` as a new line at `index` (`index == line_count` appends).
    ///
    /// # Errors
    ///
    /// Fails if `index > line_count`.
    pub fn insert_line(&mut self, index: usize, text: impl Into<String>) -> Result<(), BufferError> {
        if index > self.lines.len() {
            return Err(BufferError::LineOutOfRange {
                line: index,
                count: self.lines.len(),
            });
        }
        self.lines.insert(index, text.into());
        self.modified = true;
        Ok(())
    }

    /// Remove line `index` and return its text.
    ///
    /// Removing the only line leaves one empty line behind.
    pub fn remove_line(&mut self, index: usize) -> Option<String> {
        if index >= self.lines.len() {
            return None;
        }
        let removed = if self.lines.len() == 1 {
            std::mem::take(&mut self.lines[0])
        } else {
            self.lines.remove(index)
        };
        self.modified = true;
        Some(removed)
    }

    // -- Internal -----------------------------------------------------------

    fn check_line(&self, line: usize) -> Result<(), BufferError> {
        if line < self.lines.len() {
            Ok(())
        } else {
            Err(BufferError::LineOutOfRange {
                line,
                count: self.lines.len(),
            })
        }
    }

    fn checked_line_mut(&mut self, line: usize, column: usize) -> Result<&mut String, BufferError> {
        self.check_line(line)?;
        let text = &mut self.lines[line];
        if column > text.len() {
            return Err(BufferError::ColumnOutOfRange {
                line,
                column,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(column) {
            return Err(BufferError::NotCharBoundary { line, column });
        }
        Ok(text)
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBuffer")
            .field("lines", &self.lines.len())
            .field("modified", &self.modified)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Char boundaries
// ---------------------------------------------------------------------------

/// The largest char boundary of `s` that is `<= index`, clamped to `s.len()`.
#[must_use]
pub fn floor_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Start of the character before byte `index`, or 0 at the start.
#[must_use]
pub fn prev_boundary(s: &str, index: usize) -> usize {
    let index = floor_boundary(s, index);
    s[..index].char_indices().next_back().map_or(0, |(i, _)| i)
}

/// End of the character at byte `index`, or `s.len()` at the end.
#[must_use]
pub fn next_boundary(s: &str, index: usize) -> usize {
    let index = floor_boundary(s, index);
    s[index..]
        .chars()
        .next()
        .map_or(s.len(), |ch| index + ch.len_utf8())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
