//! The editor aggregate and its key handling.
//!
//! [`Editor`] owns the whole editing session: the [`LineBuffer`], the
//! [`CursorModel`], the current [`Mode`] and the [`FileStore`] used for
//! loading and saving. There is exactly one per process and nothing else
//! mutates it.
//!
//! # Key dispatch
//!
//! [`handle_key`](Editor::handle_key) matches on the mode first and the key
//! second. Keys a mode has no use for are ignored. Every key ends with a
//! normalization pass, so the cursor is back inside the buffer and on screen
//! before the next key or frame.
//!
//! | Mode    | Key                 | Effect                                   |
//! |---------|---------------------|------------------------------------------|
//! | Normal  | `i`                 | Insert                                   |
//! | Normal  | `h` `j` `k` `l`, arrows | move, clamped                        |
//! | Normal  | `o`                 | open line below, Insert                  |
//! | Normal  | `x`                 | delete character under cursor            |
//! | Normal  | `:`                 | Command with an empty prompt             |
//! | Insert  | Esc                 | Normal                                   |
//! | Insert  | arrows              | move, clamped                            |
//! | Insert  | Enter               | split line, cursor to start of new line  |
//! | Insert  | Backspace           | delete left, or join with previous line  |
//! | Insert  | text                | insert at cursor                         |
//! | Command | Esc                 | Normal, prompt discarded                 |
//! | Command | Enter               | Normal, then run the command             |
//! | Command | Backspace           | drop last char, or Normal when empty     |
//! | Command | text                | append to prompt                         |

use std::path::Path;

use nib_term::buffer::FrameBuffer;
use nib_term::event_loop::Action;

use crate::buffer::{prev_boundary, LineBuffer};
use crate::command::{self, CommandLine};
use crate::cursor::CursorModel;
use crate::key::Key;
use crate::mode::Mode;
use crate::store::{DiskStore, FileStore};
use crate::view;

/// A single editing session.
#[derive(Debug)]
pub struct Editor<S: FileStore = DiskStore> {
    buffer: LineBuffer,
    cursor: CursorModel,
    mode: Mode,
    store: S,
    text_height: usize,
}

impl<S: FileStore> Editor<S> {
    /// An editor on `buffer`, in Normal mode with the cursor at the origin.
    #[must_use]
    pub fn new(buffer: LineBuffer, store: S) -> Self {
        Self {
            buffer,
            cursor: CursorModel::new(),
            mode: Mode::Normal,
            store,
            text_height: 1,
        }
    }

    /// Load `path` through `store`.
    ///
    /// A file that cannot be read is not an error: the editor starts on an
    /// empty document and the failure is logged.
    #[must_use]
    pub fn open(path: &Path, store: S) -> Self {
        let buffer = match store.read(path) {
            Ok(bytes) => {
                let buffer = LineBuffer::from_bytes(&bytes);
                tracing::info!(
                    path = %path.display(),
                    lines = buffer.line_count(),
                    "loaded"
                );
                buffer
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "load failed, starting empty");
                LineBuffer::new()
            }
        };

        Self::new(buffer, store)
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &CursorModel {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    #[inline]
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // -- Viewport -----------------------------------------------------------

    /// The terminal is now `rows` tall. Scrolling is redone for the new
    /// text height.
    pub fn resize(&mut self, rows: u16) {
        self.text_height = view::text_height(rows);
        self.cursor.normalize(&self.buffer, self.text_height);
    }

    /// Paint into `frame` and return the cursor position.
    ///
    /// The frame's height is taken as the terminal height, so a frame of a
    /// new size also rescrolls.
    pub fn render(&mut self, frame: &mut FrameBuffer) -> Option<(u16, u16)> {
        self.resize(frame.height());
        view::render(&self.buffer, &self.cursor, &self.mode, frame)
    }

    // -- Key handling -------------------------------------------------------

    /// Apply one key. Returns [`Action::Quit`] when a command asked to quit.
    pub fn handle_key(&mut self, key: Key) -> Action {
        let action = match self.mode {
            Mode::Normal => {
                self.normal_key(key);
                Action::Continue
            }
            Mode::Insert => {
                self.insert_key(key);
                Action::Continue
            }
            Mode::Command(_) => self.command_key(key),
        };
        self.cursor.normalize(&self.buffer, self.text_height);
        action
    }

    fn normal_key(&mut self, key: Key) {
        match key {
            Key::Char('i') => self.set_mode(Mode::Insert),
            Key::Char('h') | Key::Left => self.cursor.move_left(&self.buffer),
            Key::Char('j') | Key::Down => self.cursor.move_down(&self.buffer),
            Key::Char('k') | Key::Up => self.cursor.move_up(&self.buffer),
            Key::Char('l') | Key::Right => self.cursor.move_right(&self.buffer),
            Key::Char('o') => {
                let line = self.cursor.line();
                match self.buffer.open_line_after(line) {
                    Ok(()) => {
                        self.cursor.set_position(line + 1, 0);
                        self.set_mode(Mode::Insert);
                    }
                    Err(err) => tracing::warn!(error = %err, "open line rejected"),
                }
            }
            Key::Char('x') => {
                self.buffer.delete_char(self.cursor.line(), self.cursor.column());
            }
            Key::Char(':') => self.set_mode(Mode::Command(CommandLine::new())),
            _ => {}
        }
    }

    fn insert_key(&mut self, key: Key) {
        let (line, column) = (self.cursor.line(), self.cursor.column());
        match key {
            Key::Escape => self.set_mode(Mode::Normal),
            Key::Left => self.cursor.move_left(&self.buffer),
            Key::Down => self.cursor.move_down(&self.buffer),
            Key::Up => self.cursor.move_up(&self.buffer),
            Key::Right => self.cursor.move_right(&self.buffer),
            Key::Enter => match self.buffer.split_at(line, column) {
                Ok(()) => self.cursor.set_position(line + 1, 0),
                Err(err) => tracing::warn!(error = %err, "split rejected"),
            },
            Key::Backspace => self.backspace(line, column),
            _ => {
                if let Some(ch) = key.text() {
                    match self.buffer.insert_char(line, column, ch) {
                        Ok(()) => self.cursor.set_position(line, column + ch.len_utf8()),
                        Err(err) => tracing::warn!(error = %err, "insert rejected"),
                    }
                }
            }
        }
    }

    fn backspace(&mut self, line: usize, column: usize) {
        if column > 0 {
            let text = self.buffer.line(line).unwrap_or_default();
            let prev = prev_boundary(text, column);
            self.buffer.delete_char(line, prev);
            self.cursor.set_position(line, prev);
        } else if line > 0 {
            match self.buffer.join_with_next(line - 1) {
                Ok(joint) => self.cursor.set_position(line - 1, joint),
                Err(err) => tracing::warn!(error = %err, "join rejected"),
            }
        }
    }

    fn command_key(&mut self, key: Key) -> Action {
        let Mode::Command(prompt) = &mut self.mode else {
            return Action::Continue;
        };

        match key {
            Key::Escape => self.set_mode(Mode::Normal),
            Key::Enter => {
                let command = prompt.parse();
                self.set_mode(Mode::Normal);
                tracing::debug!(?command, "running command");
                return command::execute(&command, &mut self.buffer, &mut self.store);
            }
            Key::Backspace => {
                if !prompt.backspace() {
                    self.set_mode(Mode::Normal);
                }
            }
            _ => {
                if let Some(ch) = key.text() {
                    prompt.push(ch);
                }
            }
        }
        Action::Continue
    }

    fn set_mode(&mut self, mode: Mode) {
        tracing::debug!(from = self.mode.name(), to = mode.name(), "mode change");
        self.mode = mode;
    }
}

impl Editor<DiskStore> {
    /// Open `path` from disk, or start empty with no path.
    #[must_use]
    pub fn from_disk(path: Option<&Path>) -> Self {
        path.map_or_else(
            || Self::new(LineBuffer::new(), DiskStore),
            |path| Self::open(path, DiskStore),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
