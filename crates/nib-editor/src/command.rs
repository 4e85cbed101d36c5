//! Command-line mode: the `:` prompt on the status row.
//!
//! Pressing `:` in Normal mode starts an empty [`CommandLine`]. Characters
//! are appended, Backspace drops the last one, Enter commits. The committed
//! text is parsed into a [`Command`] and run against the buffer.
//!
//! # Supported commands
//!
//! | Command       | Action                                          |
//! |---------------|-------------------------------------------------|
//! | `:q`          | Quit, even with unsaved changes                 |
//! | `:w`          | Save to [`DEFAULT_SAVE_PATH`]                   |
//! | `:w <path>`   | Save to `path`                                  |
//! | `:wq [path]`  | Save as `:w` does, then quit                    |
//!
//! Anything else, including an empty line, does nothing. Arguments after
//! the path are ignored.
//!
//! # Write failures
//!
//! A failed save is logged and otherwise ignored. The buffer is left as it
//! was and `:wq` still quits.

use std::path::{Path, PathBuf};

use nib_term::event_loop::Action;

use crate::buffer::LineBuffer;
use crate::store::FileStore;

/// Save path used by `:w` and `:wq` without an argument.
pub const DEFAULT_SAVE_PATH: &str = ".swapfile";

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:q`
    Quit,

    /// `:w [path]`
    Write(Option<PathBuf>),

    /// `:wq [path]`
    WriteQuit(Option<PathBuf>),

    /// Anything else. Holds the trimmed input for logging.
    Unknown(String),
}

impl Command {
    /// Split `input` on whitespace into a command name and arguments.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut words = input.split_whitespace();
        let name = words.next().unwrap_or_default();
        let path = words.next().map(PathBuf::from);

        match name {
            "q" => Self::Quit,
            "w" => Self::Write(path),
            "wq" => Self::WriteQuit(path),
            _ => Self::Unknown(input.trim().to_owned()),
        }
    }
}

/// Run `command` against `buf`, saving through `store`.
pub fn execute<S: FileStore>(command: &Command, buf: &mut LineBuffer, store: &mut S) -> Action {
    match command {
        Command::Quit => {
            if buf.is_modified() {
                tracing::warn!("quitting with unsaved changes");
            }
            Action::Quit
        }
        Command::Write(path) => {
            write(buf, store, path.as_deref());
            Action::Continue
        }
        Command::WriteQuit(path) => {
            write(buf, store, path.as_deref());
            Action::Quit
        }
        Command::Unknown(input) => {
            tracing::debug!(command = %input, "ignoring unknown command");
            Action::Continue
        }
    }
}

fn write<S: FileStore>(buf: &mut LineBuffer, store: &mut S, path: Option<&Path>) {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SAVE_PATH));
    match store.write(path, &buf.contents()) {
        Ok(()) => {
            buf.mark_saved();
            tracing::info!(path = %path.display(), lines = buf.line_count(), "saved");
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "save failed");
        }
    }
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// Text typed after `:`. The colon itself is not stored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandLine {
    input: String,
}

impl CommandLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.input
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Length in characters, which is also its display width.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.input.chars().count()
    }

    pub fn push(&mut self, ch: char) {
        self.input.push(ch);
    }

    /// Drop the last character. Returns `false` if there was none.
    pub fn backspace(&mut self) -> bool {
        self.input.pop().is_some()
    }

    #[must_use]
    pub fn parse(&self) -> Command {
        Command::parse(&self.input)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn buf(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().copied())
    }

    // -- CommandLine --------------------------------------------------------

    #[test]
    fn new_is_empty() {
        let cl = CommandLine::new();
        assert!(cl.is_empty());
        assert_eq!(cl.as_str(), "");
        assert_eq!(cl.char_len(), 0);
    }

    #[test]
    fn push_and_backspace() {
        let mut cl = CommandLine::new();
        for ch in "wé".chars() {
            cl.push(ch);
        }
        assert_eq!(cl.as_str(), "wé");
        assert_eq!(cl.char_len(), 2);
        assert!(cl.backspace());
        assert_eq!(cl.as_str(), "w");
        assert!(cl.backspace());
        assert!(!cl.backspace());
    }

    // -- Parsing ------------------------------------------------------------

    #[test]
    fn parse_quit() {
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("  q  "), Command::Quit);
    }

    #[test]
    fn parse_write() {
        assert_eq!(Command::parse("w"), Command::Write(None));
        assert_eq!(
            Command::parse("w out.txt"),
            Command::Write(Some(PathBuf::from("out.txt")))
        );
    }

    #[test]
    fn parse_write_ignores_extra_arguments() {
        assert_eq!(
            Command::parse("w a.txt b.txt"),
            Command::Write(Some(PathBuf::from("a.txt")))
        );
    }

    #[test]
    fn parse_write_quit() {
        assert_eq!(Command::parse("wq"), Command::WriteQuit(None));
        assert_eq!(
            Command::parse("wq\tx.txt"),
            Command::WriteQuit(Some(PathBuf::from("x.txt")))
        );
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
        assert_eq!(Command::parse("q!"), Command::Unknown("q!".into()));
        assert_eq!(Command::parse(" wqa "), Command::Unknown("wqa".into()));
    }

    #[test]
    fn command_line_parse_uses_input() {
        let mut cl = CommandLine::new();
        cl.push('q');
        assert_eq!(cl.parse(), Command::Quit);
    }

    // -- Execution ----------------------------------------------------------

    #[test]
    fn write_default_path() {
        let mut b = buf(&["a", "bb", "ccc"]);
        let mut store = MemoryStore::new();
        let result = execute(&Command::Write(None), &mut b, &mut store);
        assert_eq!(result, Action::Continue);
        assert_eq!(store.contents(DEFAULT_SAVE_PATH), Some("a\nbb\nccc"));
    }

    #[test]
    fn write_clears_modified() {
        let mut b = buf(&["a"]);
        b.insert_char(0, 1, 'b').unwrap();
        let mut store = MemoryStore::new();
        execute(&Command::Write(Some("f".into())), &mut b, &mut store);
        assert!(!b.is_modified());
        assert_eq!(store.contents("f"), Some("ab"));
    }

    #[test]
    fn write_failure_is_swallowed() {
        let mut b = buf(&["x"]);
        b.insert_char(0, 0, 'y').unwrap();
        let mut store = MemoryStore::new().read_only();
        let result = execute(&Command::Write(None), &mut b, &mut store);
        assert_eq!(result, Action::Continue);
        assert!(b.is_modified());
        assert_eq!(b.lines(), &["yx"]);
        assert!(store.is_empty());
    }

    #[test]
    fn write_quit_quits_even_if_write_fails() {
        let mut b = buf(&["x"]);
        let mut store = MemoryStore::new().read_only();
        let result = execute(&Command::WriteQuit(None), &mut b, &mut store);
        assert_eq!(result, Action::Quit);
    }

    #[test]
    fn write_quit_saves_to_path() {
        let mut b = buf(&["x"]);
        let mut store = MemoryStore::new();
        let result = execute(&Command::WriteQuit(Some("o".into())), &mut b, &mut store);
        assert_eq!(result, Action::Quit);
        assert_eq!(store.contents("o"), Some("x"));
    }

    #[test]
    fn quit_ignores_unsaved_changes() {
        let mut b = buf(&[""]);
        b.insert_char(0, 0, 'z').unwrap();
        let mut store = MemoryStore::new();
        assert_eq!(execute(&Command::Quit, &mut b, &mut store), Action::Quit);
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_does_nothing() {
        let mut b = buf(&["keep"]);
        let mut store = MemoryStore::new();
        let result = execute(&Command::Unknown("zz".into()), &mut b, &mut store);
        assert_eq!(result, Action::Continue);
        assert_eq!(b.lines(), &["keep"]);
        assert!(store.is_empty());
    }
}
