//! Modal editing state.
//!
//! The editor is always in exactly one [`Mode`]. Command mode carries its
//! own [`CommandLine`], so the typed text only exists while the prompt is
//! open and is dropped on the way out.
//!
//! | Mode    | Cursor shape | Status row          |
//! |---------|--------------|---------------------|
//! | Normal  | Block        | `-- NORMAL --`      |
//! | Insert  | Bar          | `-- INSERT --`      |
//! | Command | Bar          | `:` + command line  |

use std::fmt;

use crate::command::CommandLine;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The current editing mode.
///
/// Pure data: key handling and transitions live in [`Editor`](crate::editor::Editor).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Keys are commands. The initial mode.
    #[default]
    Normal,
    /// Keys insert text.
    Insert,
    /// Keys edit the `:` prompt.
    Command(CommandLine),
}

impl Mode {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Command(_) => "COMMAND",
        }
    }

    /// Fixed status-row label. Command mode shows its prompt instead.
    #[must_use]
    pub const fn label(&self) -> Option<&'static str> {
        match self {
            Self::Normal => Some("-- NORMAL --"),
            Self::Insert => Some("-- INSERT --"),
            Self::Command(_) => None,
        }
    }

    #[must_use]
    pub const fn cursor_shape(&self) -> CursorShape {
        match self {
            Self::Normal => CursorShape::Block,
            Self::Insert | Self::Command(_) => CursorShape::Bar,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(self, Self::Command(_))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CursorShape
// ---------------------------------------------------------------------------

/// Cursor shape for the terminal. The binary maps this onto the terminal
/// crate's own type so the editor core does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    Block,
    Bar,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn labels() {
        assert_eq!(Mode::Normal.label(), Some("-- NORMAL --"));
        assert_eq!(Mode::Insert.label(), Some("-- INSERT --"));
        assert_eq!(Mode::Command(CommandLine::new()).label(), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.to_string(), "NORMAL");
        assert_eq!(Mode::Insert.to_string(), "INSERT");
        assert_eq!(Mode::Command(CommandLine::new()).to_string(), "COMMAND");
    }

    #[test]
    fn cursor_shapes() {
        assert_eq!(Mode::Normal.cursor_shape(), CursorShape::Block);
        assert_eq!(Mode::Insert.cursor_shape(), CursorShape::Bar);
        assert_eq!(Mode::Command(CommandLine::new()).cursor_shape(), CursorShape::Bar);
    }

    #[test]
    fn only_command_is_command() {
        assert!(Mode::Command(CommandLine::new()).is_command());
        assert!(!Mode::Normal.is_command());
        assert!(!Mode::Insert.is_command());
    }
}
