//! Keys as the editor core sees them.
//!
//! The terminal layer parses bytes into richer events (modifiers, function
//! keys, paging). The editor only reacts to this small set, so the binary
//! translates into [`Key`] and drops everything else before it gets here.

/// One keystroke.
///
/// Named keys are separate variants from [`Key::Char`], so "no character"
/// can never be mistaken for a printable one. Space and Tab are named keys
/// that still insert text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Space,
    Tab,
    /// A printable character other than space and tab.
    Char(char),
}

impl Key {
    /// The text this key inserts in Insert and Command mode, if any.
    #[must_use]
    pub const fn text(self) -> Option<char> {
        match self {
            Self::Space => Some(' '),
            Self::Tab => Some('\t'),
            Self::Char(ch) => Some(ch),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
