// SPDX-License-Identifier: MIT
//
// Cell: one character position on screen.
//
// A cell is a character plus the SGR attributes it is drawn with. nib
// paints in the terminal's own colors, so there is no color model here:
// the status line is told apart by `INVERSE`, everything else is plain.

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// SGR attributes as a bitfield.
    ///
    /// ```
    /// use nib_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::INVERSE;
    /// assert!(style.contains(Attr::INVERSE));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD      = 1 << 0;
        /// SGR 2.
        const DIM       = 1 << 1;
        /// SGR 4.
        const UNDERLINE = 1 << 2;
        /// SGR 7, swap foreground and background.
        const INVERSE   = 1 << 3;
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Character to draw. Control characters are never stored; painting
    /// replaces them so the terminal's cursor stays where we think it is.
    pub ch: char,
    /// Attributes applied while drawing `ch`.
    pub attrs: Attr,
}

impl Cell {
    /// A blank cell: a space with no attributes.
    pub const EMPTY: Self = Self {
        ch: ' ',
        attrs: Attr::empty(),
    };

    /// A plain cell showing `ch`.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            attrs: Attr::empty(),
        }
    }

    /// Same character, different attributes.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Whether this cell is indistinguishable from [`Cell::EMPTY`].
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell({:?}", self.ch)?;
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty_space() {
        let cell = Cell::default();
        assert_eq!(cell.ch, ' ');
        assert!(cell.attrs.is_empty());
        assert!(cell.is_empty());
    }

    #[test]
    fn new_has_no_attrs() {
        let cell = Cell::new('x');
        assert_eq!(cell.ch, 'x');
        assert!(!cell.is_empty());
    }

    #[test]
    fn inverse_space_is_not_empty() {
        assert!(!Cell::EMPTY.with_attrs(Attr::INVERSE).is_empty());
    }

    #[test]
    fn with_attrs_keeps_char() {
        let cell = Cell::new('q').with_attrs(Attr::BOLD);
        assert_eq!(cell.ch, 'q');
        assert_eq!(cell.attrs, Attr::BOLD);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Cell::new('a')), "Cell('a')");
        let styled = format!("{:?}", Cell::new('a').with_attrs(Attr::INVERSE));
        assert!(styled.contains("INVERSE"));
    }
}
