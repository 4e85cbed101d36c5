// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. nib enables no extra terminal
// protocols (no mouse, no kitty keyboard, no bracketed paste), so what
// arrives is the legacy xterm encoding:
//
// - printable ASCII and UTF-8 multi-byte characters
// - C0 control bytes (Ctrl+letter, Tab, Enter, Backspace)
// - CSI sequences for arrows, Home/End, editing keys, F5+ (with xterm
//   modifier parameters)
// - SS3 sequences for arrows, Home/End and F1-F4
// - ESC + key as Alt+key
//
// Sequences can be split across reads after their first parameter byte,
// so the parser keeps unconsumed bytes and resumes when more arrive. A lone ESC cannot be told apart
// from the start of a sequence until time passes; the caller waits a
// moment and then calls `flush` to turn it into an Escape key.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A press of `code` with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn with(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

/// Which key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Modifier keys, in the xterm encoding where the CSI parameter is
    /// `1 + bitmask`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental key parser.
///
/// ```
/// use nib_term::input::{KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// assert_eq!(parser.advance(b"i"), vec![KeyEvent::plain(KeyCode::Char('i'))]);
///
/// // A lone ESC waits for a timeout before it counts as Escape.
/// assert!(parser.advance(b"\x1b").is_empty());
/// assert_eq!(parser.flush(), vec![KeyEvent::plain(KeyCode::Escape)]);
/// ```
#[derive(Debug)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Feed bytes and return every key that is now complete.
    ///
    /// An incomplete tail stays buffered for the next call, except a bare
    /// `ESC [` or `ESC O`: a terminal never ends a write there, so when more
    /// bytes arrive it resolves as Alt+`[` or Alt+`O`.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        if let [0x1B, second @ (b'[' | b'O')] = self.buf[..] {
            if !data.is_empty() {
                events.push(KeyEvent::with(KeyCode::Char(char::from(second)), Modifiers::ALT));
                self.buf.clear();
            }
        }

        self.buf.extend_from_slice(data);
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    events.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for more input.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve whatever is pending as literal keys.
    ///
    /// Called once the input has gone quiet: a pending ESC becomes Escape,
    /// the bytes after it (a truncated sequence) become ordinary keys, and
    /// an unfinished UTF-8 sequence is dropped.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let events = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                b if b < 0x80 => single_byte(b),
                _ => None,
            })
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────

enum Parsed {
    /// A key, and how many bytes it used.
    Key(KeyEvent, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognised input, drop this many bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    match buf.first() {
        None => Parsed::Skip(0),
        Some(0x1B) => parse_escape(buf),
        Some(&b) if b < 0x80 => single_byte(b).map_or(Parsed::Skip(1), |k| Parsed::Key(k, 1)),
        Some(0xC0..=0xFF) => parse_utf8(buf),
        // Stray continuation byte.
        Some(_) => Parsed::Skip(1),
    }
}

/// Decode a single ASCII byte other than ESC.
fn single_byte(b: u8) -> Option<KeyEvent> {
    let key = match b {
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
        0x00 => KeyEvent::with(KeyCode::Char('@'), Modifiers::CTRL),
        0x01..=0x1A => KeyEvent::with(KeyCode::Char(char::from(b + b'a' - 1)), Modifiers::CTRL),
        0x20..=0x7E => KeyEvent::plain(KeyCode::Char(char::from(b))),
        _ => return None,
    };
    Some(key)
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Key(KeyEvent::with(KeyCode::Escape, Modifiers::ALT), 2),
        b if b < 0x80 => match single_byte(b) {
            Some(key) => Parsed::Key(
                KeyEvent::with(key.code, key.modifiers | Modifiers::ALT),
                2,
            ),
            None => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
        },
        // ESC followed by non-ASCII: the ESC stands alone.
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter and intermediate bytes are 0x20..=0x3F; the final byte is
    // 0x40..=0x7E.
    let mut end = 2;
    loop {
        match buf.get(end) {
            None => return Parsed::Incomplete,
            Some(0x40..=0x7E) => break,
            Some(0x20..=0x3F) => end += 1,
            Some(_) => return Parsed::Skip(end + 1),
        }
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = if final_byte == b'~' {
        match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            15 => KeyCode::F(5),
            17 => KeyCode::F(6),
            18 => KeyCode::F(7),
            19 => KeyCode::F(8),
            20 => KeyCode::F(9),
            21 => KeyCode::F(10),
            23 => KeyCode::F(11),
            24 => KeyCode::F(12),
            _ => return Parsed::Skip(consumed),
        }
    } else {
        match final_byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'Z' => return Parsed::Key(KeyEvent::with(KeyCode::Tab, Modifiers::SHIFT), consumed),
            _ => return Parsed::Skip(consumed),
        }
    };

    Parsed::Key(KeyEvent::with(code, modifiers), consumed)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&byte) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };
    Parsed::Key(KeyEvent::plain(code), 3)
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };

    let available = buf.len().min(expected);
    if buf[1..available].iter().any(|&b| b & 0xC0 != 0x80) {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Key(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Semicolon-separated numeric CSI parameters. Empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// xterm modifier parameter (`1 + bitmask`) to flags.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let bits = param.saturating_sub(1);
    Modifiers::from_bits_truncate(bits as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
