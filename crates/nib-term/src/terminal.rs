// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, and RAII cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty and a
// raw fd write are the POSIX terminal interfaces and have no safe
// counterpart. Each unsafe block wraps exactly one of those calls.
#![allow(unsafe_code)]
//
// `Terminal` owns the tty's state while the editor runs: raw mode through
// termios, the alternate screen, a hidden cursor. Leaving (explicitly or on
// drop) undoes all of it in reverse.
//
// A panic in raw mode would leave the user's shell unusable, so a panic hook
// writes a fixed restore sequence straight to fd 1 and resets termios from a
// global backup before the default hook prints the message. Going around
// Rust's stdout lock matters: the panic may have happened mid-frame while
// that lock was held.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the terminal cannot be queried.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Current terminal size via `ioctl(TIOCGWINSZ)`, or `None` when stdout is
/// not a terminal.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is a TTY.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Original termios, for the panic hook, which cannot reach the `Terminal`.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn restore_termios_from_backup() {
    let saved = TERMIOS_BACKUP.lock().ok().and_then(|backup| *backup);
    if let Some(saved) = saved {
        let _ = write_termios(&saved, libc::TCSANOW);
    }
}

/// End synchronized output, reset SGR, reset cursor shape, show cursor,
/// leave the alternate screen. The alternate screen goes last so the shell
/// comes back clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Chain a terminal-restoring hook in front of the current panic hook.
/// Installed at most once per process.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle. [`enter`](Self::enter) switches to full-screen mode;
/// dropping the handle switches back.
///
/// ```no_run
/// use nib_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... draw ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// A handle sized to the current terminal (80x24 if unknown). Does not
    /// touch terminal state yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    /// Cached size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size (after SIGWINCH) and cache it.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, cleared, cursor hidden. Idempotent.
    ///
    /// If the screen setup cannot be written, raw mode is switched back off
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or terminal output fails.
    pub fn enter(&mut self) -> io::Result<()> {
        self.enter_with(&mut io::stdout().lock())
    }

    /// Undo [`enter`](Self::enter). Idempotent.
    ///
    /// The termios restore runs even when the screen sequences fail, and the
    /// handle is inactive afterwards either way.
    ///
    /// # Errors
    ///
    /// Returns the first failure of terminal output or the termios restore.
    pub fn leave(&mut self) -> io::Result<()> {
        self.leave_with(&mut io::stdout().lock())
    }

    fn enter_with<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;

        if let Err(err) = write_enter_sequence(out) {
            let _ = self.disable_raw_mode();
            return Err(err);
        }

        self.active = true;
        Ok(())
    }

    fn leave_with<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let written = write_leave_sequence(out);
        let restored = self.disable_raw_mode();
        self.active = false;
        written.and(restored)
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        let saved = read_termios()?;
        self.original_termios = Some(saved);
        if let Ok(mut backup) = TERMIOS_BACKUP.lock() {
            *backup = Some(saved);
        }

        let mut raw = saved;
        // SAFETY: `raw` is a valid termios obtained from tcgetattr.
        unsafe { libc::cfmakeraw(&raw mut raw) };
        // One byte at a time, no inter-byte timer.
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        write_termios(&raw, libc::TCSAFLUSH)
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        let Some(saved) = self.original_termios.take() else {
            return Ok(());
        };
        write_termios(&saved, libc::TCSAFLUSH)?;
        if let Ok(mut backup) = TERMIOS_BACKUP.lock() {
            *backup = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn write_enter_sequence<W: Write>(out: &mut W) -> io::Result<()> {
    ansi::enter_alt_screen(out)?;
    ansi::cursor_hide(out)?;
    ansi::clear_screen(out)?;
    out.flush()
}

fn write_leave_sequence<W: Write>(out: &mut W) -> io::Result<()> {
    ansi::end_sync(out)?;
    ansi::reset(out)?;
    ansi::set_cursor_shape(out, ansi::CursorShape::Default)?;
    ansi::cursor_show(out)?;
    ansi::exit_alt_screen(out)?;
    out.flush()
}

#[cfg(unix)]
fn read_termios() -> io::Result<libc::termios> {
    // SAFETY: termios is plain data; tcgetattr fills it in or fails.
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } == 0 {
        Ok(termios)
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn write_termios(termios: &libc::termios, when: libc::c_int) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, when, termios) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Queries ─────────────────────────────────────────────────────

    #[test]
    fn queries_do_not_panic() {
        let _ = get_size();
        let _ = is_tty();
    }

    #[test]
    fn fallback_size_is_classic_vt100() {
        assert_eq!(Size::FALLBACK, Size { cols: 80, rows: 24 });
    }

    // ── Emergency restore sequence ──────────────────────────────────

    #[test]
    fn emergency_restore_exits_alt_screen_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn emergency_restore_shows_cursor_and_resets() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.contains("\x1b[?2026l"));
        assert!(s.contains("\x1b[0m"));
        assert!(s.contains("\x1b[0 q"));
        assert!(s.contains("\x1b[?25h"));
    }

    // ── Terminal ────────────────────────────────────────────────────

    #[test]
    fn new_is_inactive_with_nonzero_size() {
        let term = Terminal::new();
        assert!(!term.is_active());
        assert!(term.size().cols > 0);
        assert!(term.size().rows > 0);
    }

    #[test]
    fn enter_leave_cycle_is_idempotent() {
        let mut term = Terminal::new();
        term.enter().unwrap();
        term.enter().unwrap();
        assert!(term.is_active());
        term.leave().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn leave_without_enter() {
        let mut term = Terminal::new();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn drop_after_enter_restores() {
        let mut term = Terminal::new();
        term.enter().unwrap();
        drop(term);
    }

    /// Rejects every write, like a closed stdout.
    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn failed_enter_switches_raw_mode_back_off() {
        let mut term = Terminal::new();
        let err = term.enter_with(&mut ClosedOutput).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(!term.is_active());
        #[cfg(unix)]
        assert!(term.original_termios.is_none());
    }

    #[test]
    fn failed_leave_still_restores_raw_mode() {
        let mut term = Terminal::new();
        term.enter_with(&mut Vec::new()).unwrap();
        assert!(term.is_active());

        let err = term.leave_with(&mut ClosedOutput).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(!term.is_active());
        #[cfg(unix)]
        assert!(term.original_termios.is_none());

        // Nothing left to undo, so a retry is a no-op.
        term.leave_with(&mut ClosedOutput).unwrap();
    }

    #[test]
    fn enter_and_leave_sequences() {
        let mut out = Vec::new();
        write_enter_sequence(&mut out).unwrap();
        let enter = String::from_utf8(out).unwrap();
        assert!(enter.starts_with("\x1b[?1049h"));
        assert!(enter.contains("\x1b[?25l"));

        let mut out = Vec::new();
        write_leave_sequence(&mut out).unwrap();
        let leave = String::from_utf8(out).unwrap();
        assert!(leave.contains("\x1b[?25h"));
        assert!(leave.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn refresh_size_updates_cache() {
        let mut term = Terminal::new();
        let s = term.refresh_size();
        assert_eq!(s, term.size());
    }
}
