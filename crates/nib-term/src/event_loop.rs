// SPDX-License-Identifier: MIT
//
// Event loop: input in, frames out.
//
// The stdin reader thread sends bytes and resize notices over a channel.
// The loop parses bytes into keys, hands each key to the application,
// repaints the frame, and lets the diff renderer write what changed.
//
// # Blocking
//
// An editor has nothing to do between keystrokes, so the loop blocks on
// the channel with no timeout. The one exception is a pending ESC: the
// parser cannot know yet whether it is the Escape key or the start of an
// arrow-key sequence, so while bytes are pending the loop waits only
// `escape_timeout` and then flushes them as literal keys.
//
// # Failure
//
// A read error from the reader thread, or stdin closing, ends the loop
// with an error. Quitting through the application ends it with `Ok`.
// Either way the terminal is restored before `run` returns.

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi::{self, CursorShape};
use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{KeyEvent, Parser};
use crate::reader::{self, Input, StdinReader};
use crate::terminal::{Size, Terminal};

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application wants after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// A full-screen terminal application.
///
/// Per input the loop calls [`on_key`](App::on_key) for each parsed key
/// (or [`on_resize`](App::on_resize)), then [`paint`](App::paint) on a
/// cleared frame, then [`cursor`](App::cursor) to place the hardware cursor.
pub trait App {
    /// Handle one key. Return [`Action::Quit`] to leave the loop.
    fn on_key(&mut self, key: KeyEvent) -> Action;

    /// The terminal changed size. The frame has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the whole screen. `buf` is blank when this is called.
    fn paint(&mut self, buf: &mut FrameBuffer);

    /// Where to show the cursor after painting, and in which shape.
    /// `None` hides it.
    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }
}

/// Feed keys to `app` in order, stopping at the first quit.
fn dispatch(app: &mut impl App, keys: &[KeyEvent]) -> Action {
    for &key in keys {
        if app.on_key(key) == Action::Quit {
            return Action::Quit;
        }
    }
    Action::Continue
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// How long a lone ESC waits for the rest of a sequence.
    pub escape_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            escape_timeout: Duration::from_millis(25),
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal, parser and renderer for the life of the UI.
///
/// ```no_run
/// use nib_term::buffer::FrameBuffer;
/// use nib_term::cell::Attr;
/// use nib_term::event_loop::{Action, App, EventLoop};
/// use nib_term::input::{KeyCode, KeyEvent};
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_key(&mut self, key: KeyEvent) -> Action {
///         if key.code == KeyCode::Char('q') { Action::Quit } else { Action::Continue }
///     }
///
///     fn paint(&mut self, buf: &mut FrameBuffer) {
///         buf.put_str(0, 0, "press q", Attr::empty());
///     }
/// }
///
/// EventLoop::new().run(&mut Hello)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
            config,
        }
    }

    /// Terminal size as of the last query.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Take over the terminal and run until the app quits.
    ///
    /// The terminal is restored on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up or restored, if
    /// writing a frame fails, if reading stdin fails, or if stdin closes.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        reader::install_sigwinch_handler();

        let result = match StdinReader::spawn() {
            Ok((mut reader, rx)) => {
                let result = self.run_inner(app, &rx);
                reader.stop();
                result
            }
            Err(err) => Err(err),
        };

        let left = self.terminal.leave();
        result.and(left)
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Input>) -> io::Result<()> {
        let size = self.terminal.refresh_size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        app.on_resize(size);
        self.draw(app, &mut frame)?;

        loop {
            let input = if self.parser.has_pending() {
                match rx.recv_timeout(self.config.escape_timeout) {
                    Ok(input) => input,
                    Err(RecvTimeoutError::Timeout) => {
                        let keys = self.parser.flush();
                        if dispatch(app, &keys) == Action::Quit {
                            return Ok(());
                        }
                        self.draw(app, &mut frame)?;
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return Err(stdin_closed()),
                }
            } else {
                rx.recv().map_err(|_| stdin_closed())?
            };

            match input {
                Input::Bytes(bytes) => {
                    let keys = self.parser.advance(&bytes);
                    if keys.is_empty() {
                        continue;
                    }
                    if dispatch(app, &keys) == Action::Quit {
                        return Ok(());
                    }
                }
                Input::Resize => {
                    let size = self.terminal.refresh_size();
                    frame.resize(size.cols, size.rows);
                    self.renderer.force_redraw();
                    app.on_resize(size);
                }
                Input::Failed(err) => return Err(err),
            }

            self.draw(app, &mut frame)?;
        }
    }

    fn draw(&mut self, app: &mut impl App, frame: &mut FrameBuffer) -> io::Result<()> {
        frame.clear();
        app.paint(frame);
        self.renderer.render(frame)?;
        self.renderer.flush()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Some((x, y, shape)) = app.cursor() {
            ansi::cursor_to(&mut lock, x, y)?;
            ansi::set_cursor_shape(&mut lock, shape)?;
            ansi::cursor_show(&mut lock)?;
        } else {
            ansi::cursor_hide(&mut lock)?;
        }
        lock.flush()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

fn stdin_closed() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;

    #[derive(Default)]
    struct Recorder {
        keys: Vec<KeyEvent>,
        painted: usize,
    }

    impl App for Recorder {
        fn on_key(&mut self, key: KeyEvent) -> Action {
            self.keys.push(key);
            if key.code == KeyCode::Char('q') {
                Action::Quit
            } else {
                Action::Continue
            }
        }

        fn paint(&mut self, _buf: &mut FrameBuffer) {
            self.painted += 1;
        }
    }

    fn key(ch: char) -> KeyEvent {
        KeyEvent::plain(KeyCode::Char(ch))
    }

    #[test]
    fn default_escape_timeout_is_short() {
        assert_eq!(LoopConfig::default().escape_timeout, Duration::from_millis(25));
    }

    #[test]
    fn dispatch_delivers_keys_in_order() {
        let mut app = Recorder::default();
        assert_eq!(dispatch(&mut app, &[key('a'), key('b')]), Action::Continue);
        assert_eq!(app.keys, vec![key('a'), key('b')]);
    }

    #[test]
    fn dispatch_stops_at_quit() {
        let mut app = Recorder::default();
        assert_eq!(dispatch(&mut app, &[key('a'), key('q'), key('b')]), Action::Quit);
        assert_eq!(app.keys, vec![key('a'), key('q')]);
    }

    #[test]
    fn dispatch_nothing_continues() {
        let mut app = Recorder::default();
        assert_eq!(dispatch(&mut app, &[]), Action::Continue);
    }

    #[test]
    fn app_defaults() {
        let mut app = Recorder::default();
        app.on_resize(Size { cols: 100, rows: 50 });
        assert!(app.cursor().is_none());
        app.paint(&mut FrameBuffer::new(1, 1));
        assert_eq!(app.painted, 1);
    }

    #[test]
    fn stdin_closed_is_unexpected_eof() {
        assert_eq!(stdin_closed().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn event_loop_has_a_size() {
        let event_loop = EventLoop::new();
        assert!(event_loop.size().cols > 0);
        assert!(event_loop.size().rows > 0);
    }
}
