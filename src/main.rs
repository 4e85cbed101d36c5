// SPDX-License-Identifier: MIT
//
// nib: a minimal modal terminal text editor.
//
// This binary wires the two crates together:
//
//   nib-term   → terminal control, input parsing, diff rendering, event loop
//   nib-editor → line buffer, cursor, modes, commands, viewport
//
// `NibApp` implements nib-term's App trait around an `Editor`. Each
// keypress flows through:
//
//   stdin → parser → on_key → translate → Editor::handle_key
//   paint → Editor::render → framebuffer → diff renderer → terminal
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← h - 1 rows
//   ├──────────────────────────────┤
//   │ status / command line        │  ← 1 row
//   └──────────────────────────────┘
//
// Nothing can be printed to the terminal while the editor owns it, so
// diagnostics go to a log file, and only when `--log-file` asks for one.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use nib_editor::mode::CursorShape as EditorCursorShape;
use nib_editor::store::{DiskStore, FileStore};
use nib_editor::{Editor, Key};

use nib_term::ansi::CursorShape;
use nib_term::buffer::FrameBuffer;
use nib_term::event_loop::{Action, App, EventLoop};
use nib_term::input::{KeyCode, KeyEvent, Modifiers};
use nib_term::terminal::Size;

/// Environment variable holding the log filter, e.g. `NIB_LOG=debug`.
const LOG_ENV: &str = "NIB_LOG";

// ─── Command line ───────────────────────────────────────────────────────────

/// A minimal modal terminal text editor
#[derive(Parser, Debug)]
#[command(name = "nib", version, about, long_about = None)]
struct Args {
    /// File to open. Missing or unreadable files open as an empty buffer.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Write diagnostics to this file (filter with NIB_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

// ─── Key translation ────────────────────────────────────────────────────────

/// Map a terminal key event onto the keys the editor understands.
///
/// ESC followed quickly by a key arrives from the parser as Alt+key. For a
/// modal editor that is a user leaving Insert mode and typing on, so it
/// becomes Escape then the key. Ctrl chords and keys the editor has no use
/// for produce nothing.
fn translate(event: KeyEvent) -> impl Iterator<Item = Key> {
    let escape = event
        .modifiers
        .contains(Modifiers::ALT)
        .then_some(Key::Escape);
    let modifiers = event.modifiers - Modifiers::ALT;

    let key = match event.code {
        _ if modifiers.contains(Modifiers::CTRL) => None,
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(ch) => Some(Key::Char(ch)),
        KeyCode::Tab if modifiers.is_empty() => Some(Key::Tab),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        _ => None,
    };

    escape.into_iter().chain(key)
}

const fn terminal_shape(shape: EditorCursorShape) -> CursorShape {
    match shape {
        EditorCursorShape::Block => CursorShape::Block,
        EditorCursorShape::Bar => CursorShape::Bar,
    }
}

// ─── App ────────────────────────────────────────────────────────────────────

struct NibApp<S: FileStore = DiskStore> {
    editor: Editor<S>,
    /// Where the last paint put the cursor.
    cursor_screen: Option<(u16, u16)>,
}

impl<S: FileStore> NibApp<S> {
    const fn new(editor: Editor<S>) -> Self {
        Self {
            editor,
            cursor_screen: None,
        }
    }
}

impl<S: FileStore> App for NibApp<S> {
    fn on_key(&mut self, event: KeyEvent) -> Action {
        for key in translate(event) {
            if self.editor.handle_key(key) == Action::Quit {
                return Action::Quit;
            }
        }
        Action::Continue
    }

    fn on_resize(&mut self, size: Size) {
        tracing::debug!(cols = size.cols, rows = size.rows, "resize");
        self.editor.resize(size.rows);
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        self.cursor_screen = self.editor.render(frame);
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        let (x, y) = self.cursor_screen?;
        Some((x, y, terminal_shape(self.editor.mode().cursor_shape())))
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send `tracing` output to `path` through a background writer. Log lines
/// are flushed when the returned guard drops.
fn init_logging(path: &Path) -> Result<WorkerGuard> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to install log subscriber")?;

    install_panic_logging();
    Ok(guard)
}

/// Log panics before the default hook prints them. The terminal installs
/// its own restore hook in front of this one when it enters raw mode.
fn install_panic_logging() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "panicked");
        previous(info);
    }));
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(args: &Args) -> Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        file = ?args.file,
        "starting"
    );

    let mut app = NibApp::new(Editor::from_disk(args.file.as_deref()));
    EventLoop::new()
        .run(&mut app)
        .context("terminal session failed")?;

    tracing::info!("exiting");
    Ok(())
}

fn main() {
    let args = Args::parse();

    let guard = match args.log_file.as_deref().map(init_logging).transpose() {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("nib: {err:#}");
            process::exit(1);
        }
    };

    let result = run(&args);
    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "fatal");
    }
    // process::exit skips destructors; flush the log first.
    drop(guard);

    if let Err(err) = result {
        eprintln!("nib: {err:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
