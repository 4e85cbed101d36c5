// SPDX-License-Identifier: MIT
//
// nib-term: the terminal side of the nib editor.
//
// Everything that touches the tty lives here: termios raw mode, the
// alternate screen, a byte-level key parser, a cell grid to paint into,
// and a differential renderer that only rewrites cells that changed.
// The editor core never sees a byte of ANSI: it paints cells into a
// `FrameBuffer`, and the event loop turns frames into terminal output.
//
// No TUI framework underneath. Escape sequences are written by hand and
// raw mode is entered through libc directly.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
