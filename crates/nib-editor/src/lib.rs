//! # nib-editor: editor core for nib
//!
//! Everything that decides what the editor does, independent of how keys
//! arrive or bytes reach the terminal:
//!
//! - **[`buffer`]**: `LineBuffer`, the document as a never-empty list of lines
//! - **[`cursor`]**: `CursorModel`, clamped movement and minimal scrolling
//! - **[`mode`]**: Normal, Insert and Command modes
//! - **[`command`]**: the `:` prompt and the `q` / `w` / `wq` commands
//! - **[`store`]**: the `FileStore` seam for loading and saving
//! - **[`view`]**: painting the viewport and status row into a frame
//! - **[`editor`]**: the `Editor` aggregate and its key dispatch
//! - **[`key`]**: the keys the core reacts to

pub mod buffer;
pub mod command;
pub mod cursor;
pub mod editor;
pub mod key;
pub mod mode;
pub mod store;
pub mod view;

pub use buffer::{BufferError, LineBuffer};
pub use editor::Editor;
pub use key::Key;
pub use mode::Mode;
