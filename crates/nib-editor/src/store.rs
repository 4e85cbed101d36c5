//! Where documents are loaded from and saved to.
//!
//! The editor reads and writes files through the [`FileStore`] trait instead
//! of calling `std::fs` directly. [`DiskStore`] is the real filesystem;
//! [`MemoryStore`] keeps files in a map so editing sessions can be driven
//! in tests without touching disk.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File access used by the editor.
pub trait FileStore {
    /// Read the whole file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Create or truncate `path` and write `contents` to it.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be written.
    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// DiskStore
// ---------------------------------------------------------------------------

/// The local filesystem. New files are created `rw-r--r--` on Unix.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        let mut file = options.open(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Files held in memory, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: HashMap<PathBuf, Vec<u8>>,
    read_only: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds one file.
    #[must_use]
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        let mut store = Self::new();
        store.files.insert(path.into(), contents.into());
        store
    }

    /// Make every write fail with `PermissionDenied`.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Contents of `path` as UTF-8, if it exists.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files
            .get(path.as_ref())
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: no such file", path.display()),
            )
        })
    }

    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: store is read-only", path.display()),
            ));
        }
        self.files.insert(path.to_path_buf(), contents.as_bytes().to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
