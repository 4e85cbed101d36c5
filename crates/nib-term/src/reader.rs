// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// A dedicated thread polls stdin and forwards what it finds over a channel:
// raw byte chunks, terminal resizes, and the one read error that ends it.
// The event loop can then block on the channel alone and still wake up for
// both keys and resizes.
//
// Resizes arrive as SIGWINCH. The signal handler only sets an atomic flag;
// the reader thread checks it every time poll() returns (poll is
// interrupted by the signal, so the check happens right away) and turns it
// into an `Input::Resize` message.
//
// Shutdown: poll() runs with a short timeout and the thread checks a stop
// flag between polls, so `stop()` never waits on a blocking read().

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Bytes read per chunk. A keypress is a handful; a paste can be more.
const READ_BUF_SIZE: usize = 4096;

/// How often the thread re-checks its stop flag (milliseconds).
const POLL_TIMEOUT_MS: i32 = 50;

// ─── Input ──────────────────────────────────────────────────────────────────

/// What the reader thread sends.
#[derive(Debug)]
pub enum Input {
    /// Raw bytes from stdin, never empty.
    Bytes(Vec<u8>),
    /// The terminal was resized.
    Resize,
    /// Reading stdin failed. The thread exits after sending this.
    Failed(io::Error),
}

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install the SIGWINCH handler. Safe to call more than once.
#[cfg(unix)]
pub fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        // No SA_RESTART: poll() should return early with EINTR.
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
pub fn install_sigwinch_handler() {}

/// Consume a pending resize notification.
fn take_resize() -> bool {
    SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed)
}

// ─── StdinReader ─────────────────────────────────────────────────────────────

/// Handle to the reader thread. Dropping it stops the thread.
///
/// ```no_run
/// use nib_term::reader::{Input, StdinReader};
///
/// let (reader, rx) = StdinReader::spawn()?;
/// while let Ok(Input::Bytes(bytes)) = rx.recv() {
///     println!("got {} bytes", bytes.len());
/// }
/// drop(reader);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Start the thread.
    ///
    /// The channel closes when the thread exits: after [`stop`](Self::stop),
    /// at end of input, or after an [`Input::Failed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn() -> io::Result<(Self, Receiver<Input>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || reader_loop(&tx, &stop_flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Ask the thread to exit and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn reader_loop(tx: &Sender<Input>, stop: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let stdin_fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: stdin_fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
        };

        if take_resize() && tx.send(Input::Resize).is_err() {
            return;
        }

        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            let _ = tx.send(Input::Failed(err));
            return;
        }
        if ready == 0 {
            continue;
        }

        let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };
        match n {
            // End of input: closing the channel tells the loop.
            0 => return,
            n if n < 0 => {
                let err = io::Error::last_os_error();
                if matches!(
                    err.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                ) {
                    continue;
                }
                let _ = tx.send(Input::Failed(err));
                return;
            }
            #[allow(clippy::cast_sign_loss)]
            n => {
                if tx.send(Input::Bytes(buf[..n as usize].to_vec())).is_err() {
                    return;
                }
            }
        }
    }
}

/// Blocking fallback without poll(): stop only takes effect after the
/// next read returns.
#[cfg(not(unix))]
fn reader_loop(tx: &Sender<Input>, stop: &AtomicBool) {
    use std::io::Read;

    let stdin = io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(0) => return,
            Ok(n) => {
                if tx.send(Input::Bytes(buf[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                let _ = tx.send(Input::Failed(e));
                return;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
