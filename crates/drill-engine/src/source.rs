//! Raw byte acquisition for the key decoder.

use std::io::Read;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::error::{SessionError, SessionResult};

/// Supplies raw input bytes to the decoder.
///
/// Two read shapes: a blocking read for the next byte, and a timeout-bounded
/// read used while draining terminal noise and while waiting out the quit
/// phrase window.
pub trait ByteSource {
    /// Block until a byte arrives. Fails with [`SessionError::InputClosed`]
    /// when the source is exhausted.
    fn next_byte(&mut self) -> SessionResult<u8>;

    /// Wait up to `timeout` for a byte. `Ok(None)` means the window passed
    /// with nothing to read; an exhausted source also reports `Ok(None)`
    /// here so in-progress drains can finish before the closure surfaces.
    fn poll_byte(&mut self, timeout: Duration) -> SessionResult<Option<u8>>;

    /// Throw away anything already buffered. Called when a session starts
    /// so stale bytes (mouse chatter while a menu was up) cannot act on the
    /// first card.
    fn discard_pending(&mut self) {}
}

/// Byte source backed by a reader thread pumping a [`Read`] stream into a
/// channel.
///
/// Stdin has no portable timed read, so a detached thread does the blocking
/// reads and the session side uses `recv`/`recv_timeout`. The thread is
/// abandoned at process exit; its final blocking read may swallow one
/// trailing byte, which matches what a final blocking read on stdin would
/// have done anyway.
pub struct TtyBytes {
    rx: Receiver<u8>,
}

impl TtyBytes {
    /// Spawn the pump over any readable stream.
    pub fn new<R: Read + Send + 'static>(mut source: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = [0u8; 1];
            loop {
                match source.read(&mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(buf[0]).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(err) => {
                        trace!(%err, "byte pump read failed");
                        break;
                    }
                }
            }
            trace!("byte pump finished");
        });
        Self { rx }
    }

    /// Pump bytes from the process stdin.
    pub fn stdin() -> Self {
        Self::new(std::io::stdin())
    }
}

impl ByteSource for TtyBytes {
    fn next_byte(&mut self) -> SessionResult<u8> {
        self.rx.recv().map_err(|_| SessionError::InputClosed)
    }

    fn poll_byte(&mut self, timeout: Duration) -> SessionResult<Option<u8>> {
        match self.rx.recv_timeout(timeout) {
            Ok(byte) => Ok(Some(byte)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                // Keep the quiet-window timing honest even after EOF.
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }

    fn discard_pending(&mut self) {
        let mut dropped = 0usize;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            trace!(dropped, "discarded pending input");
        }
    }
}
