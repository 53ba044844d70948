//! Error types for drill sessions.

use std::io;
use thiserror::Error;

/// Conditions a running session cannot continue past.
///
/// Input noise is never an error; the decoder absorbs it and the session
/// simply asks for the next key.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The byte source reached end of input.
    #[error("input stream closed")]
    InputClosed,

    /// The byte source failed at the I/O level, or a screen could not be
    /// drawn.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A result sink rejected a write.
    #[error("failed to record result: {0}")]
    Record(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
