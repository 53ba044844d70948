//! Scripted byte sources for exercising sessions without a terminal.

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use crate::error::{SessionError, SessionResult};
use crate::source::ByteSource;

/// One step of a scripted input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Byte(u8),
    Quiet(Duration),
}

/// Deterministic [`ByteSource`] that replays a prepared byte stream.
///
/// Quiet gaps are honoured with real sleeps, so drain windows and the quit
/// phrase deadline behave exactly as they would against a terminal; tests
/// keep those windows small. An exhausted script closes the source: the
/// next blocking read reports [`SessionError::InputClosed`], while timed
/// reads sleep out their window and report nothing, like a silent terminal
/// would.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBytes {
    steps: VecDeque<Step>,
}

impl ScriptedBytes {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a single raw byte.
    pub fn byte(mut self, byte: u8) -> Self {
        self.steps.push_back(Step::Byte(byte));
        self
    }

    /// Queue every byte of `text`.
    pub fn text(mut self, text: &str) -> Self {
        for byte in text.bytes() {
            self.steps.push_back(Step::Byte(byte));
        }
        self
    }

    /// Queue a gap during which nothing arrives.
    pub fn delay(mut self, ms: u64) -> Self {
        self.steps.push_back(Step::Quiet(Duration::from_millis(ms)));
        self
    }
}

impl ByteSource for ScriptedBytes {
    fn next_byte(&mut self) -> SessionResult<u8> {
        loop {
            match self.steps.pop_front() {
                Some(Step::Byte(byte)) => return Ok(byte),
                Some(Step::Quiet(gap)) => thread::sleep(gap),
                None => return Err(SessionError::InputClosed),
            }
        }
    }

    fn poll_byte(&mut self, timeout: Duration) -> SessionResult<Option<u8>> {
        let mut budget = timeout;
        loop {
            match self.steps.pop_front() {
                Some(Step::Byte(byte)) => return Ok(Some(byte)),
                Some(Step::Quiet(gap)) if gap < budget => {
                    thread::sleep(gap);
                    budget -= gap;
                }
                Some(Step::Quiet(gap)) => {
                    let leftover = gap - budget;
                    if !leftover.is_zero() {
                        self.steps.push_front(Step::Quiet(leftover));
                    }
                    thread::sleep(budget);
                    return Ok(None);
                }
                None => {
                    thread::sleep(budget);
                    return Ok(None);
                }
            }
        }
    }
}
