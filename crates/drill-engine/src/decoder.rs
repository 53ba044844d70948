//! Keystroke decoding over a raw byte stream.
//!
//! Terminals in raw mode deliver more than keystrokes: arrow keys and
//! function keys arrive as multi-byte escape sequences, and mouse chatter
//! shows up as escape bursts and stray control bytes. The decoder reads one
//! byte at a time and absorbs all of that, handing back only the keys the
//! command set knows.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::SessionResult;
use crate::models::Key;
use crate::source::ByteSource;

/// Escape sequences get this many drain passes. Function keys and mouse
/// reports can arrive as split bursts that straddle one quiet window.
const ESCAPE_DRAIN_PASSES: u32 = 3;

/// Quiet windows used while absorbing noise.
///
/// Defaults suit an interactive terminal; tests shrink them so noise
/// scenarios run in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainTimings {
    /// Window that ends one escape-drain pass.
    pub escape: Duration,
    /// Window after a stray control byte.
    pub control: Duration,
}

impl Default for DrainTimings {
    fn default() -> Self {
        Self {
            escape: Duration::from_millis(150),
            control: Duration::from_millis(50),
        }
    }
}

/// Turns raw bytes into accepted keys.
///
/// An escape byte starts an escape drain: [`ESCAPE_DRAIN_PASSES`] passes,
/// each discarding bytes until one quiet window elapses with nothing
/// pending. Any other control byte gets a single shorter drain. Both
/// resolve to "no key"; so does any byte outside the command set.
pub struct KeyDecoder<S> {
    source: S,
    timings: DrainTimings,
}

impl<S: ByteSource> KeyDecoder<S> {
    /// Decoder with production drain windows.
    pub fn new(source: S) -> Self {
        Self::with_timings(source, DrainTimings::default())
    }

    /// Decoder with explicit drain windows.
    pub fn with_timings(source: S, timings: DrainTimings) -> Self {
        Self { source, timings }
    }

    /// Read the next accepted key, blocking until one byte arrives.
    ///
    /// `Ok(None)` means a burst of noise was absorbed; callers loop. The
    /// only failures are the source closing or an I/O error.
    pub fn next_key(&mut self) -> SessionResult<Option<Key>> {
        let byte = self.source.next_byte()?;
        self.decode(byte)
    }

    /// Like [`KeyDecoder::next_key`], but gives up once `deadline` passes
    /// while waiting for the first byte. A drain still runs to completion
    /// once a byte has arrived.
    pub fn next_key_before(&mut self, deadline: Instant) -> SessionResult<Option<Key>> {
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            return Ok(None);
        };
        let Some(byte) = self.source.poll_byte(remaining)? else {
            return Ok(None);
        };
        self.decode(byte)
    }

    /// Throw away bytes buffered before a session starts.
    pub fn discard_pending(&mut self) {
        self.source.discard_pending();
    }

    fn decode(&mut self, byte: u8) -> SessionResult<Option<Key>> {
        if byte == 0x1b {
            self.drain_escape()?;
            return Ok(None);
        }
        if byte < 0x20 {
            self.drain_control()?;
            return Ok(None);
        }
        match classify(byte) {
            Some(key) => {
                trace!(byte, ?key, "accepted key");
                Ok(Some(key))
            }
            None => {
                trace!(byte, "ignored byte");
                Ok(None)
            }
        }
    }

    fn drain_escape(&mut self) -> SessionResult<()> {
        let mut discarded = 0usize;
        for _ in 0..ESCAPE_DRAIN_PASSES {
            while self.source.poll_byte(self.timings.escape)?.is_some() {
                discarded += 1;
            }
        }
        trace!(discarded, "drained escape sequence");
        Ok(())
    }

    fn drain_control(&mut self) -> SessionResult<()> {
        let mut discarded = 0usize;
        while self.source.poll_byte(self.timings.control)?.is_some() {
            discarded += 1;
        }
        trace!(discarded, "drained control bytes");
        Ok(())
    }
}

/// The command set: space, digits, and the letters the screens bind, in
/// either case. Everything else is noise.
fn classify(byte: u8) -> Option<Key> {
    match byte {
        b' ' => Some(Key::Space),
        b'0'..=b'9' => Some(Key::Digit(byte - b'0')),
        b'q' | b'Q' | b'x' | b'X' | b'p' | b'P' | b'd' | b'D' | b'w' | b'W' | b'm' | b'M'
        | b's' | b'S' | b'u' | b'U' | b'i' | b'I' | b't' | b'T' | b'b' | b'B' | b'h' | b'H' => {
            Some(Key::Letter(byte as char))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::script::ScriptedBytes;

    fn fast() -> DrainTimings {
        DrainTimings {
            escape: Duration::from_millis(10),
            control: Duration::from_millis(5),
        }
    }

    fn decoder(script: ScriptedBytes) -> KeyDecoder<ScriptedBytes> {
        KeyDecoder::with_timings(script, fast())
    }

    #[test]
    fn test_plain_keys_pass_through() {
        let script = ScriptedBytes::new().text("q X7 b");
        let mut dec = decoder(script);
        assert_eq!(dec.next_key().unwrap(), Some(Key::Letter('q')));
        assert_eq!(dec.next_key().unwrap(), Some(Key::Space));
        assert_eq!(dec.next_key().unwrap(), Some(Key::Letter('X')));
        assert_eq!(dec.next_key().unwrap(), Some(Key::Digit(7)));
        assert_eq!(dec.next_key().unwrap(), Some(Key::Space));
        assert_eq!(dec.next_key().unwrap(), Some(Key::Letter('b')));
    }

    #[test]
    fn test_unbound_characters_are_absorbed() {
        let script = ScriptedBytes::new().text("zq");
        let mut dec = decoder(script);
        assert_eq!(dec.next_key().unwrap(), None);
        assert_eq!(dec.next_key().unwrap(), Some(Key::Letter('q')));
    }

    #[test]
    fn test_arrow_key_is_swallowed_whole() {
        // Up arrow: ESC [ A, then a real keystroke.
        let script = ScriptedBytes::new()
            .byte(0x1b)
            .byte(b'[')
            .byte(b'A')
            .delay(60)
            .byte(b' ');
        let mut dec = decoder(script);
        assert_eq!(dec.next_key().unwrap(), None);
        assert_eq!(dec.next_key().unwrap(), Some(Key::Space));
    }

    #[test]
    fn test_split_escape_burst_does_not_leak() {
        // A mouse report broken by a pause longer than one quiet window is
        // caught by the second drain pass.
        let script = ScriptedBytes::new()
            .byte(0x1b)
            .byte(b'[')
            .byte(b'M')
            .delay(15)
            .byte(b'!')
            .byte(b'5')
            .byte(b'7')
            .delay(60)
            .byte(b'q');
        let mut dec = decoder(script);
        assert_eq!(dec.next_key().unwrap(), None);
        assert_eq!(dec.next_key().unwrap(), Some(Key::Letter('q')));
    }

    #[test]
    fn test_control_byte_drains_followers() {
        // A carriage return plus trailing junk is one unit of noise.
        let script = ScriptedBytes::new()
            .byte(0x0d)
            .byte(b'~')
            .delay(30)
            .byte(b'm');
        let mut dec = decoder(script);
        assert_eq!(dec.next_key().unwrap(), None);
        assert_eq!(dec.next_key().unwrap(), Some(Key::Letter('m')));
    }

    #[test]
    fn test_closed_source_reports_input_closed() {
        let mut dec = decoder(ScriptedBytes::new());
        assert!(matches!(dec.next_key(), Err(SessionError::InputClosed)));
    }

    #[test]
    fn test_trailing_escape_at_end_of_input() {
        // The drain finds nothing after the escape; the escape itself is
        // still just noise, and only the following read hits the closure.
        let script = ScriptedBytes::new().byte(0x1b);
        let mut dec = decoder(script);
        assert_eq!(dec.next_key().unwrap(), None);
        assert!(matches!(dec.next_key(), Err(SessionError::InputClosed)));
    }

    #[test]
    fn test_deadline_read_gives_up_quietly() {
        let script = ScriptedBytes::new().delay(200).byte(b'q');
        let mut dec = decoder(script);
        let deadline = Instant::now() + Duration::from_millis(20);
        assert_eq!(dec.next_key_before(deadline).unwrap(), None);
        assert_eq!(dec.next_key_before(deadline).unwrap(), None);
    }
}
