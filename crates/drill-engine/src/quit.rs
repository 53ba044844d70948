//! Confirmation of the typed quit phrase.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::decoder::KeyDecoder;
use crate::error::SessionResult;
use crate::models::Key;
use crate::source::ByteSource;

const PHRASE: &str = "quit";

/// Watches for the rest of the literal phrase `quit` after a leading `q`.
///
/// A lone `q` is not a command on any screen; only the full phrase, typed
/// within the window, exits. The deadline is computed once when
/// confirmation starts and checked on every iteration, so trickling keys
/// cannot stretch the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitPhraseDetector {
    window: Duration,
}

impl Default for QuitPhraseDetector {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(1),
        }
    }
}

impl QuitPhraseDetector {
    /// Detector with an explicit confirmation window.
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Decide whether the `q` that was just read starts the quit phrase.
    ///
    /// `Ok(true)` only when `u`, `i`, `t` follow in order before the
    /// deadline. A diverging key settles it as `Ok(false)` immediately; so
    /// does the deadline passing first. Keys consumed while deciding are
    /// dropped either way, noise is skipped without restarting the window.
    pub fn confirm<S: ByteSource>(&self, decoder: &mut KeyDecoder<S>) -> SessionResult<bool> {
        let deadline = Instant::now() + self.window;
        let mut buffer = String::from("q");
        while Instant::now() < deadline {
            let Some(key) = decoder.next_key_before(deadline)? else {
                continue;
            };
            match key {
                Key::Space => buffer.push(' '),
                Key::Digit(d) => buffer.push((b'0' + d) as char),
                Key::Letter(c) => buffer.push(c.to_ascii_lowercase()),
            }
            if buffer == PHRASE {
                debug!("quit phrase confirmed");
                return Ok(true);
            }
            if !PHRASE.starts_with(buffer.as_str()) {
                debug!(%buffer, "quit phrase diverged");
                return Ok(false);
            }
        }
        debug!(%buffer, "quit phrase window expired");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DrainTimings;
    use crate::script::ScriptedBytes;

    fn decoder(script: ScriptedBytes) -> KeyDecoder<ScriptedBytes> {
        let timings = DrainTimings {
            escape: Duration::from_millis(5),
            control: Duration::from_millis(5),
        };
        KeyDecoder::with_timings(script, timings)
    }

    fn detector() -> QuitPhraseDetector {
        QuitPhraseDetector::new(Duration::from_millis(80))
    }

    #[test]
    fn test_full_phrase_confirms() {
        let mut dec = decoder(ScriptedBytes::new().text("uit"));
        assert!(detector().confirm(&mut dec).unwrap());
    }

    #[test]
    fn test_upper_case_phrase_confirms() {
        let mut dec = decoder(ScriptedBytes::new().text("UIT"));
        assert!(detector().confirm(&mut dec).unwrap());
    }

    #[test]
    fn test_divergent_key_fails_fast() {
        let mut dec = decoder(ScriptedBytes::new().text("ux"));
        assert!(!detector().confirm(&mut dec).unwrap());
    }

    #[test]
    fn test_silence_times_out() {
        let mut dec = decoder(ScriptedBytes::new().delay(200).text("uit"));
        assert!(!detector().confirm(&mut dec).unwrap());
    }

    #[test]
    fn test_slow_finish_misses_the_deadline() {
        // First letters arrive in time, the last one does not.
        let mut dec = decoder(ScriptedBytes::new().text("ui").delay(200).text("t"));
        assert!(!detector().confirm(&mut dec).unwrap());
    }

    #[test]
    fn test_noise_between_letters_is_skipped() {
        // The pause after the arrow keeps its drain from eating the rest
        // of the phrase.
        let script = ScriptedBytes::new()
            .text("u")
            .byte(0x1b)
            .byte(b'[')
            .byte(b'B')
            .delay(25)
            .text("it");
        let mut dec = decoder(script);
        assert!(detector().confirm(&mut dec).unwrap());
    }

    #[test]
    fn test_end_of_input_counts_as_silence() {
        let mut dec = decoder(ScriptedBytes::new().text("ui"));
        assert!(!detector().confirm(&mut dec).unwrap());
    }
}
