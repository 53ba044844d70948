//! Quiz and practice session loops over decoded commands.

use std::time::{Duration, Instant};

use chrono::Local;
use rand::Rng;
use tracing::debug;

use crate::decoder::KeyDecoder;
use crate::error::SessionResult;
use crate::models::{interpret, Command, Item, Key, KeyContext, Selection};
use crate::practice::PracticeNavigator;
use crate::quit::QuitPhraseDetector;
use crate::scheduler::RequeueScheduler;
use crate::source::ByteSource;

/// Turns decoded keys into commands for one screen at a time.
///
/// `q` is intercepted before interpretation: the reader hands the decoder
/// to the quit-phrase detector, and either reports `Quit` or swallows the
/// probe and reports `Unrecognized` so the caller redraws and waits again.
pub struct CommandReader<S> {
    decoder: KeyDecoder<S>,
    quit: QuitPhraseDetector,
}

impl<S: ByteSource> CommandReader<S> {
    /// Wrap a decoder, confirming quits within the default window.
    pub fn new(decoder: KeyDecoder<S>) -> Self {
        Self::with_detector(decoder, QuitPhraseDetector::default())
    }

    /// Wrap a decoder with an explicit quit-phrase detector.
    pub fn with_detector(decoder: KeyDecoder<S>, quit: QuitPhraseDetector) -> Self {
        Self { decoder, quit }
    }

    /// Read the next command for `ctx`, blocking until a key arrives.
    ///
    /// Noise bytes are skipped here; an accepted key that means nothing on
    /// this screen still comes back as `Unrecognized`.
    pub fn next(&mut self, ctx: KeyContext) -> SessionResult<Command> {
        loop {
            let Some(key) = self.decoder.next_key()? else {
                continue;
            };
            if matches!(key, Key::Letter('q' | 'Q')) {
                return if self.quit.confirm(&mut self.decoder)? {
                    Ok(Command::Quit)
                } else {
                    Ok(Command::Unrecognized)
                };
            }
            return Ok(interpret(key, ctx));
        }
    }

    /// Block until any accepted key is pressed.
    pub fn wait_any_key(&mut self) -> SessionResult<()> {
        while self.decoder.next_key()?.is_none() {}
        Ok(())
    }

    /// Throw away any type-ahead buffered before a session starts.
    pub fn discard_pending(&mut self) {
        self.decoder.discard_pending();
    }
}

/// Counters shown alongside a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardContext {
    Quiz {
        correct: u32,
        incorrect: u32,
        /// Cards left in the queue, counting the one on screen.
        remaining: usize,
    },
    Practice {
        /// One-based number of the card on screen.
        current: usize,
        total: usize,
    },
}

/// Where judged answers and practice durations go.
pub trait ResultSink {
    fn record_answer(
        &mut self,
        item: &Item,
        correct: bool,
        session_id: &str,
        selection: Selection,
    ) -> SessionResult<()>;

    fn record_practice(
        &mut self,
        session_id: &str,
        elapsed: Duration,
        selection: Selection,
    ) -> SessionResult<()>;
}

/// Renders one card, question side or revealed.
pub trait CardPresenter {
    fn show_card(&mut self, item: &Item, revealed: bool, ctx: &CardContext) -> SessionResult<()>;
}

/// How a quiz ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub correct: u32,
    pub incorrect: u32,
    /// False when the player quit before the deck retired.
    pub completed: bool,
}

/// How a practice run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeOutcome {
    /// Cards whose answer side was reached.
    pub viewed: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub completed: bool,
}

struct SessionState {
    session_id: String,
    correct: u32,
    incorrect: u32,
}

impl SessionState {
    fn begin() -> Self {
        Self {
            session_id: new_session_id(),
            correct: 0,
            incorrect: 0,
        }
    }
}

fn new_session_id() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Drive a quiz to retirement or quit.
///
/// Every judged card is pushed to the sink before the scheduler hears the
/// verdict; quitting mid-card records nothing for that card. Sink failures
/// abort the run without touching queue state already settled.
pub fn run_quiz<S, R, K, P>(
    input: &mut CommandReader<S>,
    scheduler: &mut RequeueScheduler<R>,
    sink: &mut K,
    presenter: &mut P,
    selection: Selection,
) -> SessionResult<QuizOutcome>
where
    S: ByteSource,
    R: Rng,
    K: ResultSink,
    P: CardPresenter,
{
    input.discard_pending();
    let mut state = SessionState::begin();
    debug!(session_id = %state.session_id, "quiz started");

    let completed = 'session: loop {
        let Some(entry) = scheduler.next_entry() else {
            break true;
        };
        let ctx = CardContext::Quiz {
            correct: state.correct,
            incorrect: state.incorrect,
            remaining: scheduler.queue_len() + 1,
        };

        presenter.show_card(&entry.item, false, &ctx)?;
        loop {
            match input.next(KeyContext::QuizQuestion)? {
                Command::Reveal => break,
                Command::Quit => break 'session false,
                _ => {}
            }
        }

        presenter.show_card(&entry.item, true, &ctx)?;
        let judged = loop {
            match input.next(KeyContext::QuizAnswer)? {
                Command::Correct => break Some(true),
                Command::Incorrect => break Some(false),
                Command::Quit => break None,
                _ => {}
            }
        };
        let Some(correct) = judged else {
            break 'session false;
        };

        if correct {
            state.correct += 1;
            sink.record_answer(&entry.item, true, &state.session_id, selection)?;
            scheduler.mark_correct(entry);
        } else {
            state.incorrect += 1;
            sink.record_answer(&entry.item, false, &state.session_id, selection)?;
            scheduler.mark_incorrect(entry);
        }
    };

    debug!(
        correct = state.correct,
        incorrect = state.incorrect,
        completed,
        "quiz finished"
    );
    Ok(QuizOutcome {
        correct: state.correct,
        incorrect: state.incorrect,
        completed,
    })
}

/// Drive a practice walk to the end of the deck or quit.
///
/// No per-card results are written; the sink gets exactly one elapsed
/// duration on every exit path.
pub fn run_practice<S, K, P>(
    input: &mut CommandReader<S>,
    nav: &mut PracticeNavigator,
    sink: &mut K,
    presenter: &mut P,
    selection: Selection,
) -> SessionResult<PracticeOutcome>
where
    S: ByteSource,
    K: ResultSink,
    P: CardPresenter,
{
    input.discard_pending();
    let session_id = new_session_id();
    let started = Instant::now();
    debug!(session_id = %session_id, total = nav.total(), "practice started");

    let (completed, viewed) = 'walk: loop {
        let Some(item) = nav.current().cloned() else {
            break (true, nav.total());
        };
        let ctx = CardContext::Practice {
            current: nav.current_number(),
            total: nav.total(),
        };

        presenter.show_card(&item, false, &ctx)?;
        loop {
            match input.next(KeyContext::PracticeQuestion)? {
                Command::Reveal => break,
                Command::Back => {
                    if nav.back() {
                        continue 'walk;
                    }
                }
                Command::Quit => break 'walk (false, nav.cursor()),
                _ => {}
            }
        }

        presenter.show_card(&item, true, &ctx)?;
        loop {
            match input.next(KeyContext::PracticeAnswer)? {
                Command::Advance => {
                    nav.advance();
                    continue 'walk;
                }
                Command::Back => {
                    if nav.back() {
                        continue 'walk;
                    }
                }
                Command::Quit => break 'walk (false, nav.cursor() + 1),
                _ => {}
            }
        }
    };

    let elapsed = started.elapsed();
    sink.record_practice(&session_id, elapsed, selection)?;
    debug!(viewed, total = nav.total(), completed, "practice finished");
    Ok(PracticeOutcome {
        viewed,
        total: nav.total(),
        elapsed,
        completed,
    })
}
