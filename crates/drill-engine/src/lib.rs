//! # drill-engine
//!
//! Keystroke decoding and adaptive requeue scheduling for drill sessions.
//!
//! ## Features
//!
//! - Raw byte decoding with escape and control drains for noisy terminals
//! - Literal quit-phrase confirmation under a wall-clock deadline
//! - Adaptive requeue scheduling with randomized repeat delays
//! - Sequential practice cursor with guarded back navigation
//! - Scriptable byte sources for deterministic session tests

mod decoder;
mod error;
mod models;
mod practice;
mod quit;
mod scheduler;
mod script;
mod session;
mod source;

pub use decoder::{DrainTimings, KeyDecoder};
pub use error::{SessionError, SessionResult};
pub use models::{interpret, Command, Item, Key, KeyContext, MistakeWindow, QueueEntry, Selection};
pub use practice::PracticeNavigator;
pub use quit::QuitPhraseDetector;
pub use scheduler::RequeueScheduler;
pub use script::ScriptedBytes;
pub use session::{
    run_practice, run_quiz, CardContext, CardPresenter, CommandReader, PracticeOutcome,
    QuizOutcome, ResultSink,
};
pub use source::{ByteSource, TtyBytes};
