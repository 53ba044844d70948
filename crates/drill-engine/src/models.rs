//! Data models shared across the drill engine.

use serde::{Deserialize, Serialize};

/// A single drillable card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Prompt side, shown first. Also the card's identity: the scheduler
    /// and the mistake filter treat entries with the same front as the
    /// same card.
    pub front: String,
    /// Answer side, revealed on request.
    pub back: String,
    /// Lesson group. Group numbers start at 1; 0 is reserved to mean
    /// "all groups" when selecting a session.
    pub group: u32,
    /// Free-form annotation shown alongside the prompt.
    pub tag: String,
}

impl Item {
    /// Create a card.
    pub fn new(
        front: impl Into<String>,
        back: impl Into<String>,
        group: u32,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            group,
            tag: tag.into(),
        }
    }
}

/// A card in flight through a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// The card to show.
    pub item: Item,
    /// Correct answers still owed after this one. 0 means the card retires
    /// on a correct answer.
    pub required_streak: u32,
}

/// An accepted keystroke after noise filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    /// `0`-`9`.
    Digit(u8),
    /// One of the command letters, case preserved.
    Letter(char),
}

/// Which screen a key was read for. Decides what the key means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Menu,
    PracticeMenu,
    QuizQuestion,
    QuizAnswer,
    PracticeQuestion,
    PracticeAnswer,
}

/// Everything a key can mean, across all screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the answer side.
    Reveal,
    /// Judge the current card as known.
    Correct,
    /// Judge the current card as missed.
    Incorrect,
    /// Move to the next practice card.
    Advance,
    /// Step back one card, or leave a submenu.
    Back,
    /// The full quit phrase was typed.
    Quit,
    /// Start a session over group n (0 = all groups).
    SelectGroup(u8),
    /// Open the practice chooser.
    Practice,
    /// Start a session over recent mistakes.
    MistakeReview(MistakeWindow),
    /// An accepted key with no meaning on this screen.
    Unrecognized,
}

/// How far back the mistake filter looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MistakeWindow {
    /// The last 24 hours.
    Day,
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
    /// No cutoff.
    All,
}

/// The filter a session runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Group(u32),
    Mistakes(MistakeWindow),
}

/// Map an accepted key to its command under `ctx`.
///
/// `q` never reaches this function; the command reader intercepts it for
/// quit-phrase confirmation.
pub fn interpret(key: Key, ctx: KeyContext) -> Command {
    match ctx {
        KeyContext::Menu => match key {
            Key::Digit(n) => Command::SelectGroup(n),
            Key::Letter(c) => match c.to_ascii_lowercase() {
                'p' => Command::Practice,
                'd' => Command::MistakeReview(MistakeWindow::Day),
                'w' => Command::MistakeReview(MistakeWindow::Week),
                'm' => Command::MistakeReview(MistakeWindow::Month),
                _ => Command::Unrecognized,
            },
            _ => Command::Unrecognized,
        },
        KeyContext::PracticeMenu => match key {
            Key::Digit(n) => Command::SelectGroup(n),
            Key::Letter(c) => match c.to_ascii_lowercase() {
                'd' => Command::MistakeReview(MistakeWindow::Day),
                'w' => Command::MistakeReview(MistakeWindow::Week),
                'm' => Command::MistakeReview(MistakeWindow::Month),
                'b' => Command::Back,
                _ => Command::Unrecognized,
            },
            _ => Command::Unrecognized,
        },
        KeyContext::QuizQuestion => match key {
            Key::Space => Command::Reveal,
            _ => Command::Unrecognized,
        },
        KeyContext::QuizAnswer => match key {
            Key::Space => Command::Correct,
            Key::Letter(c) if c.to_ascii_lowercase() == 'x' => Command::Incorrect,
            _ => Command::Unrecognized,
        },
        KeyContext::PracticeQuestion => match key {
            Key::Space => Command::Reveal,
            Key::Letter(c) if c.to_ascii_lowercase() == 'b' => Command::Back,
            _ => Command::Unrecognized,
        },
        KeyContext::PracticeAnswer => match key {
            Key::Space => Command::Advance,
            Key::Letter(c) if c.to_ascii_lowercase() == 'b' => Command::Back,
            _ => Command::Unrecognized,
        },
    }
}
