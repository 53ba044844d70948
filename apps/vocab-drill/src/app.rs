//! Menu flow and session orchestration.

use std::path::Path;

use anyhow::Context;
use drill_engine::{
    run_practice, run_quiz, ByteSource, Command, CommandReader, Item, KeyContext, MistakeWindow,
    PracticeNavigator, RequeueScheduler, Selection,
};
use rand::thread_rng;
use ratatui::{backend::Backend, Terminal};
use tracing::info;

use crate::config::Config;
use crate::deck::Deck;
use crate::results::ResultLog;
use crate::ui;

pub struct App {
    deck: Deck,
    results: ResultLog,
}

impl App {
    pub fn new(config: &Config, deck_path: &Path) -> anyhow::Result<Self> {
        let deck = Deck::load(deck_path)
            .with_context(|| format!("loading deck from {}", deck_path.display()))?;
        info!(cards = deck.len(), path = %deck_path.display(), "deck loaded");
        Ok(Self {
            deck,
            results: ResultLog::new(config.results_path()),
        })
    }

    /// Main menu loop. Returns when the quit phrase is typed at a menu.
    pub fn run<B: Backend, S: ByteSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        input: &mut CommandReader<S>,
    ) -> anyhow::Result<()> {
        loop {
            terminal.draw(|f| ui::draw_menu(f, &self.deck))?;
            match input.next(KeyContext::Menu)? {
                Command::Quit => break,
                Command::SelectGroup(n) => match self.group_selection(n) {
                    Some(selection) => self.quiz(terminal, input, selection)?,
                    None => {
                        self.notice(terminal, input, &format!("No cards in group {n}."))?;
                    }
                },
                Command::MistakeReview(window) => {
                    self.quiz(terminal, input, Selection::Mistakes(window))?;
                }
                Command::Practice => {
                    if self.practice_menu(terminal, input)? {
                        break;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Practice chooser. `Ok(true)` means the quit phrase was typed here
    /// and the whole program should exit.
    fn practice_menu<B: Backend, S: ByteSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        input: &mut CommandReader<S>,
    ) -> anyhow::Result<bool> {
        loop {
            terminal.draw(|f| ui::draw_practice_menu(f, &self.deck))?;
            match input.next(KeyContext::PracticeMenu)? {
                Command::Quit => return Ok(true),
                Command::Back => return Ok(false),
                Command::SelectGroup(n) => match self.group_selection(n) {
                    Some(selection) => {
                        self.practice(terminal, input, selection)?;
                        return Ok(false);
                    }
                    None => {
                        self.notice(terminal, input, &format!("No cards in group {n}."))?;
                    }
                },
                Command::MistakeReview(window) => {
                    self.practice(terminal, input, Selection::Mistakes(window))?;
                    return Ok(false);
                }
                _ => {}
            }
        }
    }

    fn quiz<B: Backend, S: ByteSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        input: &mut CommandReader<S>,
        selection: Selection,
    ) -> anyhow::Result<()> {
        let items = self.items_for(selection)?;
        if items.is_empty() {
            let text = match selection {
                Selection::Mistakes(_) => {
                    "No mistakes recorded for that period. Quiz a group to build history."
                }
                _ => "No cards to quiz.",
            };
            return self.notice(terminal, input, text);
        }

        let mut scheduler = RequeueScheduler::new(items, thread_rng());
        let outcome = {
            let mut presenter = ui::TerminalPresenter::new(terminal);
            run_quiz(
                input,
                &mut scheduler,
                &mut self.results,
                &mut presenter,
                selection,
            )?
        };

        terminal.draw(|f| ui::draw_quiz_summary(f, &outcome))?;
        input.wait_any_key()?;
        Ok(())
    }

    fn practice<B: Backend, S: ByteSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        input: &mut CommandReader<S>,
        selection: Selection,
    ) -> anyhow::Result<()> {
        let items = self.items_for(selection)?;
        if items.is_empty() {
            let text = match selection {
                Selection::Mistakes(_) => {
                    "No mistakes recorded for that period. Practice pulls from quiz results."
                }
                _ => "No cards to practice.",
            };
            return self.notice(terminal, input, text);
        }

        let mut nav = PracticeNavigator::new(items);
        let outcome = {
            let mut presenter = ui::TerminalPresenter::new(terminal);
            run_practice(
                input,
                &mut nav,
                &mut self.results,
                &mut presenter,
                selection,
            )?
        };

        terminal.draw(|f| ui::draw_practice_summary(f, &outcome))?;
        input.wait_any_key()?;
        Ok(())
    }

    fn notice<B: Backend, S: ByteSource>(
        &self,
        terminal: &mut Terminal<B>,
        input: &mut CommandReader<S>,
        text: &str,
    ) -> anyhow::Result<()> {
        terminal.draw(|f| ui::draw_notice(f, text))?;
        input.wait_any_key()?;
        Ok(())
    }

    fn items_for(&self, selection: Selection) -> anyhow::Result<Vec<Item>> {
        let items = match selection {
            Selection::All => self.deck.all(),
            Selection::Group(n) => self.deck.group(n),
            Selection::Mistakes(window) => {
                let fronts = self
                    .results
                    .mistake_fronts(window)
                    .context("reading the result log")?;
                self.deck.with_fronts(&fronts)
            }
        };
        Ok(items)
    }

    /// 0 selects the whole deck; a digit selects its group when the deck
    /// has one.
    fn group_selection(&self, n: u8) -> Option<Selection> {
        if n == 0 {
            Some(Selection::All)
        } else if self.deck.groups().contains(&u32::from(n)) {
            Some(Selection::Group(u32::from(n)))
        } else {
            None
        }
    }
}
