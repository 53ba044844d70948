//! Vocab Drill - flashcard quiz and practice drills in the terminal.

mod app;
mod config;
mod deck;
mod results;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use app::App;
use config::Config;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use drill_engine::{CommandReader, KeyDecoder, TtyBytes};
use ratatui::{backend::CrosstermBackend, Terminal};

fn main() -> anyhow::Result<()> {
    let config = Config::load();
    // First run: write the defaults out so the paths are easy to edit.
    if Config::config_path().is_some_and(|p| !p.exists()) {
        let _ = config.save();
    }
    init_tracing(&config);

    let deck_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.deck_path.clone());
    if !deck_path.exists() {
        anyhow::bail!(
            "deck file '{}' not found; pass a CSV path as the first argument \
             or set deck_path in the config",
            deck_path.display()
        );
    }
    let mut app = App::new(&config, &deck_path)?;

    // Raw mode without mouse capture: the decoder reads stdin bytes itself
    // and treats mouse chatter as noise.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut input = CommandReader::new(KeyDecoder::new(TtyBytes::stdin()));
    let result = app.run(&mut terminal, &mut input);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }

    Ok(())
}

/// Best-effort file logging, off unless the config turns it on. The file
/// gets appended to across runs, like a terminal session log.
fn init_tracing(config: &Config) {
    if !config.log.enabled {
        return;
    }
    let Some(path) = config.log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let level = config
        .log
        .level
        .parse()
        .unwrap_or(tracing::Level::DEBUG);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
