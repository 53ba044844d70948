//! Screen rendering for vocab drill.

use drill_engine::{
    CardContext, CardPresenter, Item, PracticeOutcome, QuizOutcome, SessionResult,
};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::deck::Deck;

pub fn draw_menu(f: &mut Frame, deck: &Deck) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let header = Paragraph::new("Vocab Drill")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let groups = deck
        .groups()
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let lines = vec![
        Line::from(format!("{} cards loaded. Groups: {}", deck.len(), groups)),
        Line::from(""),
        Line::from(Span::styled(
            "Quiz",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  1-9  one group        0  every group"),
        Line::from("  d    mistakes from the last day"),
        Line::from("  w    mistakes from the last week"),
        Line::from("  m    mistakes from the last month"),
        Line::from(""),
        Line::from(Span::styled(
            "Practice",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  p    untimed walk through the cards"),
    ];
    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Menu "));
    f.render_widget(body, chunks[1]);

    let footer = Paragraph::new("Pick a session - type quit to leave")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

pub fn draw_practice_menu(f: &mut Frame, deck: &Deck) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let header = Paragraph::new("Practice")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let groups = deck
        .groups()
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let lines = vec![
        Line::from(format!("Groups: {groups}")),
        Line::from(""),
        Line::from("  1-9  one group        0  every group"),
        Line::from("  d    mistakes from the last day"),
        Line::from("  w    mistakes from the last week"),
        Line::from("  m    mistakes from the last month"),
        Line::from(""),
        Line::from("  b    back to the menu"),
    ];
    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Practice "));
    f.render_widget(body, chunks[1]);

    let footer = Paragraph::new("Pick a card set - type quit to leave")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_card(f: &mut Frame, item: &Item, revealed: bool, ctx: &CardContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let status = match ctx {
        CardContext::Quiz {
            correct,
            incorrect,
            remaining,
        } => format!("Correct: {correct}  Missed: {incorrect}  Remaining: {remaining}"),
        CardContext::Practice { current, total } => format!("Card {current} of {total}"),
    };
    let header = Paragraph::new(status)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    if revealed {
        let inner = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        f.render_widget(question_panel(item), inner[0]);

        let back = Paragraph::new(item.back.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Green))
            .block(Block::default().borders(Borders::ALL).title(" Answer "))
            .wrap(Wrap { trim: true });
        f.render_widget(back, inner[1]);
    } else {
        f.render_widget(question_panel(item), chunks[1]);
    }

    let hints = match (ctx, revealed) {
        (CardContext::Quiz { .. }, false) => "Space:Show answer",
        (CardContext::Quiz { .. }, true) => "Space:Correct  x:Missed",
        (CardContext::Practice { .. }, false) => "Space:Show answer  b:Back",
        (CardContext::Practice { .. }, true) => "Space:Next  b:Back",
    };
    let footer = Paragraph::new(format!("{hints}  (type quit to leave)"))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn question_panel(item: &Item) -> Paragraph<'_> {
    let mut lines = vec![Line::from(""), Line::from(item.front.as_str())];
    if !item.tag.is_empty() {
        lines.push(Line::from(Span::styled(
            item.tag.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Question "))
        .wrap(Wrap { trim: true })
}

pub fn draw_quiz_summary(f: &mut Frame, outcome: &QuizOutcome) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);

    let total = outcome.correct + outcome.incorrect;
    let percent = if total > 0 {
        outcome.correct * 100 / total
    } else {
        0
    };
    let color = if percent >= 80 {
        Color::Green
    } else if percent >= 60 {
        Color::Yellow
    } else {
        Color::Red
    };

    let title = if outcome.completed {
        " Quiz Complete "
    } else {
        " Quiz Stopped "
    };
    let lines = vec![
        Line::from(""),
        Line::from(format!(
            "Correct: {}   Missed: {}",
            outcome.correct, outcome.incorrect
        )),
        Line::from(Span::styled(
            format!("Score: {percent}%"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(popup, area);
}

pub fn draw_practice_summary(f: &mut Frame, outcome: &PracticeOutcome) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);

    let title = if outcome.completed {
        " Practice Complete "
    } else {
        " Practice Stopped "
    };
    let lines = vec![
        Line::from(""),
        Line::from(format!(
            "Cards viewed: {} of {}",
            outcome.viewed, outcome.total
        )),
        Line::from(format!(
            "Time: {}",
            format_elapsed(outcome.elapsed.as_secs())
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(popup, area);
}

pub fn draw_notice(f: &mut Frame, text: &str) {
    let area = centered_rect(60, 25, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(text, Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(popup, area);
}

/// Draws cards onto a borrowed terminal for the duration of one session.
pub struct TerminalPresenter<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
}

impl<'a, B: Backend> TerminalPresenter<'a, B> {
    pub fn new(terminal: &'a mut Terminal<B>) -> Self {
        Self { terminal }
    }
}

impl<B: Backend> CardPresenter for TerminalPresenter<'_, B> {
    fn show_card(&mut self, item: &Item, revealed: bool, ctx: &CardContext) -> SessionResult<()> {
        self.terminal.draw(|f| draw_card(f, item, revealed, ctx))?;
        Ok(())
    }
}

fn format_elapsed(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
