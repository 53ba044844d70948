//! Append-only result log shared by quiz and practice sessions.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use drill_engine::{Item, MistakeWindow, ResultSink, Selection, SessionError, SessionResult};
use thiserror::Error;
use tracing::trace;

const HEADER: [&str; 6] = ["timestamp", "session_id", "front", "back", "group", "correct"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One CSV file holding every judged answer and practice marker.
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one judged answer.
    pub fn append_answer(
        &self,
        item: &Item,
        correct: bool,
        session_id: &str,
    ) -> Result<(), LogError> {
        let mut writer = self.open_for_append()?;
        writer.write_record([
            Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string(),
            session_id.to_string(),
            item.front.clone(),
            item.back.clone(),
            item.group.to_string(),
            if correct { "yes" } else { "no" }.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    /// Append start and end markers for a practice run.
    ///
    /// The start row is back-dated by `elapsed` so the pair brackets the
    /// session; the session id is prefixed to keep practice rows apart
    /// from quiz rows.
    pub fn append_practice(
        &self,
        session_id: &str,
        elapsed: Duration,
        selection: Selection,
    ) -> Result<(), LogError> {
        let group_code = match selection {
            Selection::Group(n) => n,
            Selection::All | Selection::Mistakes(_) => 0,
        };
        let now = Local::now().naive_local();
        let span = ChronoDuration::from_std(elapsed).unwrap_or_else(|_| ChronoDuration::zero());
        let session = format!("practice_{session_id}");

        let mut writer = self.open_for_append()?;
        writer.write_record([
            (now - span).format(TIMESTAMP_FORMAT).to_string(),
            session.clone(),
            "_practice_start_".to_string(),
            "_practice_".to_string(),
            group_code.to_string(),
            "practice".to_string(),
        ])?;
        writer.write_record([
            now.format(TIMESTAMP_FORMAT).to_string(),
            session,
            "_practice_end_".to_string(),
            "_practice_".to_string(),
            group_code.to_string(),
            "practice".to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    /// Fronts with at least one recorded miss inside `window`.
    ///
    /// Rows that fail to parse are skipped rather than failing the whole
    /// scan; the log may span app versions.
    pub fn mistake_fronts(&self, window: MistakeWindow) -> Result<HashSet<String>, LogError> {
        let mut fronts = HashSet::new();
        if !self.path.exists() {
            return Ok(fronts);
        }
        let cutoff = cutoff_for(window);
        let file = File::open(&self.path)?;
        let mut reader = csv::Reader::from_reader(file);
        for row in reader.records() {
            let record = row?;
            let (Some(stamp), Some(front), Some(correct)) =
                (record.get(0), record.get(2), record.get(5))
            else {
                continue;
            };
            if correct != "no" {
                continue;
            }
            let Ok(stamp) = NaiveDateTime::parse_from_str(stamp, PARSE_FORMAT) else {
                trace!(front, "skipping result row with unreadable timestamp");
                continue;
            };
            if let Some(cutoff) = cutoff {
                if stamp < cutoff {
                    continue;
                }
            }
            fronts.insert(front.to_string());
        }
        Ok(fronts)
    }

    fn open_for_append(&self) -> Result<csv::Writer<File>, LogError> {
        let new_file = !self.path.exists();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);
        if new_file {
            writer.write_record(HEADER)?;
        }
        Ok(writer)
    }
}

fn cutoff_for(window: MistakeWindow) -> Option<NaiveDateTime> {
    let now = Local::now().naive_local();
    match window {
        MistakeWindow::Day => Some(now - ChronoDuration::days(1)),
        MistakeWindow::Week => Some(now - ChronoDuration::weeks(1)),
        MistakeWindow::Month => Some(now - ChronoDuration::days(30)),
        MistakeWindow::All => None,
    }
}

impl ResultSink for ResultLog {
    fn record_answer(
        &mut self,
        item: &Item,
        correct: bool,
        session_id: &str,
        _selection: Selection,
    ) -> SessionResult<()> {
        self.append_answer(item, correct, session_id)
            .map_err(|e| SessionError::Record(e.to_string()))
    }

    fn record_practice(
        &mut self,
        session_id: &str,
        elapsed: Duration,
        selection: Selection,
    ) -> SessionResult<()> {
        self.append_practice(session_id, elapsed, selection)
            .map_err(|e| SessionError::Record(e.to_string()))
    }
}
