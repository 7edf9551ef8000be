//! Session locators for the supported storage backends.
//!
//! Each backend implements [`SessionLocator`]: enumerate candidates that
//! survive its exclusion and time-range rules, then assemble each surviving
//! candidate into a full [`SessionRecord`]. Downstream code (the export
//! driver, the emitter) depends only on the trait.
//!
//! The two backends apply the time window at different granularities on
//! purpose: the Claude index rejects on `created > to` / `modified < from`
//! (a session straddling the window survives), while OpenCode bounds
//! creation time on both sides - in SQL for the database backend. That
//! asymmetry matches each tool's own storage semantics and must not be
//! unified.

pub mod claude;
pub mod opencode_db;
pub mod opencode_files;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::emit::write_record;
use crate::models::SessionRecord;

pub use claude::ClaudeSource;
pub use opencode_db::{OpencodeDbSource, find_db_path};
pub use opencode_files::OpencodeFileSource;

/// Inclusive `[from, to]` time window for session selection.
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn from_ms(&self) -> i64 {
        self.from.timestamp_millis()
    }

    pub fn to_ms(&self) -> i64 {
        self.to.timestamp_millis()
    }

    /// Index-strategy admission rule: reject when created after the window
    /// or last modified before it; admit when neither instant is known.
    pub fn admits(&self, created: Option<DateTime<Utc>>, modified: Option<DateTime<Utc>>) -> bool {
        if let Some(created) = created {
            if created > self.to {
                return false;
            }
        }
        if let Some(modified) = modified {
            if modified < self.from {
                return false;
            }
        }
        true
    }

    /// Creation-time rule used by the OpenCode backends: two-sided
    /// inclusive bound in milliseconds.
    pub fn contains_millis(&self, ms: i64) -> bool {
        ms >= self.from_ms() && ms <= self.to_ms()
    }
}

/// A discovered session that passed the locator's filters, plus whatever
/// the backend needs to load its messages later.
#[derive(Debug, Clone)]
pub struct SessionCandidate {
    pub session_id: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    /// Best-effort project path; may be empty.
    pub project_path: String,
    /// Only set by the SQLite OpenCode backend, and only when non-empty.
    pub parent_id: Option<String>,
    pub handle: CandidateHandle,
}

/// Backend-specific handle carried from discovery to assembly.
#[derive(Debug, Clone)]
pub enum CandidateHandle {
    /// Claude Code: where the transcript lives plus the manifest fields
    /// used for title resolution.
    ClaudeTranscript {
        project_dir: PathBuf,
        first_prompt: String,
        summary: String,
        full_path: String,
    },
    /// OpenCode legacy file layout; messages and parts are keyed by id.
    OpencodeSessionFile { title: String },
    /// OpenCode database row.
    OpencodeRow { title: String },
}

/// The locator capability both adapters expose.
///
/// Candidates come back in emission order (project by project for the file
/// backends, ascending creation time for the database). `assemble` returns
/// `Ok(None)` for candidates that turn out to have no usable messages -
/// that is normal filtering, not an error.
pub trait SessionLocator {
    fn list_candidates(&mut self) -> Result<Vec<SessionCandidate>>;
    fn assemble(&mut self, candidate: &SessionCandidate) -> Result<Option<SessionRecord>>;
}

/// Drive a locator end to end: list, assemble, emit. Returns the number of
/// records written.
pub fn export_sessions(locator: &mut dyn SessionLocator, out: &mut dyn Write) -> Result<usize> {
    let mut emitted = 0;
    for candidate in locator.list_candidates()? {
        if let Some(record) = locator.assemble(&candidate)? {
            write_record(out, &record)?;
            emitted += 1;
        }
    }
    Ok(emitted)
}
