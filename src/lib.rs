//! Agent Session Export - Normalize coding-agent transcripts to NDJSON
//!
//! This library reads locally stored coding-assistant sessions from two
//! storage backends and re-emits them in one common newline-delimited JSON
//! shape, filtered by a time window and optionally by project path:
//!
//! - Claude Code: per-project directories holding a `sessions-index.json`
//!   manifest and per-session `.jsonl` transcript files
//! - OpenCode: either a SQLite `opencode.db` (session/message/part tables)
//!   or the legacy file layout (`session/`, `message/`, `part/` directories)
//!
//! # Example
//!
//! ```no_run
//! use agent_session_export::sources::{ClaudeSource, TimeRange, export_sessions};
//! use agent_session_export::utils::parse_iso_date;
//! use std::path::PathBuf;
//!
//! let range = TimeRange {
//!     from: parse_iso_date("2026-02-20")?,
//!     to: parse_iso_date("2026-02-21")?,
//! };
//! let mut source = ClaudeSource::new(PathBuf::from("/home/alice/.claude/projects"), None, range, false);
//! let mut out = Vec::new();
//! let emitted = export_sessions(&mut source, &mut out)?;
//! eprintln!("exported {} sessions", emitted);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod emit;
pub mod models;
pub mod parsers;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{NormalizedMessage, SessionRecord, ToolCall};
pub use sources::{SessionCandidate, SessionLocator, TimeRange, export_sessions};
pub use utils::paths::{decode_project_dir, encode_project_path};
