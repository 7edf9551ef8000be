use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::de::DeserializeOwned;

use crate::models::{NormalizedMessage, Part, SessionFile, SessionRecord};
use crate::parsers::process_parts;
use crate::utils::{debug_log, json_millis, ms_to_iso};

use super::{CandidateHandle, SessionCandidate, SessionLocator, TimeRange};

/// Locator for OpenCode's legacy file storage.
///
/// Layout under the storage directory:
///
/// ```text
/// session/<project_hash>/ses_*.json      session metadata
/// message/<session_id>/msg_*.json        message metadata
/// part/<message_id>/prt_*.json           message content
/// ```
///
/// Sessions are filtered on `time.created` (two-sided, inclusive); a file
/// with a missing or non-numeric creation time is warned about and skipped
/// rather than silently included.
pub struct OpencodeFileSource {
    storage_dir: PathBuf,
    hash_filter: Option<String>,
    path_filter: Option<String>,
    range: TimeRange,
    verbose: bool,
}

/// Read and parse one JSON storage file, warning and returning `None` on
/// any failure. One bad file never aborts the export.
fn load_json_file<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Cannot read file: {} ({})", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            eprintln!("Corrupt JSON file: {} ({})", path.display(), e);
            None
        }
    }
}

/// Files directly under `dir` whose names match `<prefix>*.json`, in name
/// order. A missing directory is an empty result, not an error.
fn list_json_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(prefix) && name.ends_with(".json"))
        })
        .collect();
    files.sort();
    files
}

impl OpencodeFileSource {
    pub fn new(
        storage_dir: PathBuf,
        hash_filter: Option<String>,
        path_filter: Option<String>,
        range: TimeRange,
        verbose: bool,
    ) -> Self {
        Self { storage_dir, hash_filter, path_filter, range, verbose }
    }

    fn discover_project_hashes(&self) -> Vec<String> {
        let session_base = self.storage_dir.join("session");
        if !session_base.is_dir() {
            debug_log(self.verbose, format!("No session/ directory at {}", session_base.display()));
            return Vec::new();
        }

        if let Some(hash) = &self.hash_filter {
            let target = session_base.join(hash);
            if target.is_dir() {
                return vec![hash.clone()];
            }
            debug_log(self.verbose, format!("Project hash dir not found: {}", target.display()));
            return Vec::new();
        }

        let entries = match fs::read_dir(&session_base) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Cannot list {}: {}", session_base.display(), e);
                return Vec::new();
            }
        };
        let mut hashes: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        hashes.sort();
        hashes
    }

    /// Session files for one hash that fall inside the time window and pass
    /// the project-path filter.
    fn load_sessions(&self, project_hash: &str) -> Vec<SessionCandidate> {
        let dir = self.storage_dir.join("session").join(project_hash);
        let files = list_json_files(&dir, "ses_");
        debug_log(
            self.verbose,
            format!("Found {} session files for hash {}", files.len(), project_hash),
        );

        let mut candidates = Vec::new();
        for path in files {
            let Some(session) = load_json_file::<SessionFile>(&path) else {
                continue;
            };

            let Some(created_value) = session.time.created.as_ref() else {
                eprintln!("Missing time.created in session: {}", path.display());
                continue;
            };
            let Some(created_ms) = json_millis(Some(created_value)) else {
                eprintln!("Invalid time.created in session: {}", path.display());
                continue;
            };
            if !self.range.contains_millis(created_ms) {
                debug_log(
                    self.verbose,
                    format!("Session {} outside date range, skipping", session.id),
                );
                continue;
            }

            if let Some(filter) = &self.path_filter {
                if session.directory.trim_end_matches('/') != filter.as_str() {
                    debug_log(
                        self.verbose,
                        format!(
                            "Session {} dir {:?} != filter, skipping",
                            session.id, session.directory
                        ),
                    );
                    continue;
                }
            }

            let title = session
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .or(session.slug.as_deref().filter(|s| !s.is_empty()))
                .unwrap_or_default()
                .to_string();
            let modified = json_millis(session.time.updated.as_ref())
                .and_then(chrono::DateTime::from_timestamp_millis);
            candidates.push(SessionCandidate {
                session_id: session.id,
                created: chrono::DateTime::from_timestamp_millis(created_ms),
                modified,
                project_path: session.directory,
                parent_id: None,
                handle: CandidateHandle::OpencodeSessionFile { title },
            });
        }
        candidates
    }

    /// Message metadata for a session, ordered by creation time.
    fn load_messages(&self, session_id: &str) -> Vec<crate::models::MessageFile> {
        let dir = self.storage_dir.join("message").join(session_id);
        if !dir.is_dir() {
            debug_log(self.verbose, format!("No message directory for {session_id}"));
            return Vec::new();
        }
        let files = list_json_files(&dir, "msg_");
        debug_log(self.verbose, format!("Found {} message files for {}", files.len(), session_id));

        let mut messages: Vec<crate::models::MessageFile> =
            files.iter().filter_map(|path| load_json_file(path)).collect();
        messages.sort_by_key(|m| json_millis(m.time.created.as_ref()).unwrap_or(0));
        messages
    }

    /// Message parts, ordered by file name (part ids sort chronologically).
    fn load_parts(&self, message_id: &str) -> Vec<Part> {
        let dir = self.storage_dir.join("part").join(message_id);
        if !dir.is_dir() {
            debug_log(self.verbose, format!("No parts directory for {message_id}"));
            return Vec::new();
        }
        let files = list_json_files(&dir, "prt_");
        debug_log(self.verbose, format!("Found {} part files for {}", files.len(), message_id));

        files.iter().filter_map(|path| load_json_file(path)).collect()
    }
}

impl SessionLocator for OpencodeFileSource {
    fn list_candidates(&mut self) -> Result<Vec<SessionCandidate>> {
        debug_log(self.verbose, format!("Using file-based backend: {}", self.storage_dir.display()));
        let hashes = self.discover_project_hashes();
        debug_log(self.verbose, format!("Found {} project hashes", hashes.len()));

        let mut candidates = Vec::new();
        for hash in hashes {
            let sessions = self.load_sessions(&hash);
            debug_log(self.verbose, format!("Hash {}: {} sessions in range", hash, sessions.len()));
            candidates.extend(sessions);
        }
        Ok(candidates)
    }

    fn assemble(&mut self, candidate: &SessionCandidate) -> Result<Option<SessionRecord>> {
        debug_log(self.verbose, format!("Processing session {}", candidate.session_id));

        let raw_messages = self.load_messages(&candidate.session_id);
        if raw_messages.is_empty() {
            debug_log(
                self.verbose,
                format!("No messages for session {}, skipping", candidate.session_id),
            );
            return Ok(None);
        }

        let mut messages: Vec<NormalizedMessage> = Vec::new();
        for msg in raw_messages {
            let parts = self.load_parts(&msg.id);
            let (content, tool_calls) = process_parts(&parts);
            if content.is_empty() && tool_calls.is_empty() {
                debug_log(self.verbose, format!("Empty message {}, skipping", msg.id));
                continue;
            }
            let timestamp = json_millis(msg.time.created.as_ref()).map(ms_to_iso).unwrap_or_default();
            messages.push(NormalizedMessage {
                role: msg.role,
                content,
                timestamp,
                tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
            });
        }
        if messages.is_empty() {
            debug_log(
                self.verbose,
                format!("Session {} has no text content, skipping", candidate.session_id),
            );
            return Ok(None);
        }

        let CandidateHandle::OpencodeSessionFile { title } = &candidate.handle else {
            return Ok(None);
        };
        let time_start = candidate
            .created
            .map(|dt| ms_to_iso(dt.timestamp_millis()))
            .unwrap_or_default();
        let time_end = candidate
            .modified
            .map(|dt| ms_to_iso(dt.timestamp_millis()))
            .unwrap_or_default();

        Ok(Some(SessionRecord {
            source: "opencode",
            session_id: candidate.session_id.clone(),
            project: candidate.project_path.clone(),
            title: title.clone(),
            time_start,
            time_end,
            messages,
            parent_id: None,
        }))
    }
}
