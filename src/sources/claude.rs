use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{SessionRecord, SessionsIndex};
use crate::parsers::parse_transcript;
use crate::utils::{debug_log, decode_project_dir, dt_to_iso, encode_project_path, parse_timestamp};

use super::{CandidateHandle, SessionCandidate, SessionLocator, TimeRange};

/// Locator for Claude Code's file-based storage.
///
/// Layout under the projects directory (typically `~/.claude/projects/`):
/// one directory per project (path dash-encoded into the directory name),
/// each holding an optional `sessions-index.json` manifest plus one
/// `.jsonl` transcript per session.
///
/// Discovery prefers the manifest; a missing or unreadable manifest
/// downgrades to scanning the directory for transcript files, filtered by
/// file modification time.
pub struct ClaudeSource {
    projects_dir: PathBuf,
    project_filter: Option<String>,
    range: TimeRange,
    verbose: bool,
}

impl ClaudeSource {
    pub fn new(
        projects_dir: PathBuf,
        project_filter: Option<String>,
        range: TimeRange,
        verbose: bool,
    ) -> Self {
        Self { projects_dir, project_filter, range, verbose }
    }

    /// Project directories to visit, as `(dir, decoded_path)` pairs.
    ///
    /// With a filter the single matching directory is targeted by encoding
    /// the filter; otherwise every subdirectory is visited in name order.
    fn discover_project_dirs(&self) -> Vec<(PathBuf, String)> {
        if !self.projects_dir.is_dir() {
            debug_log(self.verbose, format!("Claude dir not found: {}", self.projects_dir.display()));
            return Vec::new();
        }

        if let Some(filter) = &self.project_filter {
            let encoded = encode_project_path(filter);
            let dir = self.projects_dir.join(&encoded);
            if dir.is_dir() {
                debug_log(self.verbose, format!("Found project dir: {}", dir.display()));
                return vec![(dir, filter.clone())];
            }
            debug_log(self.verbose, format!("Project dir not found: {}", dir.display()));
            return Vec::new();
        }

        let entries = match fs::read_dir(&self.projects_dir) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Cannot list {}: {}", self.projects_dir.display(), e);
                return Vec::new();
            }
        };
        let mut dirs: Vec<(PathBuf, String)> = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            dirs.push((path, decode_project_dir(&name)));
        }
        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        dirs
    }

    /// Read and parse the manifest, or `None` to trigger the fallback scan.
    fn load_sessions_index(&self, project_dir: &Path) -> Option<SessionsIndex> {
        let index_path = project_dir.join("sessions-index.json");
        if !index_path.is_file() {
            debug_log(self.verbose, format!("No sessions-index.json in {}", project_dir.display()));
            return None;
        }
        let raw = match fs::read_to_string(&index_path) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("Cannot read: {} ({})", index_path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<SessionsIndex>(&raw) {
            Ok(index) => Some(index),
            Err(e) => {
                eprintln!("Corrupt sessions-index.json: {} ({})", index_path.display(), e);
                None
            }
        }
    }

    fn candidates_from_index(
        &self,
        project_dir: &Path,
        decoded: &str,
        index: SessionsIndex,
    ) -> Vec<SessionCandidate> {
        let mut candidates = Vec::new();
        for entry in index.entries {
            if entry.session_id.is_empty() {
                continue;
            }
            if entry.is_sidechain {
                debug_log(self.verbose, format!("Skipping sidechain session: {}", entry.session_id));
                continue;
            }
            if entry.is_meta {
                debug_log(self.verbose, format!("Skipping meta session: {}", entry.session_id));
                continue;
            }

            let created = parse_timestamp(&entry.created);
            let modified = parse_timestamp(&entry.modified);
            if let Some(created) = created {
                if created > self.range.to {
                    debug_log(
                        self.verbose,
                        format!("Session {} created after range, skipping", entry.session_id),
                    );
                    continue;
                }
            }
            if let Some(modified) = modified {
                if modified < self.range.from {
                    debug_log(
                        self.verbose,
                        format!("Session {} modified before range, skipping", entry.session_id),
                    );
                    continue;
                }
            }
            if created.is_none() && modified.is_none() {
                debug_log(
                    self.verbose,
                    format!("Session {} has no timestamps, including", entry.session_id),
                );
            }

            let project_path = if entry.project_path.is_empty() {
                decoded.to_string()
            } else {
                entry.project_path.clone()
            };
            candidates.push(SessionCandidate {
                session_id: entry.session_id,
                created,
                modified,
                project_path,
                parent_id: None,
                handle: CandidateHandle::ClaudeTranscript {
                    project_dir: project_dir.to_path_buf(),
                    first_prompt: entry.first_prompt,
                    summary: entry.summary,
                    full_path: entry.full_path,
                },
            });
        }
        debug_log(self.verbose, format!("Index has {} matching sessions", candidates.len()));
        candidates
    }

    /// No usable manifest: scan for `*.jsonl` transcripts directly. Only a
    /// lower bound applies here - file mtime says nothing about creation.
    fn candidates_from_scan(&self, project_dir: &Path, decoded: &str) -> Vec<SessionCandidate> {
        let entries = match fs::read_dir(project_dir) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Cannot list {}: {}", project_dir.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == "jsonl")
            })
            .collect();
        files.sort();
        debug_log(self.verbose, format!("Fallback: found {} .jsonl files", files.len()));

        let mut candidates = Vec::new();
        for path in files {
            let session_id = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().into_owned(),
                None => continue,
            };
            let modified: Option<DateTime<Utc>> = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .ok()
                .map(DateTime::<Utc>::from);
            if let Some(mtime) = modified {
                if mtime < self.range.from {
                    debug_log(
                        self.verbose,
                        format!("JSONL {} mtime before range, skipping", path.display()),
                    );
                    continue;
                }
            }
            candidates.push(SessionCandidate {
                session_id,
                created: None,
                modified,
                project_path: decoded.to_string(),
                parent_id: None,
                handle: CandidateHandle::ClaudeTranscript {
                    project_dir: project_dir.to_path_buf(),
                    first_prompt: String::new(),
                    summary: String::new(),
                    full_path: String::new(),
                },
            });
        }
        candidates
    }

    /// Resolve the transcript path: `<project_dir>/<session_id>.jsonl`, or
    /// the manifest's absolute `fullPath` when the local file moved.
    fn transcript_path(&self, candidate: &SessionCandidate) -> Option<PathBuf> {
        let CandidateHandle::ClaudeTranscript { project_dir, full_path, .. } = &candidate.handle
        else {
            return None;
        };
        let local = project_dir.join(format!("{}.jsonl", candidate.session_id));
        if local.is_file() {
            return Some(local);
        }
        if !full_path.is_empty() {
            let alt = PathBuf::from(full_path);
            if alt.is_file() {
                return Some(alt);
            }
        }
        eprintln!(
            "JSONL file not found for session {}: {}",
            candidate.session_id,
            local.display()
        );
        None
    }
}

impl SessionLocator for ClaudeSource {
    fn list_candidates(&mut self) -> Result<Vec<SessionCandidate>> {
        let project_dirs = self.discover_project_dirs();
        debug_log(self.verbose, format!("Found {} project directories", project_dirs.len()));

        let mut candidates = Vec::new();
        for (project_dir, decoded) in project_dirs {
            debug_log(self.verbose, format!("Scanning project dir: {}", project_dir.display()));
            match self.load_sessions_index(&project_dir) {
                Some(index) => {
                    candidates.extend(self.candidates_from_index(&project_dir, &decoded, index));
                }
                None => {
                    candidates.extend(self.candidates_from_scan(&project_dir, &decoded));
                }
            }
        }
        Ok(candidates)
    }

    fn assemble(&mut self, candidate: &SessionCandidate) -> Result<Option<SessionRecord>> {
        let Some(path) = self.transcript_path(candidate) else {
            return Ok(None);
        };
        debug_log(self.verbose, format!("Processing JSONL: {}", path.display()));

        let messages = match parse_transcript(&path) {
            Ok(messages) => messages,
            Err(e) => {
                eprintln!("Cannot read JSONL: {} ({})", path.display(), e);
                return Ok(None);
            }
        };
        if messages.is_empty() {
            debug_log(
                self.verbose,
                format!("Session {} has no user/assistant messages, skipping", candidate.session_id),
            );
            return Ok(None);
        }

        let CandidateHandle::ClaudeTranscript { first_prompt, summary, .. } = &candidate.handle
        else {
            return Ok(None);
        };
        let title = if !first_prompt.is_empty() {
            first_prompt.clone()
        } else if !summary.is_empty() {
            summary.clone()
        } else {
            candidate.session_id.clone()
        };
        let time_start = match candidate.created {
            Some(created) => dt_to_iso(&created),
            None => messages.first().map(|m| m.timestamp.clone()).unwrap_or_default(),
        };
        let time_end = match candidate.modified {
            Some(modified) => dt_to_iso(&modified),
            None => messages.last().map(|m| m.timestamp.clone()).unwrap_or_default(),
        };

        Ok(Some(SessionRecord {
            source: "claude-code",
            session_id: candidate.session_id.clone(),
            project: candidate.project_path.clone(),
            title,
            time_start,
            time_end,
            messages,
            parent_id: None,
        }))
    }
}
