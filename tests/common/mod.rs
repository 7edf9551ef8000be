//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use rusqlite::{Connection, params};
use tempfile::TempDir;

use agent_session_export::utils::parse_iso_date;

/// Millisecond epoch for an ISO date string.
pub fn ms(iso: &str) -> i64 {
    parse_iso_date(iso).expect("valid test date").timestamp_millis()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(path, content).expect("Failed to write fixture file");
}

/// Builder for a Claude Code projects directory tree.
pub struct ClaudeProjectsBuilder {
    temp_dir: TempDir,
}

impl ClaudeProjectsBuilder {
    pub fn new() -> Self {
        Self { temp_dir: TempDir::new().expect("Failed to create temp dir") }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a sessions-index.json into the project directory with the
    /// given encoded name.
    pub fn with_index(self, encoded_name: &str, index_json: &str) -> Self {
        write_file(
            &self.temp_dir.path().join(encoded_name).join("sessions-index.json"),
            index_json,
        );
        self
    }

    /// Write a transcript file; `lines` are raw JSONL lines.
    pub fn with_transcript(self, encoded_name: &str, session_id: &str, lines: &[&str]) -> Self {
        write_file(
            &self.temp_dir.path().join(encoded_name).join(format!("{session_id}.jsonl")),
            &lines.join("\n"),
        );
        self
    }
}

impl Default for ClaudeProjectsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of a sessions-index.json manifest.
pub struct IndexEntryBuilder {
    session_id: String,
    created: String,
    modified: String,
    first_prompt: String,
    project_path: String,
    is_sidechain: bool,
    is_meta: bool,
    full_path: String,
}

impl IndexEntryBuilder {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            created: "2026-02-20T09:00:00.000Z".to_string(),
            modified: "2026-02-20T10:00:00.000Z".to_string(),
            first_prompt: "Test prompt".to_string(),
            project_path: String::new(),
            is_sidechain: false,
            is_meta: false,
            full_path: String::new(),
        }
    }

    pub fn created(mut self, created: &str) -> Self {
        self.created = created.to_string();
        self
    }

    pub fn modified(mut self, modified: &str) -> Self {
        self.modified = modified.to_string();
        self
    }

    pub fn first_prompt(mut self, first_prompt: &str) -> Self {
        self.first_prompt = first_prompt.to_string();
        self
    }

    pub fn project_path(mut self, project_path: &str) -> Self {
        self.project_path = project_path.to_string();
        self
    }

    pub fn sidechain(mut self) -> Self {
        self.is_sidechain = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.is_meta = true;
        self
    }

    pub fn full_path(mut self, full_path: &str) -> Self {
        self.full_path = full_path.to_string();
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({
            "sessionId": self.session_id,
            "created": self.created,
            "modified": self.modified,
            "firstPrompt": self.first_prompt,
            "projectPath": self.project_path,
            "isSidechain": self.is_sidechain,
            "isMeta": self.is_meta,
            "fullPath": self.full_path,
        })
        .to_string()
    }
}

/// Render a full manifest from entries.
pub fn index_json(entries: &[IndexEntryBuilder]) -> String {
    let items: Vec<String> = entries.iter().map(|e| e.to_json()).collect();
    format!(r#"{{"version":"1.0","entries":[{}]}}"#, items.join(","))
}

/// A user or assistant transcript line with plain string content.
pub fn transcript_line(role: &str, text: &str, timestamp: &str) -> String {
    serde_json::json!({
        "type": role,
        "message": {"role": role, "content": text},
        "timestamp": timestamp,
    })
    .to_string()
}

/// Builder for an OpenCode legacy storage tree.
pub struct OpencodeStorageBuilder {
    temp_dir: TempDir,
}

impl OpencodeStorageBuilder {
    pub fn new() -> Self {
        Self { temp_dir: TempDir::new().expect("Failed to create temp dir") }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn with_session(self, hash: &str, session_id: &str, json: &str) -> Self {
        write_file(
            &self.temp_dir.path().join("session").join(hash).join(format!("{session_id}.json")),
            json,
        );
        self
    }

    pub fn with_message(self, session_id: &str, message_id: &str, json: &str) -> Self {
        write_file(
            &self
                .temp_dir
                .path()
                .join("message")
                .join(session_id)
                .join(format!("{message_id}.json")),
            json,
        );
        self
    }

    pub fn with_part(self, message_id: &str, part_id: &str, json: &str) -> Self {
        write_file(
            &self.temp_dir.path().join("part").join(message_id).join(format!("{part_id}.json")),
            json,
        );
        self
    }
}

impl Default for OpencodeStorageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Session JSON for the legacy layout.
pub fn opencode_session_json(id: &str, directory: &str, title: &str, created: i64) -> String {
    serde_json::json!({
        "id": id,
        "directory": directory,
        "title": title,
        "time": {"created": created, "updated": created + 60_000},
    })
    .to_string()
}

pub fn opencode_message_json(id: &str, role: &str, created: i64) -> String {
    serde_json::json!({
        "id": id,
        "role": role,
        "time": {"created": created},
    })
    .to_string()
}

pub fn text_part_json(text: &str) -> String {
    serde_json::json!({"type": "text", "text": text}).to_string()
}

/// Builder for an OpenCode SQLite database at `<dir>/opencode.db`.
pub struct OpencodeDbBuilder {
    temp_dir: TempDir,
    conn: Connection,
}

impl OpencodeDbBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let conn = Connection::open(temp_dir.path().join("opencode.db"))
            .expect("Failed to create test database");
        conn.execute_batch(
            "CREATE TABLE session (
                 id TEXT PRIMARY KEY,
                 parent_id TEXT,
                 directory TEXT,
                 title TEXT,
                 time_created INTEGER,
                 time_updated INTEGER,
                 time_archived INTEGER
             );
             CREATE TABLE message (
                 id TEXT PRIMARY KEY,
                 session_id TEXT,
                 data TEXT,
                 time_created INTEGER
             );
             CREATE TABLE part (
                 id TEXT PRIMARY KEY,
                 message_id TEXT,
                 data TEXT,
                 time_created INTEGER
             );",
        )
        .expect("Failed to create schema");
        Self { temp_dir, conn }
    }

    /// Directory containing opencode.db; pass as --sessions-dir.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn with_session(self, id: &str, directory: &str, title: &str, created: i64) -> Self {
        self.conn
            .execute(
                "INSERT INTO session (id, parent_id, directory, title, time_created, time_updated, time_archived)
                 VALUES (?1, NULL, ?2, ?3, ?4, ?4, NULL)",
                params![id, directory, title, created],
            )
            .expect("Failed to insert session");
        self
    }

    pub fn with_child_session(
        self,
        id: &str,
        parent_id: &str,
        directory: &str,
        created: i64,
    ) -> Self {
        self.conn
            .execute(
                "INSERT INTO session (id, parent_id, directory, title, time_created, time_updated, time_archived)
                 VALUES (?1, ?2, ?3, 'child', ?4, ?4, NULL)",
                params![id, parent_id, directory, created],
            )
            .expect("Failed to insert session");
        self
    }

    pub fn with_archived_session(self, id: &str, directory: &str, created: i64) -> Self {
        self.conn
            .execute(
                "INSERT INTO session (id, parent_id, directory, title, time_created, time_updated, time_archived)
                 VALUES (?1, NULL, ?2, 'archived', ?3, ?3, ?3)",
                params![id, directory, created],
            )
            .expect("Failed to insert session");
        self
    }

    pub fn with_message(self, id: &str, session_id: &str, role: &str, created: i64) -> Self {
        self.conn
            .execute(
                "INSERT INTO message (id, session_id, data, time_created) VALUES (?1, ?2, ?3, ?4)",
                params![id, session_id, opencode_message_json(id, role, created), created],
            )
            .expect("Failed to insert message");
        self
    }

    pub fn with_text_part(self, id: &str, message_id: &str, text: &str, created: i64) -> Self {
        self.conn
            .execute(
                "INSERT INTO part (id, message_id, data, time_created) VALUES (?1, ?2, ?3, ?4)",
                params![id, message_id, text_part_json(text), created],
            )
            .expect("Failed to insert part");
        self
    }
}

impl Default for OpencodeDbBuilder {
    fn default() -> Self {
        Self::new()
    }
}
