use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, params};

use crate::models::{MessageFile, NormalizedMessage, Part, SessionRecord};
use crate::parsers::process_parts;
use crate::utils::{debug_log, dt_to_iso, json_millis, ms_to_iso};

use super::{CandidateHandle, SessionCandidate, SessionLocator, TimeRange};

/// Locate `opencode.db` next to the sessions directory.
///
/// Current OpenCode keeps the database in the storage root, one level above
/// the legacy `session/` tree, but older builds put it inside. Check both.
pub fn find_db_path(sessions_dir: &Path) -> Option<PathBuf> {
    let inside = sessions_dir.join("opencode.db");
    if inside.is_file() {
        return Some(inside);
    }
    let beside = sessions_dir.parent()?.join("opencode.db");
    if beside.is_file() { Some(beside) } else { None }
}

/// Locator for OpenCode's SQLite storage.
///
/// Sessions, messages and parts live in three tables keyed by id; message
/// and part payloads are JSON blobs in a `data` column, the same shapes the
/// legacy file layout uses. Time filtering happens in SQL on
/// `time_created`, and archived sessions are excluded there too.
pub struct OpencodeDbSource {
    conn: Connection,
    project_filter: Option<String>,
    range: TimeRange,
    verbose: bool,
}

impl OpencodeDbSource {
    pub fn open(
        db_path: &Path,
        project_filter: Option<String>,
        range: TimeRange,
        verbose: bool,
    ) -> Result<Self> {
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Cannot open database: {}", db_path.display()))?;
        Ok(Self { conn, project_filter, range, verbose })
    }

    fn query_sessions(&self) -> rusqlite::Result<Vec<SessionCandidate>> {
        let mut sql = String::from(
            "SELECT id, parent_id, directory, title, time_created, time_updated \
             FROM session WHERE time_created >= ?1 AND time_created <= ?2 \
             AND time_archived IS NULL",
        );
        if self.project_filter.is_some() {
            sql.push_str(" AND directory = ?3");
        }
        sql.push_str(" ORDER BY time_created ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let map_row = |row: &rusqlite::Row<'_>| {
            let id: String = row.get(0)?;
            let parent_id: Option<String> = row.get(1)?;
            let directory: Option<String> = row.get(2)?;
            let title: Option<String> = row.get(3)?;
            let created_ms: i64 = row.get(4)?;
            let updated_ms: Option<i64> = row.get(5)?;
            Ok(SessionCandidate {
                session_id: id,
                created: chrono::DateTime::from_timestamp_millis(created_ms),
                modified: updated_ms.and_then(chrono::DateTime::from_timestamp_millis),
                project_path: directory.unwrap_or_default(),
                parent_id: parent_id.filter(|p| !p.is_empty()),
                handle: CandidateHandle::OpencodeRow { title: title.unwrap_or_default() },
            })
        };

        let rows = if let Some(filter) = &self.project_filter {
            stmt.query_map(params![self.range.from_ms(), self.range.to_ms(), filter], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            stmt.query_map(params![self.range.from_ms(), self.range.to_ms()], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
    }

    fn load_parts(&self, message_id: &str) -> Result<Vec<Part>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM part WHERE message_id = ?1 ORDER BY time_created ASC")
            .context("Cannot query part table")?;
        let raws = stmt
            .query_map(params![message_id], |row| row.get::<_, String>(0))
            .context("Cannot query part table")?
            .collect::<rusqlite::Result<Vec<String>>>()
            .context("Cannot query part table")?;

        // Corrupt part payloads contribute nothing
        Ok(raws
            .iter()
            .filter_map(|raw| serde_json::from_str::<Part>(raw).ok())
            .collect())
    }
}

impl SessionLocator for OpencodeDbSource {
    fn list_candidates(&mut self) -> Result<Vec<SessionCandidate>> {
        match self.query_sessions() {
            Ok(candidates) => {
                debug_log(
                    self.verbose,
                    format!("SQLite: found {} sessions in range", candidates.len()),
                );
                Ok(candidates)
            }
            Err(e) => {
                eprintln!("Cannot query session table: {e}");
                Ok(Vec::new())
            }
        }
    }

    fn assemble(&mut self, candidate: &SessionCandidate) -> Result<Option<SessionRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, data FROM message WHERE session_id = ?1 ORDER BY time_created ASC")
            .context("Cannot query message table")?;
        let rows = stmt
            .query_map(params![candidate.session_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .context("Cannot query message table")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Cannot query message table")?;
        if rows.is_empty() {
            debug_log(
                self.verbose,
                format!("Session {} has no messages, skipping", candidate.session_id),
            );
            return Ok(None);
        }

        let mut messages: Vec<NormalizedMessage> = Vec::new();
        for (message_id, data) in rows {
            let msg: MessageFile = match serde_json::from_str(&data) {
                Ok(msg) => msg,
                Err(_) => {
                    debug_log(
                        self.verbose,
                        format!("Corrupt message data for {message_id}, skipping"),
                    );
                    continue;
                }
            };
            let parts = self.load_parts(&message_id)?;
            let (content, tool_calls) = process_parts(&parts);
            if content.is_empty() && tool_calls.is_empty() {
                debug_log(self.verbose, format!("Empty message {message_id}, skipping"));
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

        let CandidateHandle::OpencodeRow { title } = &candidate.handle else {
            return Ok(None);
        };
        let time_start = candidate.created.map(|dt| dt_to_iso(&dt)).unwrap_or_default();
        let time_end = candidate.modified.map(|dt| dt_to_iso(&dt)).unwrap_or_default();

        Ok(Some(SessionRecord {
            source: "opencode",
            session_id: candidate.session_id.clone(),
            project: candidate.project_path.clone(),
            title: title.clone(),
            time_start,
            time_end,
            messages,
            parent_id: candidate.parent_id.clone(),
        }))
    }
}
