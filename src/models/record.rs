use serde::Serialize;

/// One tool invocation extracted from an assistant message (or an OpenCode
/// tool part). `input` and `output` are pre-truncated display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCall {
    pub tool: String,
    pub input: String,
    pub output: String,
}

/// A message in the unified output shape.
///
/// `tool_calls` is omitted from the JSON entirely when there are none -
/// consumers must not see an empty-array marker. A message with empty
/// content and no tool calls is never constructed in the first place.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedMessage {
    pub role: String,
    pub content: String,
    /// ISO 8601 UTC, or empty when the backend recorded no timestamp.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// One exported session: a single NDJSON line.
///
/// `parent_id` only appears for OpenCode sessions read from SQLite, and only
/// when the row actually links to a parent.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub source: &'static str,
    pub session_id: String,
    pub project: String,
    pub title: String,
    pub time_start: String,
    pub time_end: String,
    pub messages: Vec<NormalizedMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}
