use serde_json::Value;

/// Longest string kept in a tool-call field or tool-result excerpt.
const MAX_TOOL_TEXT_CHARS: usize = 200;

/// Truncate a string to 200 characters, replacing the tail with `...`.
///
/// The result is exactly 200 characters when truncation happens; shorter
/// strings pass through unchanged. Counted in characters, not bytes, so
/// multi-byte text never gets split mid-character.
pub fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_TOOL_TEXT_CHARS {
        return s.to_string();
    }
    let kept: String = s.chars().take(MAX_TOOL_TEXT_CHARS - 3).collect();
    format!("{kept}...")
}

/// Render a JSON value as plain text: strings verbatim, null as empty,
/// anything else compact-serialized (non-ASCII preserved).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// [`value_to_string`] followed by [`truncate`] - the treatment every
/// tool-call input/output field gets.
pub fn truncate_value(value: &Value) -> String {
    truncate(&value_to_string(value))
}
