use crate::models::{Part, ToolCall};
use crate::utils::truncate_value;

/// Fold a message's parts into display text plus tool calls.
///
/// Both OpenCode backends store parts in the same JSON shape, so this is
/// shared between the SQLite and legacy-file paths:
///
/// - `text` parts are collected verbatim
/// - `reasoning` parts become a `[thinking] ...` line (this backend keeps
///   reasoning in the transcript, unlike Claude Code which drops it)
/// - `tool` parts become [`ToolCall`]s with truncated `state.input` /
///   `state.output`
/// - anything else contributes nothing
pub fn process_parts(parts: &[Part]) -> (String, Vec<ToolCall>) {
    let mut text_pieces: Vec<String> = Vec::new();
    let mut tool_calls: Vec<ToolCall> = Vec::new();

    for part in parts {
        match part {
            Part::Text { text } if !text.is_empty() => text_pieces.push(text.clone()),
            Part::Reasoning { reasoning } if !reasoning.is_empty() => {
                text_pieces.push(format!("[thinking] {reasoning}"));
            }
            Part::Tool { tool, state } => {
                let input =
                    state.get("input").map(truncate_value).unwrap_or_default();
                let output =
                    state.get("output").map(truncate_value).unwrap_or_default();
                tool_calls.push(ToolCall { tool: tool.clone(), input, output });
            }
            _ => {}
        }
    }

    (text_pieces.join("\n"), tool_calls)
}
