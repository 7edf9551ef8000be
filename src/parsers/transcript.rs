use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::{BlockContent, ContentBlock, NormalizedMessage, ToolCall, ToolResultContent, TranscriptLine};
use crate::utils::{dt_to_iso, parse_timestamp, truncate, truncate_value};

/// Parse a Claude Code session transcript (`<session_id>.jsonl`) into
/// normalized messages, in file order.
///
/// Malformed lines are logged and skipped; only failing to read the file at
/// all is an error (the caller downgrades that to a skipped session).
pub fn parse_transcript(path: &Path) -> Result<Vec<NormalizedMessage>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut messages = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read failure at line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Corrupt JSONL line {} in {}: {}", idx + 1, path.display(), e);
                continue;
            }
        };

        // Only conversation lines carry messages; summaries, file-history
        // snapshots and system events are skipped without a warning.
        let entry_type = value.get("type").and_then(|t| t.as_str()).unwrap_or("");
        if entry_type != "user" && entry_type != "assistant" {
            continue;
        }

        let record: TranscriptLine = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Corrupt JSONL line {} in {}: {}", idx + 1, path.display(), e);
                continue;
            }
        };

        if let Some(message) = decode_line(&record) {
            messages.push(message);
        }
    }

    Ok(messages)
}

/// Decode one transcript line into zero or one normalized message.
///
/// Returns `None` when the line yields neither text nor tool calls.
pub fn decode_line(record: &TranscriptLine) -> Option<NormalizedMessage> {
    let content = record.message.as_ref()?.content.as_ref()?;
    let timestamp =
        parse_timestamp(&record.timestamp).map(|dt| dt_to_iso(&dt)).unwrap_or_default();

    match record.entry_type.as_str() {
        "user" => {
            let text = user_content(content);
            if text.is_empty() {
                return None;
            }
            Some(NormalizedMessage {
                role: "user".to_string(),
                content: text,
                timestamp,
                tool_calls: None,
            })
        }
        "assistant" => {
            let (text, tool_calls) = assistant_content(content);
            if text.is_empty() && tool_calls.is_empty() {
                return None;
            }
            Some(NormalizedMessage {
                role: "assistant".to_string(),
                content: text,
                timestamp,
                tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
            })
        }
        _ => None,
    }
}

/// Extract text from user-shaped content: a bare string verbatim, or text
/// blocks concatenated with tool results rendered inline.
fn user_content(content: &BlockContent) -> String {
    let blocks = match content {
        BlockContent::Text(text) => return text.clone(),
        BlockContent::Blocks(blocks) => blocks,
    };

    let mut pieces: Vec<String> = Vec::new();
    for raw in blocks {
        let Ok(block) = serde_json::from_value::<ContentBlock>(raw.clone()) else {
            continue;
        };
        match block {
            ContentBlock::Text { text } if !text.is_empty() => pieces.push(text),
            ContentBlock::ToolResult { content } => match content {
                ToolResultContent::Text(inner) => {
                    pieces.push(format!("[Tool result: {}]", truncate(&inner)));
                }
                ToolResultContent::Blocks(inner) => {
                    let texts: Vec<String> = inner
                        .iter()
                        .filter_map(|v| {
                            match serde_json::from_value::<ContentBlock>(v.clone()) {
                                Ok(ContentBlock::Text { text }) => Some(text),
                                _ => None,
                            }
                        })
                        .collect();
                    if !texts.is_empty() {
                        pieces.push(format!("[Tool result: {}]", truncate(&texts.join("\n"))));
                    }
                }
                ToolResultContent::Other(_) => {}
            },
            _ => {}
        }
    }
    pieces.join("\n")
}

/// Extract text and tool calls from assistant-shaped content, which is
/// always a block array. Thinking blocks are dropped here - reasoning is
/// not part of the Claude Code export.
fn assistant_content(content: &BlockContent) -> (String, Vec<ToolCall>) {
    let BlockContent::Blocks(blocks) = content else {
        return (String::new(), Vec::new());
    };

    let mut pieces: Vec<String> = Vec::new();
    let mut tool_calls: Vec<ToolCall> = Vec::new();

    for raw in blocks {
        let Ok(block) = serde_json::from_value::<ContentBlock>(raw.clone()) else {
            continue;
        };
        match block {
            ContentBlock::Text { text } if !text.is_empty() => pieces.push(text),
            ContentBlock::ToolUse { name, input } => {
                tool_calls.push(ToolCall {
                    tool: name,
                    input: truncate_value(&input),
                    output: String::new(),
                });
            }
            _ => {}
        }
    }

    (pieces.join("\n"), tool_calls)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    /// Helper to create a temporary transcript file with given content
    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_parse_valid_transcript() {
        let content = r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"Hello"}]},"timestamp":"2026-02-20T09:00:01.000Z","sessionId":"s1"}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"Hi there"}]},"timestamp":"2026-02-20T09:00:05.000Z","sessionId":"s1"}"#;

        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[0].timestamp, "2026-02-20T09:00:01Z");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].content, "Hi there");
    }

    #[test]
    fn test_parse_empty_file() {
        let file = create_test_file("");
        assert!(parse_transcript(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_line_skipped_valid_lines_kept() {
        let content = r#"{"type":"user","message":{"role":"user","content":"Valid 1"},"timestamp":"2026-02-20T09:00:01Z"}
this is not json
{"type":"user","message":{"role":"user","content":"Valid 2"},"timestamp":"2026-02-20T09:00:02Z"}"#;

        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Valid 1");
        assert_eq!(messages[1].content, "Valid 2");
    }

    #[test]
    fn test_non_conversation_lines_skipped() {
        let content = r#"{"type":"summary","summary":"Fix the build","leafUuid":"e0"}
{"type":"file-history-snapshot","messageId":"m1","snapshot":{}}
{"type":"user","message":{"role":"user","content":"only me"},"timestamp":"2026-02-20T09:00:01Z"}
{"type":"system","subtype":"local_command","content":"/usage"}"#;

        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "only me");
    }

    #[test]
    fn test_string_content_verbatim() {
        let content = r#"{"type":"user","message":{"role":"user","content":"Simple string content"},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages[0].content, "Simple string content");
    }

    #[test]
    fn test_thinking_only_message_suppressed() {
        let content = r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"thinking","thinking":"Let me think..."}]},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        assert!(parse_transcript(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_thinking_block_dropped_text_kept() {
        let content = r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"thinking","thinking":"Analyzing..."},{"type":"text","text":"Answer:"}]},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Answer:");
        assert!(messages[0].tool_calls.is_none());
    }

    #[test]
    fn test_tool_use_extracted_with_serialized_input() {
        let content = r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"tool_use","id":"t1","name":"bash","input":{"command":"ls -la"}}]},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();

        assert_eq!(messages.len(), 1);
        let tool_calls = messages[0].tool_calls.as_ref().unwrap();
        assert_eq!(tool_calls[0].tool, "bash");
        assert_eq!(tool_calls[0].input, r#"{"command":"ls -la"}"#);
        assert_eq!(tool_calls[0].output, "");
    }

    #[test]
    fn test_tool_use_long_input_truncated() {
        let long = "y".repeat(400);
        let content = format!(
            r#"{{"type":"assistant","message":{{"role":"assistant","content":[{{"type":"tool_use","name":"write","input":{{"data":"{long}"}}}}]}},"timestamp":"2026-02-20T09:00:01Z"}}"#
        );
        let file = create_test_file(&content);
        let messages = parse_transcript(file.path()).unwrap();
        let tool_calls = messages[0].tool_calls.as_ref().unwrap();
        assert_eq!(tool_calls[0].input.chars().count(), 200);
        assert!(tool_calls[0].input.ends_with("..."));
    }

    #[test]
    fn test_tool_result_string_rendered() {
        let content = r#"{"type":"user","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"t1","content":"File contents here"}]},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages[0].content, "[Tool result: File contents here]");
    }

    #[test]
    fn test_tool_result_nested_blocks_joined() {
        let content = r#"{"type":"user","message":{"role":"user","content":[{"type":"tool_result","content":[{"type":"text","text":"line one"},{"type":"text","text":"line two"}]}]},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages[0].content, "[Tool result: line one\nline two]");
    }

    #[test]
    fn test_tool_result_long_inner_truncated() {
        let long = "z".repeat(300);
        let content = format!(
            r#"{{"type":"user","message":{{"role":"user","content":[{{"type":"tool_result","content":"{long}"}}]}},"timestamp":"2026-02-20T09:00:01Z"}}"#
        );
        let file = create_test_file(&content);
        let messages = parse_transcript(file.path()).unwrap();
        // "[Tool result: " + 200 chars + "]"
        let inner = messages[0]
            .content
            .strip_prefix("[Tool result: ")
            .and_then(|s| s.strip_suffix(']'))
            .unwrap();
        assert_eq!(inner.chars().count(), 200);
        assert!(inner.ends_with("..."));
    }

    #[test]
    fn test_mixed_blocks_text_and_tool_result() {
        let content = r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"here is the output"},{"type":"tool_result","content":"ok"}]},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages[0].content, "here is the output\n[Tool result: ok]");
    }

    #[test]
    fn test_unknown_blocks_ignored() {
        let content = r#"{"type":"user","message":{"role":"user","content":[{"type":"image","source":{"data":"..."}},{"type":"text","text":"caption"}]},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages[0].content, "caption");
    }

    #[test]
    fn test_empty_user_content_suppressed() {
        let content = r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":""}]},"timestamp":"2026-02-20T09:00:01Z"}"#;
        let file = create_test_file(content);
        assert!(parse_transcript(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_timestamp_is_empty_string() {
        let content = r#"{"type":"user","message":{"role":"user","content":"no clock"}}"#;
        let file = create_test_file(content);
        let messages = parse_transcript(file.path()).unwrap();
        assert_eq!(messages[0].timestamp, "");
    }

    #[test]
    fn test_nonexistent_file_is_error() {
        assert!(parse_transcript(Path::new("/nonexistent/transcript.jsonl")).is_err());
    }
}
