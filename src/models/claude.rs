use serde::Deserialize;
use serde_json::Value;

/// Parsed `sessions-index.json` manifest for one project directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionsIndex {
    #[serde(default)]
    pub entries: Vec<IndexEntry>,
}

/// One manifest entry. Everything defaults so that sparse older manifests
/// still deserialize; a type-mismatched manifest fails as a whole and the
/// caller falls back to scanning for transcript files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexEntry {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub created: String,
    pub modified: String,
    #[serde(rename = "firstPrompt")]
    pub first_prompt: String,
    pub summary: String,
    #[serde(rename = "projectPath")]
    pub project_path: String,
    #[serde(rename = "isSidechain")]
    pub is_sidechain: bool,
    #[serde(rename = "isMeta")]
    pub is_meta: bool,
    #[serde(rename = "fullPath")]
    pub full_path: String,
}

/// One line of a session transcript `.jsonl` file.
///
/// Only `user` and `assistant` lines are decoded into messages; other line
/// types (summaries, snapshots, system events) are filtered out before this
/// struct is used.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptLine {
    #[serde(rename = "type", default)]
    pub entry_type: String,
    #[serde(default)]
    pub message: Option<MessageBody>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub content: Option<BlockContent>,
}

/// Message content is either a bare string (plain user prompts) or an array
/// of typed blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BlockContent {
    Text(String),
    Blocks(Vec<Value>),
}

/// A typed content block. Blocks are decoded individually from the raw
/// array so one malformed element never poisons its neighbours; the
/// catch-all arm swallows block kinds this pipeline does not render
/// (images, server tool use, whatever ships next).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default = "empty_object")]
        input: Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        content: ToolResultContent,
    },
    #[serde(rename = "thinking")]
    Thinking,
    #[serde(other)]
    Unknown,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Inner content of a `tool_result` block: a plain string, a nested block
/// array, or something else entirely (rendered as nothing).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(Vec<Value>),
    Other(Value),
}

impl Default for ToolResultContent {
    fn default() -> Self {
        ToolResultContent::Text(String::new())
    }
}
