use serde::Deserialize;
use serde_json::Value;

/// OpenCode session metadata, read from a `ses_*.json` file (legacy layout)
/// or embedded in a `session` database row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionFile {
    pub id: String,
    pub directory: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub time: TimeStamps,
}

/// Millisecond timestamps as stored by OpenCode. Kept as raw JSON values:
/// the legacy writer occasionally emitted floats, and corrupt values must
/// degrade to "unknown" rather than fail the whole file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimeStamps {
    pub created: Option<Value>,
    pub updated: Option<Value>,
}

/// OpenCode message metadata (`msg_*.json` file, or the `data` column of a
/// `message` row). Content lives in the parts, not here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageFile {
    pub id: String,
    pub role: String,
    pub time: TimeStamps,
}

/// One message part (`prt_*.json` file, or the `data` column of a `part`
/// row). Structural parts like step-start/step-finish fall into the
/// catch-all and render as nothing.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Part {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "reasoning")]
    Reasoning {
        #[serde(default)]
        reasoning: String,
    },
    #[serde(rename = "tool")]
    Tool {
        #[serde(default)]
        tool: String,
        #[serde(default)]
        state: Value,
    },
    #[serde(other)]
    Unknown,
}
