//! Data models for session export.
//!
//! Three groups of structures live here:
//!
//! - [`SessionRecord`] / [`NormalizedMessage`] / [`ToolCall`] - the unified
//!   output shape, one JSON object per line
//! - `claude` - raw shapes read from Claude Code storage (sessions index,
//!   transcript lines, content blocks)
//! - `opencode` - raw shapes read from OpenCode storage (session/message
//!   files or database rows, message parts)
//!
//! Input models are deliberately tolerant: fields default when absent and
//! content-block polymorphism uses internally tagged enums with an explicit
//! catch-all for unrecognized kinds.

pub mod claude;
pub mod opencode;
pub mod record;

pub use claude::{
    BlockContent, ContentBlock, IndexEntry, MessageBody, SessionsIndex, ToolResultContent,
    TranscriptLine,
};
pub use opencode::{MessageFile, Part, SessionFile, TimeStamps};
pub use record::{NormalizedMessage, SessionRecord, ToolCall};
