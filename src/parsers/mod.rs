//! Message decoders for both storage backends.
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI
//! tools:
//!
//! - **Individual line failures**: a malformed transcript line is logged to
//!   stderr and skipped, so one bad line never discards a session's
//!   remaining messages.
//!
//! - **Individual block failures**: content blocks and message parts are
//!   decoded element by element; an unrecognized or malformed block
//!   contributes nothing instead of failing its message.
//!
//! - **Empty messages**: a message that yields neither text nor tool calls
//!   is suppressed, not emitted as an empty record. This is normal
//!   filtering, never an error.
//!
//! - **Error propagation**: only I/O failures (unreadable transcript file)
//!   surface as `anyhow::Result` errors, and callers downgrade those to a
//!   warning plus a skipped session.

pub mod parts;
pub mod transcript;

pub use parts::process_parts;
pub use transcript::parse_transcript;
