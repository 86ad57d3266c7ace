//! JSONL parsers for Claude Code session log files
//!
//! # Error Handling Strategy
//!
//! Parsing follows a **skip-and-continue** approach:
//!
//! - **Individual line failures**: Malformed lines (bad UTF-8, bad JSON, conversation
//!   entries of the wrong shape) are logged, recorded with their line number and skipped.
//!   A single bad line never fails a file.
//!
//! - **Entries without content**: Well-formed entries lacking a role or any text are
//!   dropped and counted separately from malformed lines.
//!
//! - **Interrupted writes**: An unterminated last line that does not parse is left
//!   unconsumed so it can be picked up once the writer finishes it.
//!
//! - **Error propagation**: Only failures to open or read the file itself are returned,
//!   as [`crate::error::IngestError`].

pub mod content;
pub mod conversation;
pub mod deserializers;

pub use content::normalize;
pub use conversation::{
    ParsedSession, SkippedLine, parse_session_file, parse_session_file_from, session_id_for,
};
