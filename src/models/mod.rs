//! Data models for Claude Code conversation history.
//!
//! - [`LogEntry`] - A raw `user`/`assistant` line from a session log file
//! - [`Session`] / [`Record`] - Normalized conversations and their turns
//! - [`SessionSummary`] - One row of a session listing
//! - [`SearchResult`] - A ranked keyword hit with context snippets
//!
//! Raw models use serde with custom deserializers for timestamps in
//! `parsers::deserializers`.

pub mod history;
pub mod search;
pub mod session;

pub use history::{ContentBlock, LogEntry, LogMessage, MessageContent};
pub use search::{IndexStats, SearchResult, Snippet, SnippetLine};
pub use session::{Record, Role, Session, SessionSummary, by_recency};
