//! Error types for ingestion and session lookup.
//!
//! Malformed lines never surface here; parsers absorb them and report them in
//! their results. What remains are failures the caller has to see: a log file
//! that cannot be opened or read, and session lookups that did not resolve.

use std::io;
use std::path::PathBuf;

/// I/O failure while reading a session log file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to open session log {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read session log {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A session id that did not resolve to exactly one session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("No session found matching '{0}'")]
    NotFound(String),

    #[error("Session prefix '{prefix}' is ambiguous ({} matches)", candidates.len())]
    Ambiguous { prefix: String, candidates: Vec<String> },
}
