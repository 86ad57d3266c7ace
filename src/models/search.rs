use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::session::Role;

/// A session that matched a keyword query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub session_id: String,
    pub project_path: Option<PathBuf>,
    pub git_branch: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
    /// Number of distinct query tokens found in the session
    pub score: usize,
    pub matched_tokens: Vec<String>,
    /// Offsets of every record containing at least one query token
    pub record_offsets: Vec<usize>,
    pub snippets: Vec<Snippet>,
}

/// A run of consecutive records around one or more hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub lines: Vec<SnippetLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetLine {
    pub offset: usize,
    pub role: Role,
    pub timestamp: Option<DateTime<Utc>>,
    pub text: String,
    pub is_match: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub sessions: usize,
    pub records: usize,
    pub user_records: usize,
    pub assistant_records: usize,
    pub tokens: usize,
    pub oldest_activity: Option<DateTime<Utc>>,
    pub newest_activity: Option<DateTime<Utc>>,
}
