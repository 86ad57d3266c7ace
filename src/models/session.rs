use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Case-insensitive parse of `user` / `assistant`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation turn, normalized from a log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub role: Role,
    /// Text segments in display order
    pub segments: Vec<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub uuid: Option<String>,
    pub cwd: Option<PathBuf>,
    pub git_branch: Option<String>,
    pub model: Option<String>,
    pub tool_names: Vec<String>,
}

impl Record {
    /// Segments joined with newlines, the unit that gets tokenized and displayed
    pub fn text(&self) -> String {
        self.segments.join("\n")
    }
}

/// One recorded conversation: the normalized contents of a single log file.
///
/// Records keep the order in which they appear in the file. That order is
/// treated as chronological; timestamps are never used to re-sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub source: PathBuf,
    pub project_path: Option<PathBuf>,
    pub git_branch: Option<String>,
    pub records: Vec<Record>,
}

impl Session {
    pub fn new(id: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            project_path: None,
            git_branch: None,
            records: Vec::new(),
        }
    }

    /// Append a record, adopting its cwd and branch as session metadata if
    /// none has been seen yet.
    pub fn push(&mut self, record: Record) {
        if self.project_path.is_none() {
            self.project_path = record.cwd.clone();
        }
        if self.git_branch.is_none() {
            self.git_branch = record.git_branch.clone();
        }
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.records.iter().find_map(|r| r.timestamp)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.records.iter().rev().find_map(|r| r.timestamp)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            project_path: self.project_path.clone(),
            git_branch: self.git_branch.clone(),
            record_count: self.records.len(),
            started_at: self.started_at(),
            ended_at: self.ended_at(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Most recent activity first; sessions without any timestamp sort last and
/// ties fall back to the id so the order is total.
pub fn by_recency(
    a_id: &str,
    a_ended: Option<DateTime<Utc>>,
    b_id: &str,
    b_ended: Option<DateTime<Utc>>,
) -> Ordering {
    b_ended.cmp(&a_ended).then_with(|| a_id.cmp(b_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub project_path: Option<PathBuf>,
    pub git_branch: Option<String>,
    pub record_count: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(role: Role, text: &str, ts: Option<i64>) -> Record {
        Record {
            role,
            segments: vec![text.to_string()],
            timestamp: ts.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            uuid: None,
            cwd: Some(PathBuf::from("/work/api")),
            git_branch: Some("main".to_string()),
            model: None,
            tool_names: Vec::new(),
        }
    }

    #[test]
    fn test_push_adopts_first_metadata() {
        let mut session = Session::new("abc", "/logs/abc.jsonl");
        session.push(record(Role::User, "hi", Some(100)));

        let mut other = record(Role::Assistant, "hello", Some(200));
        other.cwd = Some(PathBuf::from("/elsewhere"));
        session.push(other);

        assert_eq!(session.project_path, Some(PathBuf::from("/work/api")));
        assert_eq!(session.git_branch.as_deref(), Some("main"));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_time_span_skips_records_without_timestamp() {
        let mut session = Session::new("abc", "/logs/abc.jsonl");
        session.push(record(Role::User, "a", None));
        session.push(record(Role::Assistant, "b", Some(100)));
        session.push(record(Role::User, "c", Some(300)));
        session.push(record(Role::Assistant, "d", None));

        assert_eq!(session.started_at(), Some(Utc.timestamp_opt(100, 0).unwrap()));
        assert_eq!(session.ended_at(), Some(Utc.timestamp_opt(300, 0).unwrap()));
    }

    #[test]
    fn test_by_recency_puts_undated_last() {
        let newer = Some(Utc.timestamp_opt(200, 0).unwrap());
        let older = Some(Utc.timestamp_opt(100, 0).unwrap());

        assert_eq!(by_recency("a", newer, "b", older), Ordering::Less);
        assert_eq!(by_recency("a", None, "b", older), Ordering::Greater);
        assert_eq!(by_recency("a", None, "b", None), Ordering::Less);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("User"), Some(Role::User));
        assert_eq!(Role::parse("assistant"), Some(Role::Assistant));
        assert_eq!(Role::parse("system"), None);
    }
}
