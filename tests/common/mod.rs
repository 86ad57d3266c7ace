//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for a session log root (the `~/.claude/projects` layout)
pub struct LogDirBuilder {
    temp_dir: TempDir,
}

impl LogDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Path of the log root
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a project directory holding the given session files
    pub fn with_project(self, dir_name: &str, sessions: &[SessionFileBuilder]) -> Self {
        let project_dir = self.temp_dir.path().join(dir_name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");

        for session in sessions {
            session.create_in(&project_dir);
        }

        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for LogDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `<session-id>.jsonl` file
pub struct SessionFileBuilder {
    session_id: String,
    lines: Vec<String>,
}

impl SessionFileBuilder {
    pub fn new(session_id: &str) -> Self {
        Self { session_id: session_id.to_string(), lines: Vec::new() }
    }

    pub fn with_record(mut self, record: RecordLineBuilder) -> Self {
        self.lines.push(record.to_json());
        self
    }

    /// Add a line verbatim (malformed JSON, summaries, blank lines)
    pub fn with_raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn file_name(&self) -> String {
        format!("{}.jsonl", self.session_id)
    }

    pub fn content(&self) -> String {
        let mut content = self.lines.join("\n");
        content.push('\n');
        content
    }

    /// Create the file in the given directory
    pub fn create_in(&self, dir: &Path) -> PathBuf {
        let file_path = dir.join(self.file_name());
        let mut file = fs::File::create(&file_path).expect("Failed to create session file");
        file.write_all(self.content().as_bytes()).expect("Failed to write session file");
        file_path
    }
}

/// Builder for one `user`/`assistant` log line
pub struct RecordLineBuilder {
    role: &'static str,
    content: Value,
    timestamp: Option<String>,
    cwd: Option<String>,
    git_branch: Option<String>,
    uuid: Option<String>,
}

impl RecordLineBuilder {
    pub fn user(text: &str) -> Self {
        Self::new("user", json!(text))
    }

    pub fn assistant(text: &str) -> Self {
        Self::new("assistant", json!([{ "type": "text", "text": text }]))
    }

    fn new(role: &'static str, content: Value) -> Self {
        Self {
            role,
            content,
            timestamp: Some("2024-01-15T10:30:00Z".to_string()),
            cwd: Some("/work/api".to_string()),
            git_branch: None,
            uuid: None,
        }
    }

    /// Replace the content with a list of content blocks
    pub fn blocks(mut self, blocks: Value) -> Self {
        self.content = blocks;
        self
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    pub fn no_timestamp(mut self) -> Self {
        self.timestamp = None;
        self
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(cwd.to_string());
        self
    }

    pub fn branch(mut self, branch: &str) -> Self {
        self.git_branch = Some(branch.to_string());
        self
    }

    pub fn uuid(mut self, uuid: &str) -> Self {
        self.uuid = Some(uuid.to_string());
        self
    }

    pub fn to_json(&self) -> String {
        let mut line = json!({
            "type": self.role,
            "message": { "role": self.role, "content": self.content },
        });
        let object = line.as_object_mut().expect("log line is an object");
        if let Some(ts) = &self.timestamp {
            object.insert("timestamp".into(), json!(ts));
        }
        if let Some(cwd) = &self.cwd {
            object.insert("cwd".into(), json!(cwd));
        }
        if let Some(branch) = &self.git_branch {
            object.insert("gitBranch".into(), json!(branch));
        }
        if let Some(uuid) = &self.uuid {
            object.insert("uuid".into(), json!(uuid));
        }
        line.to_string()
    }
}

/// A small corpus used across test files: two projects, three sessions
pub fn sample_log_dir() -> LogDirBuilder {
    LogDirBuilder::new()
        .with_project(
            "-work-api",
            &[
                SessionFileBuilder::new("aaaa1111")
                    .with_record(
                        RecordLineBuilder::user("The auth middleware rejects valid tokens")
                            .timestamp("2024-01-10T09:00:00Z")
                            .branch("main"),
                    )
                    .with_record(
                        RecordLineBuilder::assistant("Fixed the token expiry check in auth.rs")
                            .timestamp("2024-01-10T09:05:00Z")
                            .branch("main"),
                    ),
                SessionFileBuilder::new("bbbb2222")
                    .with_record(
                        RecordLineBuilder::user("Add pagination to the list endpoint")
                            .timestamp("2024-02-01T12:00:00Z"),
                    )
                    .with_record(
                        RecordLineBuilder::assistant("Pagination added with cursor support")
                            .timestamp("2024-02-01T12:10:00Z"),
                    ),
            ],
        )
        .with_project(
            "-work-web",
            &[SessionFileBuilder::new("cccc3333")
                .with_record(
                    RecordLineBuilder::user("Login page shows auth error after refresh")
                        .timestamp("2024-03-05T08:00:00Z")
                        .cwd("/work/web")
                        .branch("feature/login"),
                )
                .with_record(
                    RecordLineBuilder::assistant("The session cookie was not persisted")
                        .timestamp("2024-03-05T08:02:00Z")
                        .cwd("/work/web"),
                )],
        )
}
