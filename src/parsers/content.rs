use std::path::PathBuf;

use serde_json::Value;
use tracing::warn;

use crate::models::{ContentBlock, LogEntry, MessageContent, Record, Role};
use crate::utils::{truncate_chars, validate_project_path};

/// Tool results can be whole file dumps; only their head is worth indexing.
pub const MAX_TOOL_RESULT_CHARS: usize = 500;

/// Normalize a raw log entry into a [`Record`].
///
/// Returns `None` when the entry has no recognizable role or carries no
/// non-empty text; such entries are dropped without being treated as errors.
pub fn normalize(entry: LogEntry) -> Option<Record> {
    let message = entry.message?;
    let role = message
        .role
        .as_deref()
        .and_then(Role::parse)
        .or_else(|| Role::parse(&entry.entry_type))?;

    let (segments, tool_names) = match message.content {
        Some(content) => extract_content(content),
        None => (Vec::new(), Vec::new()),
    };
    if segments.is_empty() {
        return None;
    }

    let cwd = entry.cwd.filter(|c| !c.trim().is_empty()).and_then(|c| {
        let path = PathBuf::from(&c);
        match validate_project_path(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Ignoring suspicious working directory {}: {}", c, e);
                None
            }
        }
    });

    Some(Record {
        role,
        segments,
        timestamp: entry.timestamp,
        uuid: entry.uuid.filter(|u| !u.is_empty()),
        cwd,
        git_branch: entry.git_branch.filter(|b| !b.trim().is_empty()),
        model: message.model.filter(|m| !m.is_empty()),
        tool_names,
    })
}

/// Split message content into display segments and the names of tools used.
pub fn extract_content(content: MessageContent) -> (Vec<String>, Vec<String>) {
    let mut segments = Vec::new();
    let mut tool_names = Vec::new();

    match content {
        MessageContent::Text(text) => push_segment(&mut segments, text),
        MessageContent::Blocks(blocks) => {
            for block in blocks {
                match block {
                    ContentBlock::Text { text } => push_segment(&mut segments, text),
                    ContentBlock::ToolUse { name } => {
                        if !name.is_empty() {
                            tool_names.push(name);
                        }
                    }
                    ContentBlock::ToolResult { content: Some(value) } => {
                        let text = tool_result_text(&value);
                        push_segment(&mut segments, truncate_chars(&text, MAX_TOOL_RESULT_CHARS));
                    }
                    ContentBlock::ToolResult { content: None } | ContentBlock::Other => {}
                }
            }
        }
    }

    (segments, tool_names)
}

fn push_segment(segments: &mut Vec<String>, text: String) {
    if !text.trim().is_empty() {
        segments.push(text);
    }
}

/// Tool result content is a string, a list of text blocks, or arbitrary JSON.
fn tool_result_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                other => other.get("text").and_then(Value::as_str).map(str::to_string),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
