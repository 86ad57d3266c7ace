use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// One `user` or `assistant` line of a session log, as written by Claude Code.
///
/// Only the fields the indexer reads are modelled; everything else on the line
/// is ignored. Every field is optional at this level so that a line with a
/// missing field is dropped during normalization rather than rejected as
/// malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub message: Option<LogMessage>,
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default, rename = "parentUuid")]
    pub parent_uuid: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default, rename = "gitBranch")]
    pub git_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Message content is either a bare string or a list of typed blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        #[serde(default)]
        name: String,
    },
    ToolResult {
        #[serde(default)]
        content: Option<Value>,
    },
    /// thinking, image and any block type added later
    #[serde(other)]
    Other,
}
