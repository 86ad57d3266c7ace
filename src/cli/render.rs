//! Plain-text rendering for command output.
//!
//! Everything printed from log content goes through [`clean`] so escape
//! sequences stored in a session log cannot reach the terminal.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::LookupError;
use crate::indexer::RefreshReport;
use crate::models::{IndexStats, Record, SearchResult, Session, SessionSummary};
use crate::utils::{ellipsize, format_path_with_tilde, project_name, strip_ansi_codes, truncate_chars};

pub const NO_RESULTS: &str = "No relevant conversation history found.";
pub const NO_SESSIONS: &str = "No sessions indexed.";
const SHORT_ID_CHARS: usize = 8;
const RESULT_SEPARATOR: &str = "\n---\n\n";

fn clean(text: &str) -> String {
    strip_ansi_codes(text)
}

fn date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "?".to_string())
}

fn datetime(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()).unwrap_or_else(|| "?".to_string())
}

fn short_id(id: &str) -> String {
    truncate_chars(id, SHORT_ID_CHARS)
}

fn location(project_path: Option<&Path>, git_branch: Option<&str>) -> String {
    let project = clean(&project_name(project_path));
    match git_branch {
        Some(branch) => format!("{} ({})", project, clean(branch)),
        None => project,
    }
}

/// Wrap every word whose folded form is one of `tokens` in `**`.
///
/// Words are split the same way the index tokenizes text, so exactly the
/// words that produced a hit are marked.
pub fn highlight(text: &str, tokens: &BTreeSet<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start: Option<usize> = None;

    let flush = |out: &mut String, word: &str| {
        if tokens.contains(&word.to_lowercase()) {
            out.push_str("**");
            out.push_str(word);
            out.push_str("**");
        } else {
            out.push_str(word);
        }
    };

    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            word_start.get_or_insert(idx);
            continue;
        }
        if let Some(start) = word_start.take() {
            flush(&mut out, &text[start..idx]);
        }
        out.push(ch);
    }
    if let Some(start) = word_start {
        flush(&mut out, &text[start..]);
    }

    out
}

pub fn search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    let blocks: Vec<String> = results.iter().map(search_result).collect();
    blocks.join(RESULT_SEPARATOR)
}

fn search_result(result: &SearchResult) -> String {
    let tokens: BTreeSet<String> = result.matched_tokens.iter().cloned().collect();
    let mut out = format!(
        "[{}] {} - id:{} - matched: {}\n",
        date(result.last_activity),
        location(result.project_path.as_deref(), result.git_branch.as_deref()),
        short_id(&result.session_id),
        result.matched_tokens.join(", "),
    );

    for (i, snippet) in result.snippets.iter().enumerate() {
        if i > 0 {
            out.push_str("  ...\n");
        }
        for line in &snippet.lines {
            let marker = if line.is_match { '>' } else { ' ' };
            let text = clean(&line.text);
            let text = if line.is_match { highlight(&text, &tokens) } else { text };
            out.push_str(&format!("{} {}: {}\n", marker, line.role.as_str().to_uppercase(), text));
        }
    }

    out
}

pub fn session_list(sessions: &[SessionSummary]) -> String {
    if sessions.is_empty() {
        return NO_SESSIONS.to_string();
    }

    let mut lines = vec!["Recent sessions:".to_string()];
    for s in sessions {
        lines.push(format!(
            "- {}: {} ({}) - {} msgs - id:{}",
            date(s.ended_at),
            clean(&project_name(s.project_path.as_deref())),
            s.git_branch.as_deref().map(clean).unwrap_or_else(|| "-".to_string()),
            s.record_count,
            short_id(&s.id),
        ));
    }
    lines.join("\n")
}

pub fn session_transcript(session: &Session, records: &[Record], max_chars: usize) -> String {
    let mut out = format!(
        "Session {} in {} ({}):\n\n",
        clean(&session.id),
        clean(&project_name(session.project_path.as_deref())),
        session.git_branch.as_deref().map(clean).unwrap_or_else(|| "-".to_string()),
    );

    for record in records {
        out.push_str(&format!(
            "**{}**: {}\n\n",
            record.role.as_str().to_uppercase(),
            ellipsize(&clean(&record.text()), max_chars)
        ));
    }

    let remaining = session.len().saturating_sub(records.len());
    if remaining > 0 {
        out.push_str(&format!("({} more records not shown)\n", remaining));
    }

    out
}

pub fn lookup_error(error: &LookupError) -> String {
    match error {
        LookupError::NotFound(_) => error.to_string(),
        LookupError::Ambiguous { candidates, .. } => {
            let mut lines = vec![format!("{}:", error)];
            lines.extend(candidates.iter().map(|id| format!("- {}", id)));
            lines.join("\n")
        }
    }
}

pub fn stats(stats: &IndexStats, root: &Path, store: &Path) -> String {
    let lines = [
        "Claude Code History Statistics".to_string(),
        "================================".to_string(),
        format!("Sessions: {}", stats.sessions),
        format!("Records: {}", stats.records),
        format!("  User: {}", stats.user_records),
        format!("  Assistant: {}", stats.assistant_records),
        format!("Distinct tokens: {}", stats.tokens),
        format!("Oldest activity: {}", datetime(stats.oldest_activity)),
        format!("Newest activity: {}", datetime(stats.newest_activity)),
        String::new(),
        format!("Log root: {}", format_path_with_tilde(root)),
        format!("Store: {}", format_path_with_tilde(store)),
    ];
    lines.join("\n")
}

pub fn refresh_summary(report: &RefreshReport, stats: &IndexStats, root: &Path) -> String {
    let mut lines = vec![
        format!(
            "Indexed {} sessions ({} records) from {} files in {}",
            stats.sessions,
            stats.records,
            report.files_scanned,
            format_path_with_tilde(root)
        ),
        format!(
            "  parsed: {}, appended: {}, unchanged: {}, removed: {}",
            report.files_parsed, report.files_appended, report.files_unchanged, report.files_removed
        ),
        format!(
            "  skipped lines: {}, dropped entries: {}",
            report.skipped_lines, report.dropped_records
        ),
    ];

    if !report.failed.is_empty() {
        lines.push(format!("  failed files: {}", report.failed.len()));
        for failed in &report.failed {
            lines.push(format!("    {}", failed.error));
        }
    }

    lines.join("\n")
}

pub fn missing_store(store: &Path) -> String {
    format!(
        "No index found at {}. Run: ai-history-search index",
        format_path_with_tilde(store)
    )
}
