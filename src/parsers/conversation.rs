use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use super::content::normalize;
use crate::error::IngestError;
use crate::models::{LogEntry, Record, Session};

const ENTRY_TYPE_USER: &str = "user";
const ENTRY_TYPE_ASSISTANT: &str = "assistant";

/// A line that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub reason: String,
}

/// Outcome of reading a session log file (or the tail of one).
#[derive(Debug, Clone)]
pub struct ParsedSession {
    pub session: Session,
    /// Malformed lines, skipped
    pub skipped: Vec<SkippedLine>,
    /// Well-formed conversation lines without a role or any text
    pub dropped: usize,
    /// Byte offset just past the last line that was consumed
    pub consumed_bytes: u64,
    /// Line number the next read should start counting from
    pub next_line: usize,
    /// The file ended in an unterminated line that did not parse yet
    pub pending_tail: bool,
}

enum LineOutcome {
    Blank,
    Record(Record),
    /// Valid JSON that is not a user/assistant entry (summary, system, snapshots...)
    Ignored,
    Dropped,
    Malformed(String),
}

/// Session id for a log file: its file stem.
pub fn session_id_for(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Parse a whole session log file.
///
/// The file is streamed line by line. Malformed lines are logged and skipped;
/// only failures to open or read the file are returned as errors.
pub fn parse_session_file(path: &Path) -> Result<ParsedSession, IngestError> {
    parse_session_file_from(path, 0, 1)
}

/// Parse a session log file starting at `offset` bytes, numbering lines from
/// `first_line`. Used to pick up records appended since the last read.
///
/// An unterminated final line that fails to parse is assumed to be a write in
/// progress: it is neither recorded as malformed nor consumed, so the next
/// read starts at its beginning.
pub fn parse_session_file_from(
    path: &Path,
    offset: u64,
    first_line: usize,
) -> Result<ParsedSession, IngestError> {
    let mut file = File::open(path)
        .map_err(|source| IngestError::Open { path: path.to_path_buf(), source })?;
    if offset > 0 {
        file.seek(SeekFrom::Start(offset))
            .map_err(|source| IngestError::Read { path: path.to_path_buf(), source })?;
    }

    let mut reader = BufReader::new(file);
    let mut parsed = ParsedSession {
        session: Session::new(session_id_for(path), PathBuf::from(path)),
        skipped: Vec::new(),
        dropped: 0,
        consumed_bytes: offset,
        next_line: first_line,
        pending_tail: false,
    };
    let mut total_lines = 0usize;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| IngestError::Read { path: path.to_path_buf(), source })?;
        if read == 0 {
            break;
        }
        let terminated = buf.last() == Some(&b'\n');
        let line_number = parsed.next_line;

        match parse_line(&buf) {
            LineOutcome::Blank => {}
            LineOutcome::Record(record) => {
                total_lines += 1;
                parsed.session.push(record);
            }
            LineOutcome::Ignored => total_lines += 1,
            LineOutcome::Dropped => {
                total_lines += 1;
                parsed.dropped += 1;
            }
            LineOutcome::Malformed(_) if !terminated => {
                debug!("Unterminated line {} in {} left for later", line_number, path.display());
                parsed.pending_tail = true;
                break;
            }
            LineOutcome::Malformed(reason) => {
                total_lines += 1;
                warn!("Skipping line {} in {}: {}", line_number, path.display(), reason);
                parsed.skipped.push(SkippedLine { line_number, reason });
            }
        }

        parsed.consumed_bytes += read as u64;
        parsed.next_line += 1;
    }

    if total_lines > 0 && parsed.skipped.len() * 2 > total_lines {
        warn!(
            "{} of {} lines in {} are malformed; the file may be corrupted",
            parsed.skipped.len(),
            total_lines,
            path.display()
        );
    } else if !parsed.skipped.is_empty() {
        debug!(
            "Parsed {}: {} records ({} skipped)",
            path.display(),
            parsed.session.len(),
            parsed.skipped.len()
        );
    }

    Ok(parsed)
}

fn parse_line(bytes: &[u8]) -> LineOutcome {
    let line = match std::str::from_utf8(bytes) {
        Ok(line) => line.trim(),
        Err(e) => return LineOutcome::Malformed(format!("invalid UTF-8: {}", e)),
    };
    if line.is_empty() {
        return LineOutcome::Blank;
    }

    // Pre-filter on the entry type so other entry kinds never count as malformed
    let value = match serde_json::from_str::<Value>(line) {
        Ok(value) => value,
        Err(e) => return LineOutcome::Malformed(format!("invalid JSON: {}", e)),
    };
    let is_conversation = value
        .get("type")
        .and_then(Value::as_str)
        .map(|t| t == ENTRY_TYPE_USER || t == ENTRY_TYPE_ASSISTANT)
        .unwrap_or(false);
    if !is_conversation {
        return LineOutcome::Ignored;
    }

    match serde_json::from_value::<LogEntry>(value) {
        Ok(entry) => match normalize(entry) {
            Some(record) => LineOutcome::Record(record),
            None => LineOutcome::Dropped,
        },
        Err(e) => LineOutcome::Malformed(format!("unexpected entry shape: {}", e)),
    }
}
