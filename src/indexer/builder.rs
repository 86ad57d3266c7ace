//! Index building for Claude Code session logs.
//!
//! # Error Handling Strategy
//!
//! - **Missing root**: no log directory means an empty corpus, not an error
//! - **Line-level errors**: malformed lines are skipped by the parser and totalled here
//! - **File-level errors**: a log file that cannot be opened or read is logged, listed in
//!   the report and left out; the rest of the corpus is still indexed
//! - **Failure threshold**: the build fails when more than half of the discovered files
//!   cannot be read, which points at a permissions or storage problem rather than one
//!   bad file

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::discovery::discover_session_files;
use crate::error::IngestError;
use crate::index_storage::{FileChange, FileStat, FileState, StoreMetadata, prefix_digest};
use crate::models::Session;
use crate::parsers::{ParsedSession, parse_session_file, parse_session_file_from};
use crate::search::HistoryIndex;

/// Reads session logs from one root directory.
///
/// The root is always supplied by the caller; there is no built-in default.
#[derive(Debug, Clone)]
pub struct Ingestor {
    root: PathBuf,
}

impl Ingestor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily enumerate the session log files under the root
    pub fn discover(&self) -> impl Iterator<Item = PathBuf> + use<> {
        discover_session_files(&self.root)
    }

    pub fn parse(&self, path: &Path) -> Result<ParsedSession, IngestError> {
        parse_session_file(path)
    }

    /// Parse every discovered log file into sessions.
    pub fn ingest(&self) -> IngestReport {
        let mut report = IngestReport::default();
        let mut seen_ids = BTreeSet::new();

        for path in self.discover() {
            report.files += 1;
            match self.parse(&path) {
                Ok(parsed) => {
                    report.skipped_lines += parsed.skipped.len();
                    report.dropped_records += parsed.dropped;
                    if !seen_ids.insert(parsed.session.id.clone()) {
                        warn!(
                            "Skipping {}: session id {} already taken by another file",
                            path.display(),
                            parsed.session.id
                        );
                        continue;
                    }
                    report.sessions.push(parsed.session);
                }
                Err(e) => {
                    warn!("{}", e);
                    report.failed.push(FailedFile { path, error: e.to_string() });
                }
            }
        }

        report
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a full ingest pass
#[derive(Debug, Default)]
pub struct IngestReport {
    pub sessions: Vec<Session>,
    pub files: usize,
    pub failed: Vec<FailedFile>,
    pub skipped_lines: usize,
    pub dropped_records: usize,
}

/// Build an index over every session log under `root`.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use ai_history_search::build_index;
///
/// let root = PathBuf::from("/Users/alice/.claude/projects");
/// let index = build_index(&root)?;
/// println!("Indexed {} sessions", index.session_count());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_index(root: &Path) -> Result<HistoryIndex> {
    let report = Ingestor::new(root).ingest();
    check_failure_rate(report.failed.len(), report.files)?;
    Ok(HistoryIndex::build(report.sessions))
}

/// Counters from a refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub files_scanned: usize,
    /// Read from the start (new, rewritten, or full rebuild)
    pub files_parsed: usize,
    /// Only appended bytes were read
    pub files_appended: usize,
    pub files_unchanged: usize,
    pub files_removed: usize,
    pub failed: Vec<FailedFile>,
    pub records_added: usize,
    pub skipped_lines: usize,
    pub dropped_records: usize,
    /// Files ending in a partial line that will be re-read once complete
    pub pending_tails: usize,
}

/// The outcome of [`refresh_index`]: a complete new index and its metadata
#[derive(Debug)]
pub struct Refreshed {
    pub index: HistoryIndex,
    pub metadata: StoreMetadata,
    pub report: RefreshReport,
}

/// Bring an index up to date with the log files under the ingestor's root.
///
/// With `previous = None` (or a previous store built for a different root)
/// every file is parsed from scratch. Otherwise each file is compared with
/// its recorded size and mtime: unchanged files are skipped, grown files whose
/// already-read bytes are intact are read from where the last refresh stopped,
/// anything else is re-parsed,
/// and sessions whose files disappeared are dropped. The result matches a
/// full rebuild over the same files.
pub fn refresh_index(
    ingestor: &Ingestor,
    previous: Option<(HistoryIndex, StoreMetadata)>,
) -> Result<Refreshed> {
    let (mut index, mut files) = match previous {
        Some((index, metadata)) if metadata.root == ingestor.root() => (index, metadata.files),
        Some((_, metadata)) => {
            info!(
                "Store was built for {}, rebuilding for {}",
                metadata.root.display(),
                ingestor.root().display()
            );
            (HistoryIndex::new(), BTreeMap::new())
        }
        None => (HistoryIndex::new(), BTreeMap::new()),
    };
    let mut report = RefreshReport::default();
    let mut seen = BTreeSet::new();

    for path in ingestor.discover() {
        report.files_scanned += 1;
        let key = path.to_string_lossy().into_owned();
        seen.insert(key.clone());

        let stat = match FileStat::from_path(&path) {
            Ok(stat) => stat,
            Err(e) => {
                warn!("Failed to stat session log {}: {}", path.display(), e);
                report.failed.push(FailedFile { path, error: e.to_string() });
                continue;
            }
        };

        let change = files.get(&key).map(|state| state.detect_change(&path, &stat));
        let outcome = match (change, files.get(&key)) {
            (Some(FileChange::Unchanged), _) => {
                report.files_unchanged += 1;
                continue;
            }
            (Some(FileChange::Grown), Some(state)) => {
                append_file(&mut index, &path, state, stat, &mut report)
            }
            _ => reparse_file(&mut index, &path, files.get(&key), stat, &mut report),
        };

        match outcome {
            Ok(state) => {
                files.insert(key, state);
            }
            Err(e) => {
                warn!("{}", e);
                report.failed.push(FailedFile { path, error: e.to_string() });
            }
        }
    }

    let vanished: Vec<String> = files.keys().filter(|key| !seen.contains(*key)).cloned().collect();
    for key in vanished {
        if let Some(state) = files.remove(&key) {
            debug!("Session log {} is gone, dropping session {}", key, state.session_id);
            if index.session(&state.session_id).is_some_and(|s| s.source == Path::new(&key)) {
                index.remove_session(&state.session_id);
            }
            report.files_removed += 1;
        }
    }

    check_failure_rate(report.failed.len(), report.files_scanned)?;

    let metadata = StoreMetadata::new(ingestor.root(), files);
    Ok(Refreshed { index, metadata, report })
}

/// Read only the bytes appended since the last refresh.
fn append_file(
    index: &mut HistoryIndex,
    path: &Path,
    state: &FileState,
    stat: FileStat,
    report: &mut RefreshReport,
) -> Result<FileState, IngestError> {
    let parsed = parse_session_file_from(path, state.consumed_bytes, state.next_line)?;
    let prefix_digest = fingerprint(path, parsed.consumed_bytes)?;
    report.files_appended += 1;
    tally(report, &parsed);

    let ParsedSession { session, consumed_bytes, next_line, .. } = parsed;
    if index.session(&state.session_id).is_some_and(|s| s.source == path) {
        index.append_records(&state.session_id, session.records);
    } else if !session.is_empty() && !id_taken_by_other_file(index, &session) {
        // The file held no records before, so the session starts now
        index.upsert_session(session);
    }

    Ok(FileState {
        mtime_secs: stat.mtime_secs,
        size: stat.size,
        consumed_bytes,
        next_line,
        session_id: state.session_id.clone(),
        prefix_digest,
    })
}

/// Read a file from the start, replacing whatever the index held for it.
fn reparse_file(
    index: &mut HistoryIndex,
    path: &Path,
    previous: Option<&FileState>,
    stat: FileStat,
    report: &mut RefreshReport,
) -> Result<FileState, IngestError> {
    let parsed = parse_session_file(path)?;
    let prefix_digest = fingerprint(path, parsed.consumed_bytes)?;
    report.files_parsed += 1;
    tally(report, &parsed);

    if let Some(previous) = previous
        && index.session(&previous.session_id).is_some_and(|s| s.source == path)
    {
        index.remove_session(&previous.session_id);
    }

    let ParsedSession { session, consumed_bytes, next_line, .. } = parsed;
    let session_id = session.id.clone();
    if id_taken_by_other_file(index, &session) {
        warn!(
            "Skipping {}: session id {} already taken by another file",
            path.display(),
            session_id
        );
    } else {
        index.upsert_session(session);
    }

    Ok(FileState {
        mtime_secs: stat.mtime_secs,
        size: stat.size,
        consumed_bytes,
        next_line,
        session_id,
        prefix_digest,
    })
}

fn fingerprint(path: &Path, consumed_bytes: u64) -> Result<u64, IngestError> {
    prefix_digest(path, consumed_bytes)
        .map_err(|source| IngestError::Read { path: path.to_path_buf(), source })
}

fn id_taken_by_other_file(index: &HistoryIndex, session: &Session) -> bool {
    index.session(&session.id).is_some_and(|existing| existing.source != session.source)
}

fn tally(report: &mut RefreshReport, parsed: &ParsedSession) {
    report.records_added += parsed.session.len();
    report.skipped_lines += parsed.skipped.len();
    report.dropped_records += parsed.dropped;
    if parsed.pending_tail {
        report.pending_tails += 1;
    }
}

fn check_failure_rate(failed: usize, total: usize) -> Result<()> {
    if total > 0 && failed * 2 > total {
        bail!(
            "Index building failed: {}/{} session logs could not be read ({}% failure rate)",
            failed,
            total,
            failed * 100 / total
        );
    }
    Ok(())
}
