//! Store metadata for incremental refresh

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store schema version for invalidation on format changes
pub const STORE_VERSION: u32 = 2;

/// How many bytes before the read position are fingerprinted
const PREFIX_CHECK_BYTES: u64 = 4096;

/// Top-level store metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub version: u32,
    pub root: PathBuf,
    pub built_at: DateTime<Utc>,
    /// Keyed by the log file path
    pub files: BTreeMap<String, FileState>,
    /// Digest of the index file this metadata was saved with; set by `save_index`
    #[serde(default)]
    pub index_digest: u64,
}

impl StoreMetadata {
    pub fn new(root: &Path, files: BTreeMap<String, FileState>) -> Self {
        Self {
            version: STORE_VERSION,
            root: root.to_path_buf(),
            built_at: Utc::now(),
            files,
            index_digest: 0,
        }
    }
}

pub(crate) fn content_digest(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// What was read from one log file at the last refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    pub mtime_secs: i64,
    pub size: u64,
    /// Bytes turned into records or skipped; a pending partial line is not included
    pub consumed_bytes: u64,
    pub next_line: usize,
    pub session_id: String,
    /// Digest of the consumed bytes just before `consumed_bytes`
    pub prefix_digest: u64,
}

/// Size and modification time of a log file right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub mtime_secs: i64,
    pub size: u64,
}

impl FileStat {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let metadata = fs::metadata(path)?;
        let mtime = metadata.modified()?;
        let mtime_secs = mtime.duration_since(SystemTime::UNIX_EPOCH)?.as_secs() as i64;

        Ok(Self { mtime_secs, size: metadata.len() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    Unchanged,
    /// Larger than before: assumed append-only growth
    Grown,
    /// Shrunk, or same size with a new mtime: must be re-read from the start
    Rewritten,
}

/// Fingerprint of up to the last 4 KiB of the first `consumed_bytes` of a file.
pub fn prefix_digest(path: &Path, consumed_bytes: u64) -> io::Result<u64> {
    let start = consumed_bytes.saturating_sub(PREFIX_CHECK_BYTES);
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(start))?;

    let mut window = Vec::with_capacity((consumed_bytes - start) as usize);
    file.take(consumed_bytes - start).read_to_end(&mut window)?;
    Ok(content_digest(&window))
}

impl FileState {
    /// Compare against the file as it is now, checking that a grown file
    /// still starts with the bytes already read.
    pub fn detect_change(&self, path: &Path, current: &FileStat) -> FileChange {
        match self.change(current) {
            FileChange::Grown if !self.prefix_intact(path) => FileChange::Rewritten,
            change => change,
        }
    }

    fn prefix_intact(&self, path: &Path) -> bool {
        prefix_digest(path, self.consumed_bytes).is_ok_and(|digest| digest == self.prefix_digest)
    }

    /// Size and mtime comparison only
    pub fn change(&self, current: &FileStat) -> FileChange {
        if current.size > self.size {
            FileChange::Grown
        } else if current.size == self.size && current.mtime_secs == self.mtime_secs {
            FileChange::Unchanged
        } else {
            FileChange::Rewritten
        }
    }
}
