use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Session logs are JSONL files, one per session
pub const SESSION_FILE_EXTENSION: &str = "jsonl";

/// Lazily enumerate session log files under `root`.
///
/// Walks the tree in file-name order so repeated runs visit files in the same
/// sequence. Symlinks are not followed. A missing or unreadable root yields an
/// empty sequence: no history yet is a normal state. Unreadable entries
/// further down are logged and skipped.
pub fn discover_session_files(root: &Path) -> impl Iterator<Item = PathBuf> + use<> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) if e.depth() == 0 => {
                debug!("Session log root unavailable: {}", e);
                None
            }
            Err(e) => {
                warn!("Skipping unreadable path while discovering session logs: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_session_file(path))
}

pub fn is_session_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SESSION_FILE_EXTENSION)
}
