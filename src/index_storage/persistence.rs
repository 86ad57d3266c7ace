//! Store persistence: load/save with atomic writes

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bincode::config;
use tracing::warn;

use super::metadata::{STORE_VERSION, StoreMetadata, content_digest};
use crate::search::HistoryIndex;

const METADATA_FILENAME: &str = "store-metadata.json";
const INDEX_FILENAME: &str = "history-index.bin";

/// Compute hash of the root path for store subdirectory isolation
/// Returns the first 12 hex characters
fn compute_path_hash(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    // Canonicalize when possible so symlinked and relative roots share a store;
    // a root that does not exist yet hashes as given
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    let hash = hasher.finish();

    format!("{:016x}", hash)[..12].to_string()
}

/// Platform-specific default store directory for a log root
///
/// - macOS: `~/Library/Caches/ai-history-search/<hash>/`
/// - Linux: `~/.cache/ai-history-search/<hash>/`
/// - Windows: `%LOCALAPPDATA%\ai-history-search\<hash>\`
pub fn default_store_dir(root: &Path) -> Result<PathBuf> {
    let cache_base = dirs::cache_dir().context("Failed to get platform cache directory")?;
    Ok(cache_base.join("ai-history-search").join(compute_path_hash(root)))
}

pub fn metadata_path(store_dir: &Path) -> PathBuf {
    store_dir.join(METADATA_FILENAME)
}

pub fn index_path(store_dir: &Path) -> PathBuf {
    store_dir.join(INDEX_FILENAME)
}

/// Whether a store has been written to `store_dir`
pub fn store_exists(store_dir: &Path) -> bool {
    metadata_path(store_dir).exists() && index_path(store_dir).exists()
}

/// Load a stored index and its metadata
/// Returns None if the store is missing, from another version, or if the index
/// file is not the one the metadata was saved with (caller should rebuild)
pub fn load_index(store_dir: &Path) -> Result<Option<(HistoryIndex, StoreMetadata)>> {
    if !store_exists(store_dir) {
        return Ok(None);
    }

    let metadata_json =
        fs::read_to_string(metadata_path(store_dir)).context("Failed to read store metadata")?;
    let metadata: StoreMetadata =
        serde_json::from_str(&metadata_json).context("Failed to parse store metadata")?;

    if metadata.version != STORE_VERSION {
        warn!(
            "Store version mismatch (expected {}, found {}), index must be rebuilt",
            STORE_VERSION, metadata.version
        );
        return Ok(None);
    }

    let index_bytes = fs::read(index_path(store_dir)).context("Failed to read index file")?;
    if content_digest(&index_bytes) != metadata.index_digest {
        warn!("Index file does not match store metadata (interrupted save?), index must be rebuilt");
        return Ok(None);
    }
    let index: HistoryIndex = bincode::serde::decode_from_slice(&index_bytes, config::standard())
        .context("Failed to deserialize index")?
        .0;

    Ok(Some((index, metadata)))
}

/// Save index and metadata, each with temp file + rename
///
/// The metadata records a digest of the index bytes. A crash between the two
/// renames leaves old metadata next to a new index; [`load_index`] sees the
/// digest mismatch and reports no store.
pub fn save_index(store_dir: &Path, index: &HistoryIndex, metadata: &StoreMetadata) -> Result<()> {
    fs::create_dir_all(store_dir)
        .with_context(|| format!("Failed to create store directory {}", store_dir.display()))?;

    let index_bytes = bincode::serde::encode_to_vec(index, config::standard())
        .context("Failed to serialize index")?;
    write_atomically(&index_path(store_dir), &index_bytes)?;

    let metadata = StoreMetadata { index_digest: content_digest(&index_bytes), ..metadata.clone() };
    let metadata_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize store metadata")?;
    write_atomically(&metadata_path(store_dir), metadata_json.as_bytes())?;

    Ok(())
}

/// temp file + rename
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, bytes).with_context(|| format!("Failed to write {}", temp.display()))?;
    fs::rename(&temp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
