//! Persistent index store with incremental refresh
//!
//! Keeps a built index on disk so building and querying can happen in separate
//! runs. Uses a two-file layout:
//! - `store-metadata.json`: JSON metadata (version, root, per-file read positions,
//!   digest of the index file it belongs to)
//! - `history-index.bin`: Bincode-serialized [`crate::search::HistoryIndex`]
//!
//! Default location: a per-root subdirectory of the platform cache directory
//! (see [`default_store_dir`]).

pub mod metadata;
pub mod persistence;

pub use metadata::{FileChange, FileStat, FileState, STORE_VERSION, StoreMetadata, prefix_digest};
pub use persistence::{default_store_dir, load_index, save_index, store_exists};
