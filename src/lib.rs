//! AI History Search - keyword search over Claude Code session history
//!
//! This library ingests the JSONL session logs Claude Code writes under
//! `~/.claude/projects/` and answers questions about past conversations. It supports:
//!
//! - Discovering and parsing session logs, skipping malformed lines
//! - Building an inverted keyword index over normalized conversation records
//! - Ranked search with context snippets, session listings and transcripts
//! - Storing the index on disk and refreshing it incrementally as logs grow
//!
//! # Example
//!
//! ```no_run
//! use ai_history_search::{QueryOptions, build_index};
//! use std::path::PathBuf;
//!
//! let root = PathBuf::from("/Users/alice/.claude/projects");
//! let index = build_index(&root)?;
//! for result in index.search("auth bug", &QueryOptions::default()) {
//!     println!("{} (score {})", result.session_id, result.score);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod error;
pub mod index_storage;
pub mod indexer;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use error::{IngestError, LookupError};
pub use index_storage::{default_store_dir, load_index, save_index};
pub use indexer::{Ingestor, build_index, refresh_index};
pub use models::{Record, Role, SearchResult, Session, SessionSummary};
pub use parsers::parse_session_file;
pub use search::{HistoryIndex, QueryOptions, SearchFilter, SharedIndex};
pub use utils::paths::format_path_with_tilde;
