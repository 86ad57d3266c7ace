//! Index & query engine
//!
//! [`HistoryIndex`] keeps ingested sessions together with an inverted index
//! from normalized tokens to record locations. Queries (`search`,
//! `list_sessions`, `show_session`, `stats`) are read-only methods on it;
//! [`SharedIndex`] lets a rebuilt index be swapped in while readers hold
//! snapshots of the previous one.

pub mod filters;
pub mod index;
pub mod query;
pub mod shared;
pub mod tokenizer;

pub use filters::{SearchFilter, parse_since};
pub use index::{HistoryIndex, IndexState, Location};
pub use query::QueryOptions;
pub use shared::SharedIndex;
pub use tokenizer::{tokenize, unique_tokens};
