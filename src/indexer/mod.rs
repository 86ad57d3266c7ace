//! Discovery and ingestion of session logs into a [`crate::search::HistoryIndex`]
//!
//! [`builder::build_index`] does a one-shot build; [`builder::refresh_index`] brings a
//! previously stored index up to date, reading only what changed since the last run.

pub mod builder;
pub mod discovery;

pub use builder::{
    FailedFile, IngestReport, Ingestor, RefreshReport, Refreshed, build_index, refresh_index,
};
pub use discovery::{discover_session_files, is_session_file};
