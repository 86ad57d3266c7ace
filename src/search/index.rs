use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::tokenizer::unique_tokens;
use crate::models::{Record, Session};

/// Where a token occurs: a record offset within a session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub session_id: String,
    pub record: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// No sessions ingested; every query answers with an empty result
    Empty,
    Built,
}

/// Inverted index over ingested sessions.
///
/// Holds the sessions themselves plus a token → locations map. Both are
/// ordered maps, so building from the same sessions always yields the same
/// index regardless of the order they were supplied in. The index is derived
/// data: the log files remain the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryIndex {
    sessions: BTreeMap<String, Session>,
    postings: BTreeMap<String, BTreeSet<Location>>,
}

impl HistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from scratch. Sessions without records are not indexed.
    pub fn build(sessions: impl IntoIterator<Item = Session>) -> Self {
        let mut index = Self::new();
        for session in sessions {
            index.upsert_session(session);
        }
        index
    }

    pub fn state(&self) -> IndexState {
        if self.sessions.is_empty() { IndexState::Empty } else { IndexState::Built }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn record_count(&self) -> usize {
        self.sessions.values().map(Session::len).sum()
    }

    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Sessions whose id starts with `prefix`, in id order
    pub fn sessions_with_prefix<'a, 'p>(
        &'a self,
        prefix: &'p str,
    ) -> impl Iterator<Item = &'a Session> + use<'a, 'p> {
        self.sessions
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(move |(id, _)| id.starts_with(prefix))
            .map(|(_, session)| session)
    }

    pub fn postings(&self, token: &str) -> Option<&BTreeSet<Location>> {
        self.postings.get(token)
    }

    /// Insert a session, replacing any previous version with the same id.
    /// A session with no records only removes the previous version.
    pub fn upsert_session(&mut self, session: Session) {
        self.remove_session(&session.id);
        if session.is_empty() {
            return;
        }
        let id = session.id.clone();
        index_records(&mut self.postings, &id, &session.records, 0);
        self.sessions.insert(id, session);
    }

    /// Append records to an existing session, indexing only the new offsets.
    /// Returns `false` when the session is unknown.
    pub fn append_records(&mut self, session_id: &str, records: Vec<Record>) -> bool {
        let Some(session) = self.sessions.get_mut(session_id) else {
            return false;
        };
        let start = session.records.len();
        for record in records {
            session.push(record);
        }
        index_records(&mut self.postings, session_id, &session.records[start..], start);
        true
    }

    pub fn remove_session(&mut self, session_id: &str) -> Option<Session> {
        let session = self.sessions.remove(session_id)?;
        for (offset, record) in session.records.iter().enumerate() {
            let location = Location { session_id: session_id.to_string(), record: offset };
            for token in unique_tokens(&record.text()) {
                if let Some(locations) = self.postings.get_mut(&token) {
                    locations.remove(&location);
                    if locations.is_empty() {
                        self.postings.remove(&token);
                    }
                }
            }
        }
        Some(session)
    }
}

fn index_records(
    postings: &mut BTreeMap<String, BTreeSet<Location>>,
    session_id: &str,
    records: &[Record],
    first_offset: usize,
) {
    for (i, record) in records.iter().enumerate() {
        let location = Location { session_id: session_id.to_string(), record: first_offset + i };
        for token in unique_tokens(&record.text()) {
            postings.entry(token).or_default().insert(location.clone());
        }
    }
}
