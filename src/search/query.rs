//! Read-side operations over a [`HistoryIndex`].
//!
//! Every query is a pure function of the index and its arguments. An empty
//! index, an empty query and a query with no hits all answer with an empty
//! result; none of them is an error.

use std::collections::{BTreeMap, BTreeSet};

use super::filters::SearchFilter;
use super::index::HistoryIndex;
use super::tokenizer::unique_tokens;
use crate::error::LookupError;
use crate::models::{
    IndexStats, Role, SearchResult, Session, SessionSummary, Snippet, SnippetLine, by_recency,
};
use crate::utils::{ellipsize, strip_ansi_codes};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_CONTEXT_RECORDS: usize = 1;
pub const DEFAULT_SNIPPET_CHARS: usize = 1000;
pub const DEFAULT_MAX_SNIPPETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Maximum number of sessions returned
    pub limit: usize,
    /// Records shown before and after each hit
    pub context: usize,
    /// Per-record character cap inside snippets
    pub max_chars: usize,
    /// Maximum snippets per session
    pub max_snippets: usize,
    pub filter: SearchFilter,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            context: DEFAULT_CONTEXT_RECORDS,
            max_chars: DEFAULT_SNIPPET_CHARS,
            max_snippets: DEFAULT_MAX_SNIPPETS,
            filter: SearchFilter::default(),
        }
    }
}

#[derive(Default)]
struct SessionHits<'a> {
    tokens: BTreeSet<&'a str>,
    records: BTreeSet<usize>,
}

impl HistoryIndex {
    /// Keyword search with OR semantics over query tokens.
    ///
    /// Sessions are ranked by how many distinct query tokens they contain,
    /// then by most recent activity, then by id.
    pub fn search(&self, query: &str, options: &QueryOptions) -> Vec<SearchResult> {
        let tokens = unique_tokens(query);
        if tokens.is_empty() || self.is_empty() || options.limit == 0 {
            return Vec::new();
        }

        let mut hits: BTreeMap<&str, SessionHits<'_>> = BTreeMap::new();
        for token in &tokens {
            let Some(locations) = self.postings(token) else {
                continue;
            };
            for location in locations {
                let Some(session) = self.session(&location.session_id) else {
                    continue;
                };
                if !options.filter.matches_session(session)
                    || !options.filter.matches_record(&session.records[location.record])
                {
                    continue;
                }
                let entry = hits.entry(session.id.as_str()).or_default();
                entry.tokens.insert(token.as_str());
                entry.records.insert(location.record);
            }
        }

        let mut results: Vec<SearchResult> = hits
            .into_iter()
            .filter_map(|(id, hits)| {
                let session = self.session(id)?;
                Some(build_result(session, hits, options))
            })
            .collect();

        results.sort_by(|a, b| {
            b.score.cmp(&a.score).then_with(|| {
                by_recency(&a.session_id, a.last_activity, &b.session_id, b.last_activity)
            })
        });
        results.truncate(options.limit);
        results
    }

    /// All sessions, most recent first
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.list_sessions_filtered(&SearchFilter::default())
    }

    /// Sessions passing the project and date filters, most recent first
    pub fn list_sessions_filtered(&self, filter: &SearchFilter) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> = self
            .sessions()
            .filter(|s| filter.matches_session(s))
            .map(Session::summary)
            .filter(|s| filter.matches_session_activity(s.ended_at))
            .collect();
        summaries.sort_by(|a, b| by_recency(&a.id, a.ended_at, &b.id, b.ended_at));
        summaries
    }

    /// Look a session up by exact id, falling back to a unique id prefix.
    pub fn show_session(&self, id: &str) -> Result<&Session, LookupError> {
        if let Some(session) = self.session(id) {
            return Ok(session);
        }
        if id.is_empty() {
            return Err(LookupError::NotFound(id.to_string()));
        }

        let matches: Vec<&Session> = self.sessions_with_prefix(id).collect();
        match matches.as_slice() {
            [] => Err(LookupError::NotFound(id.to_string())),
            [session] => Ok(*session),
            many => Err(LookupError::Ambiguous {
                prefix: id.to_string(),
                candidates: many.iter().map(|s| s.id.clone()).collect(),
            }),
        }
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            sessions: self.session_count(),
            tokens: self.token_count(),
            ..Default::default()
        };
        for session in self.sessions() {
            for record in &session.records {
                stats.records += 1;
                match record.role {
                    Role::User => stats.user_records += 1,
                    Role::Assistant => stats.assistant_records += 1,
                }
            }
            if let Some(started) = session.started_at() {
                stats.oldest_activity =
                    Some(stats.oldest_activity.map_or(started, |t| t.min(started)));
            }
            if let Some(ended) = session.ended_at() {
                stats.newest_activity = Some(stats.newest_activity.map_or(ended, |t| t.max(ended)));
            }
        }
        stats
    }
}

fn build_result(session: &Session, hits: SessionHits<'_>, options: &QueryOptions) -> SearchResult {
    let record_offsets: Vec<usize> = hits.records.iter().copied().collect();
    let snippets = context_windows(&record_offsets, options.context, session.len())
        .into_iter()
        .take(options.max_snippets)
        .map(|(start, end)| Snippet {
            lines: (start..=end)
                .map(|offset| {
                    let record = &session.records[offset];
                    SnippetLine {
                        offset,
                        role: record.role,
                        timestamp: record.timestamp,
                        text: ellipsize(&strip_ansi_codes(&record.text()), options.max_chars),
                        is_match: hits.records.contains(&offset),
                    }
                })
                .collect(),
        })
        .collect();

    SearchResult {
        session_id: session.id.clone(),
        project_path: session.project_path.clone(),
        git_branch: session.git_branch.clone(),
        last_activity: session.ended_at(),
        score: hits.tokens.len(),
        matched_tokens: hits.tokens.iter().map(|t| t.to_string()).collect(),
        record_offsets,
        snippets,
    }
}

/// Inclusive `[start, end]` windows of `context` records around each hit,
/// with overlapping or touching windows merged.
fn context_windows(hits: &[usize], context: usize, len: usize) -> Vec<(usize, usize)> {
    let mut windows: Vec<(usize, usize)> = Vec::new();
    if len == 0 {
        return windows;
    }
    for &hit in hits {
        let start = hit.saturating_sub(context);
        let end = hit.saturating_add(context).min(len - 1);
        match windows.last_mut() {
            Some(last) if start <= last.1 + 1 => last.1 = last.1.max(end),
            _ => windows.push((start, end)),
        }
    }
    windows
}
