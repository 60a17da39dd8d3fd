//! Search session state management
//!
//! A session owns the pagination and sort state for one search, sequences
//! calls to a [`SearchApi`] and merges incoming pages. Each primary search
//! and each `clear` starts a new generation; a response that comes back
//! for an older generation is discarded instead of applied.

use crate::client::SearchApi;
use crate::error::AlKetabError;
use crate::models::{NormalizedPage, NormalizedVerse, QueryInfo, SortOrder, WordStats};
use serde::Serialize;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shorter trimmed queries are ignored by `start_search`.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    LoadingMore,
    Success,
    Error,
}

/// What happened to a session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response (success or failure) was merged into the session.
    Applied,
    /// A guard did not hold; nothing was sent and nothing changed.
    Skipped,
    /// The session moved on while the call was in flight.
    Discarded,
}

/// Observable session state, read by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub query: String,
    pub verses: Vec<NormalizedVerse>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub continuation_token: Option<String>,
    pub sort_order: SortOrder,
    pub phase: Phase,
    pub last_error: Option<AlKetabError>,
    pub ai_explanation: Option<String>,
    pub word_stats: Option<WordStats>,
    pub query_info: QueryInfo,
    pub runtime: f64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            query: String::new(),
            verses: Vec::new(),
            current_page: 1,
            total_pages: 1,
            total_results: 0,
            continuation_token: None,
            sort_order: SortOrder::default(),
            phase: Phase::Idle,
            last_error: None,
            ai_explanation: None,
            word_stats: None,
            query_info: QueryInfo::default(),
            runtime: 0.0,
        }
    }
}

impl SessionState {
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::LoadingMore)
    }

    /// Drop everything derived from a response. Query and sort order stay.
    fn reset_results(&mut self) {
        let defaults = SessionState::default();
        self.verses.clear();
        self.current_page = defaults.current_page;
        self.total_pages = defaults.total_pages;
        self.total_results = defaults.total_results;
        self.continuation_token = None;
        self.ai_explanation = None;
        self.word_stats = None;
        self.query_info = QueryInfo::default();
        self.runtime = defaults.runtime;
    }

    fn apply_first_page(&mut self, page: NormalizedPage) {
        self.verses = page.verses;
        self.current_page = page.pagination.current_page;
        self.total_pages = page.pagination.total_pages;
        self.total_results = page.pagination.total_results;
        self.continuation_token = page.continuation_token;
        self.sort_order = page.sort_order;
        self.ai_explanation = page.ai_explanation;
        self.word_stats = page.word_stats;
        self.query_info = page.query_info;
        self.runtime = page.runtime;
        self.last_error = None;
        self.phase = Phase::Success;
    }

    fn append_page(&mut self, page: NormalizedPage) {
        self.verses.extend(page.verses);
        self.current_page = page.pagination.current_page;
        self.total_pages = page.pagination.total_pages;
        self.total_results = page.pagination.total_results;
        self.phase = Phase::Success;
    }
}

struct SessionInner {
    state: SessionState,
    generation: u64,
}

pub struct SearchSession<A> {
    api: A,
    inner: RwLock<SessionInner>,
}

impl<A: SearchApi> SearchSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            inner: RwLock::new(SessionInner {
                state: SessionState::default(),
                generation: 0,
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.read().state.clone()
    }

    /// Start a new top-level search, replacing everything accumulated so far.
    pub async fn start_search(&self, query: &str) -> Outcome {
        let query = query.trim().to_string();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Outcome::Skipped;
        }

        let generation = {
            let mut inner = self.write();
            inner.generation += 1;
            let state = &mut inner.state;
            state.reset_results();
            state.query = query.clone();
            state.last_error = None;
            state.phase = Phase::Loading;
            inner.generation
        };
        tracing::debug!(generation, "search started");

        let result = self.api.search_initial(&query).await;

        let mut inner = self.write();
        if inner.generation != generation {
            tracing::debug!(generation, current = inner.generation, "discarding stale search response");
            return Outcome::Discarded;
        }
        let state = &mut inner.state;
        match result {
            Ok(page) => {
                tracing::debug!(verses = page.verses.len(), "search page applied");
                state.apply_first_page(page);
            }
            Err(e) => {
                tracing::debug!(error = %e, "search failed");
                state.reset_results();
                state.last_error = Some(e);
                state.phase = Phase::Error;
            }
        }
        Outcome::Applied
    }

    /// Fetch and append the next page. Skipped unless the session holds a
    /// successful result with more pages, a continuation token, and no
    /// load already in flight.
    pub async fn load_more(&self) -> Outcome {
        let (generation, token, next_page, sort) = {
            let mut inner = self.write();
            let generation = inner.generation;
            let state = &mut inner.state;
            let token = match state.continuation_token.as_deref() {
                Some(token) if !token.is_empty() => token.to_string(),
                _ => return Outcome::Skipped,
            };
            if state.phase != Phase::Success || !state.has_more_pages() {
                return Outcome::Skipped;
            }
            state.phase = Phase::LoadingMore;
            state.last_error = None;
            (generation, token, state.current_page + 1, state.sort_order)
        };
        tracing::debug!(generation, page = next_page, "loading more results");

        let result = self.api.search_continuation(&token, next_page, sort).await;

        let mut inner = self.write();
        if inner.generation != generation {
            tracing::debug!(generation, current = inner.generation, "discarding stale page");
            return Outcome::Discarded;
        }
        let state = &mut inner.state;
        match result {
            Ok(page) => {
                tracing::debug!(verses = page.verses.len(), page = page.pagination.current_page, "page appended");
                state.append_page(page);
            }
            Err(e) => {
                tracing::debug!(error = %e, "load more failed");
                state.last_error = Some(e);
                state.phase = Phase::Success;
            }
        }
        Outcome::Applied
    }

    /// Switch the sort order. When results are already shown the stored
    /// query is searched again; sorting is done by the server.
    pub async fn change_sort_order(&self, sort: SortOrder) -> Outcome {
        let rerun = {
            let mut inner = self.write();
            let state = &mut inner.state;
            if state.sort_order == sort {
                return Outcome::Skipped;
            }
            state.sort_order = sort;
            (!state.verses.is_empty()).then(|| state.query.clone())
        };

        match rerun {
            Some(query) => self.start_search(&query).await,
            None => Outcome::Applied,
        }
    }

    /// Reset to the initial idle state. Responses to calls still in flight
    /// will be discarded.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.generation += 1;
        inner.state = SessionState::default();
        tracing::debug!(generation = inner.generation, "session cleared");
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
