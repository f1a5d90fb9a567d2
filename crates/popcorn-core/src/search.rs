//! Search-as-you-type against a [`MovieSource`].
//!
//! Every accepted query gets a fresh [`CancellationToken`] and generation
//! number. A new query cancels the previous request, and a response is only
//! committed if its generation is still current, checked under the same lock
//! `set_query` takes. A superseded response therefore never touches the
//! observable state, whether or not the transport honored the cancellation.

use popcorn_models::MovieSummary;
use popcorn_sources::{MovieSource, SourceError};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Queries shorter than this (in characters) clear the results instead of searching
pub const MIN_QUERY_LEN: usize = 3;

pub const NOT_FOUND_MESSAGE: &str = "Movie not found";
pub const FETCH_FAILED_MESSAGE: &str = "Something went wrong with fetching movies";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<MovieSummary>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Query too short: results cleared, nothing requested
    Cleared,
    /// A request was issued for the query
    Searching,
    /// Same query as the current one: nothing cancelled, nothing requested
    Unchanged,
}

type QueryListener = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct ActiveSlot {
    generation: u64,
    cancel: Option<CancellationToken>,
}

struct Shared {
    state: watch::Sender<SearchState>,
    active: Mutex<ActiveSlot>,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, ActiveSlot> {
        self.active.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn commit(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        query: &str,
        outcome: Result<Vec<MovieSummary>, SourceError>,
    ) {
        let mut slot = self.slot();
        if slot.generation != generation || cancel.is_cancelled() {
            debug!("Discarding stale search response for {:?}", query);
            return;
        }
        slot.cancel = None;

        let outcome = match outcome {
            Ok(results) if results.is_empty() => Err(NOT_FOUND_MESSAGE.to_string()),
            Ok(results) => {
                debug!("Search {:?} committed {} results", query, results.len());
                Ok(results)
            }
            Err(e) if e.is_not_found() => {
                debug!("Search {:?} found nothing: {}", query, e);
                Err(NOT_FOUND_MESSAGE.to_string())
            }
            Err(e) => {
                warn!("Search {:?} failed: {}", query, e);
                Err(FETCH_FAILED_MESSAGE.to_string())
            }
        };

        self.state.send_modify(|state| {
            match outcome {
                Ok(results) => {
                    state.results = results;
                    state.error = None;
                }
                // Results from the previous successful search stay visible
                Err(message) => state.error = Some(message),
            }
            state.is_loading = false;
        });
    }
}

pub struct SearchController {
    source: Arc<dyn MovieSource>,
    shared: Arc<Shared>,
    on_query_accepted: Option<QueryListener>,
}

impl SearchController {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            source,
            shared: Arc::new(Shared {
                state,
                active: Mutex::new(ActiveSlot::default()),
            }),
            on_query_accepted: None,
        }
    }

    /// Called with the query each time a search is issued (not for short queries)
    pub fn with_query_listener(mut self, listener: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_query_accepted = Some(Box::new(listener));
        self
    }

    /// Change the query. Must be called from within a Tokio runtime.
    pub fn set_query(&self, query: impl Into<String>) -> QueryOutcome {
        let query = query.into();
        if self.shared.state.borrow().query == query {
            return QueryOutcome::Unchanged;
        }

        let mut slot = self.shared.slot();
        slot.generation += 1;
        if let Some(previous) = slot.cancel.take() {
            debug!("Cancelling in-flight search (superseded by {:?})", query);
            previous.cancel();
        }

        if query.chars().count() < MIN_QUERY_LEN {
            self.shared.state.send_modify(|state| {
                state.query = query;
                state.results.clear();
                state.error = None;
                state.is_loading = false;
            });
            return QueryOutcome::Cleared;
        }

        let generation = slot.generation;
        let cancel = CancellationToken::new();
        slot.cancel = Some(cancel.clone());
        self.shared.state.send_modify(|state| {
            state.query = query.clone();
            state.is_loading = true;
            state.error = None;
        });
        drop(slot);

        if let Some(listener) = &self.on_query_accepted {
            listener(&query);
        }

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Search for {:?} cancelled", query);
                    return;
                }
                outcome = source.search(&query) => outcome,
            };
            shared.commit(generation, &cancel, &query, outcome);
        });

        QueryOutcome::Searching
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    /// Wait until no request is loading and return the state at that point
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|state| !state.is_loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(cancel) = self.shared.slot().cancel.take() {
            cancel.cancel();
        }
    }
}
