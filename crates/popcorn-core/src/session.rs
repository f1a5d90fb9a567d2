//! Wires search, detail and the watched list together the way the app shell does.
//!
//! - accepting a new search query closes the detail view
//! - `Escape` closes the detail view while one is open
//! - `Enter` focuses the search input (if it isn't already) and clears the query
//!
//! Key actions are queued on a channel and applied by [`Session::handle_key`],
//! so key handling never re-enters the session.

use popcorn_models::{UserRating, WatchedRecord, WatchedSummary};
use popcorn_sources::MovieSource;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::detail::DetailView;
use crate::keys::{KeyBinder, KeyDispatcher};
use crate::search::{QueryOutcome, SearchController, SearchState};
use crate::storage::{KeyValueStore, StoreError};
use crate::title::TitleSurface;
use crate::watched::WatchedStore;

pub const ENTER: &str = "Enter";
pub const ESCAPE: &str = "Escape";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    FocusSearch,
    CloseDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(WatchedRecord),
    /// Already on the list; carries the rating it was stored with
    AlreadyWatched(Option<UserRating>),
    /// No detail loaded, or no rating given yet
    NotReady,
}

pub struct Session {
    search: SearchController,
    detail: DetailView,
    watched: WatchedStore,
    keys: KeyDispatcher,
    search_focused: bool,
    action_tx: mpsc::UnboundedSender<SessionAction>,
    action_rx: mpsc::UnboundedReceiver<SessionAction>,
    enter_binding: KeyBinder,
    escape_binding: KeyBinder,
}

impl Session {
    pub fn new(
        source: Arc<dyn MovieSource>,
        store: Arc<dyn KeyValueStore>,
        watched_key: &str,
        title_surface: Arc<dyn TitleSurface>,
        keys: KeyDispatcher,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut enter_binding = KeyBinder::new(keys.clone());
        let tx = action_tx.clone();
        enter_binding.bind(ENTER, move || {
            let _ = tx.send(SessionAction::FocusSearch);
        });

        Self {
            search: SearchController::new(Arc::clone(&source)),
            detail: DetailView::new(source, title_surface),
            watched: WatchedStore::with_key(store, watched_key),
            escape_binding: KeyBinder::new(keys.clone()),
            keys,
            search_focused: true,
            action_tx,
            action_rx,
            enter_binding,
        }
    }

    /// Typing in the search box. Must be called from within a Tokio runtime.
    pub fn set_query(&mut self, query: &str) -> QueryOutcome {
        self.search_focused = true;
        let outcome = self.search.set_query(query);
        if outcome == QueryOutcome::Searching {
            self.close_detail();
        }
        outcome
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub async fn settled(&self) -> SearchState {
        self.search.settled().await
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.search.subscribe()
    }

    pub fn is_search_focused(&self) -> bool {
        self.search_focused
    }

    /// Open a title; selecting the one already open closes it instead
    pub async fn select(&mut self, imdb_id: &str) {
        if self.detail.selected_id() == Some(imdb_id) {
            self.close_detail();
            return;
        }

        self.search_focused = false;
        self.detail.open(imdb_id).await;

        let tx = self.action_tx.clone();
        self.escape_binding.bind(ESCAPE, move || {
            let _ = tx.send(SessionAction::CloseDetail);
        });
    }

    pub fn close_detail(&mut self) {
        if self.detail.is_open() {
            debug!("Closing detail view");
        }
        self.detail.close();
        self.escape_binding.unbind();
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    pub fn rate(&mut self, rating: UserRating) {
        self.detail.rate(rating);
    }

    /// Add the open, rated title to the watched list and close the detail view
    pub fn add_current(&mut self) -> Result<AddOutcome, StoreError> {
        if let Some(id) = self.detail.selected_id() {
            if let Some(existing) = self.watched.get(id) {
                return Ok(AddOutcome::AlreadyWatched(existing.user_rating));
            }
        }

        let Some(record) = self.detail.to_watched_record() else {
            return Ok(AddOutcome::NotReady);
        };

        self.watched.add(record.clone())?;
        self.close_detail();
        Ok(AddOutcome::Added(record))
    }

    pub fn remove_watched(&mut self, imdb_id: &str) -> Result<(), StoreError> {
        self.watched.remove(imdb_id)
    }

    pub fn watched(&self) -> &[WatchedRecord] {
        self.watched.items()
    }

    pub fn watched_rating(&self, imdb_id: &str) -> Option<UserRating> {
        self.watched.get(imdb_id).and_then(|r| r.user_rating)
    }

    pub fn summary(&self) -> WatchedSummary {
        self.watched.summary()
    }

    /// Deliver a key press to every bound listener, then apply queued actions.
    /// Returns the number of listeners that fired.
    pub fn handle_key(&mut self, code: &str) -> usize {
        let fired = self.keys.dispatch(code);
        while let Ok(action) = self.action_rx.try_recv() {
            self.apply(action);
        }
        fired
    }

    fn apply(&mut self, action: SessionAction) {
        debug!("Applying {:?}", action);
        match action {
            SessionAction::FocusSearch => {
                if !self.search_focused {
                    self.search_focused = true;
                    self.search.set_query("");
                }
            }
            SessionAction::CloseDetail => self.close_detail(),
        }
    }

    pub fn has_enter_binding(&self) -> bool {
        self.enter_binding.is_bound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_support::{detail, summary, GatedSource};
    use crate::title::{DocumentTitle, DEFAULT_TITLE};
    use crate::watched::WATCHED_KEY;

    struct Harness {
        session: Session,
        source: Arc<GatedSource>,
        store: Arc<dyn KeyValueStore>,
        title: Arc<DocumentTitle>,
        keys: KeyDispatcher,
    }

    fn harness() -> Harness {
        let source = GatedSource::new()
            .with_detail(detail("tt1", "The Matrix"))
            .with_detail(detail("tt2", "Inception"));
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let title = Arc::new(DocumentTitle::default());
        let keys = KeyDispatcher::new();
        let session = Session::new(
            source.clone(),
            Arc::clone(&store),
            WATCHED_KEY,
            title.clone(),
            keys.clone(),
        );
        Harness {
            session,
            source,
            store,
            title,
            keys,
        }
    }

    fn rating(value: u8) -> UserRating {
        UserRating::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_new_query_closes_detail() {
        let mut h = harness();
        h.session.select("tt1").await;
        assert!(h.session.detail().is_open());

        let _gate = h.source.gate("alien");
        h.session.set_query("alien");
        assert!(!h.session.detail().is_open());
        assert_eq!(h.title.current(), DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_repeated_query_keeps_detail_open() {
        let mut h = harness();
        let gate = h.source.gate("the matrix");
        h.session.set_query("the matrix");
        let _ = gate.send(Ok(vec![summary("tt1", "The Matrix")]));
        h.session.settled().await;

        h.session.select("tt1").await;
        assert_eq!(h.session.set_query("the matrix"), QueryOutcome::Unchanged);
        assert!(h.session.detail().is_open());
        assert_eq!(h.title.current(), "Movie | The Matrix");
        assert_eq!(h.source.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_short_query_keeps_detail_open() {
        let mut h = harness();
        h.session.select("tt1").await;
        h.session.set_query("al");
        assert!(h.session.detail().is_open());
    }

    #[tokio::test]
    async fn test_select_same_id_toggles_closed() {
        let mut h = harness();
        h.session.select("tt1").await;
        h.session.select("tt1").await;
        assert!(!h.session.detail().is_open());
        assert_eq!(h.source.detail_calls(), 1);
    }

    #[tokio::test]
    async fn test_escape_closes_detail_and_unbinds() {
        let mut h = harness();
        h.session.select("tt1").await;
        assert_eq!(h.keys.listener_count(), 2);

        assert_eq!(h.session.handle_key("Escape"), 1);
        assert!(!h.session.detail().is_open());
        assert_eq!(h.keys.listener_count(), 1);
        assert_eq!(h.session.handle_key("Escape"), 0);
    }

    #[tokio::test]
    async fn test_repeated_opens_keep_single_escape_listener() {
        let mut h = harness();
        h.session.select("tt1").await;
        h.session.select("tt2").await;
        h.session.select("tt1").await;
        assert_eq!(h.keys.listener_count(), 2);
    }

    #[tokio::test]
    async fn test_enter_focuses_and_clears_query_only_when_unfocused() {
        let mut h = harness();
        assert!(h.session.has_enter_binding());

        let gate = h.source.gate("the matrix");
        h.session.set_query("the matrix");
        let _ = gate.send(Ok(vec![summary("tt1", "The Matrix")]));
        h.session.settled().await;

        // Focused: Enter does nothing to the query
        h.session.handle_key("Enter");
        assert_eq!(h.session.search_state().query, "the matrix");

        h.session.select("tt1").await;
        assert!(!h.session.is_search_focused());

        h.session.handle_key("Enter");
        assert!(h.session.is_search_focused());
        let state = h.session.search_state();
        assert_eq!(state.query, "");
        assert!(state.results.is_empty());
    }

    #[tokio::test]
    async fn test_rate_and_add_persists_and_closes() {
        let mut h = harness();
        h.session.select("tt1").await;
        assert_eq!(h.session.add_current().unwrap(), AddOutcome::NotReady);

        h.session.rate(rating(8));
        let outcome = h.session.add_current().unwrap();
        assert!(matches!(outcome, AddOutcome::Added(ref r) if r.imdb_id == "tt1"));
        assert!(!h.session.detail().is_open());
        assert_eq!(h.session.watched().len(), 1);
        assert_eq!(h.session.watched_rating("tt1"), Some(rating(8)));

        let snapshot = h.store.get(WATCHED_KEY).unwrap().unwrap();
        let records: Vec<WatchedRecord> = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(records, h.session.watched().to_vec());
    }

    #[tokio::test]
    async fn test_add_already_watched_reports_existing_rating() {
        let mut h = harness();
        h.session.select("tt1").await;
        h.session.rate(rating(9));
        h.session.add_current().unwrap();

        h.session.select("tt1").await;
        h.session.rate(rating(2));
        assert_eq!(
            h.session.add_current().unwrap(),
            AddOutcome::AlreadyWatched(Some(rating(9)))
        );
        assert_eq!(h.session.watched().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_then_reload() {
        let mut h = harness();
        h.session.select("tt1").await;
        h.session.rate(rating(8));
        h.session.add_current().unwrap();
        h.session.remove_watched("tt1").unwrap();
        assert!(h.session.watched().is_empty());

        let reloaded = WatchedStore::load(Arc::clone(&h.store));
        assert!(reloaded.is_empty());
        assert_eq!(h.session.summary().count, 0);
    }
}
