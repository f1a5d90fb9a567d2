use chrono::Utc;
use popcorn_models::{MovieDetail, UserRating, WatchedRecord};
use popcorn_sources::{MovieSource, SourceError};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::title::{movie_title, TitleGuard, TitleSurface};

pub const DETAIL_FAILED_MESSAGE: &str = "Something went wrong with fetching movie details";

/// A detail request started by [`DetailView::begin_open`], not yet sent
pub struct PendingDetail {
    source: Arc<dyn MovieSource>,
    request: u64,
    imdb_id: String,
}

impl PendingDetail {
    pub fn imdb_id(&self) -> &str {
        &self.imdb_id
    }

    /// Run the request. Does not borrow the view, so its state stays readable meanwhile.
    pub async fn fetch(self) -> FetchedDetail {
        let result = self.source.details(&self.imdb_id).await;
        FetchedDetail {
            request: self.request,
            imdb_id: self.imdb_id,
            result,
        }
    }
}

/// Outcome of a [`PendingDetail`], handed back to [`DetailView::complete`]
pub struct FetchedDetail {
    request: u64,
    imdb_id: String,
    result: Result<MovieDetail, SourceError>,
}

/// The open movie detail panel.
///
/// While a detail is loaded the title surface shows "Movie | <Title>"; opening
/// another ID, closing, or dropping the view restores the default title.
pub struct DetailView {
    source: Arc<dyn MovieSource>,
    title_surface: Arc<dyn TitleSurface>,
    request: u64,
    selected_id: Option<String>,
    detail: Option<MovieDetail>,
    is_loading: bool,
    error: Option<String>,
    user_rating: Option<UserRating>,
    rating_decisions: u32,
    title_guard: Option<TitleGuard>,
}

impl DetailView {
    pub fn new(source: Arc<dyn MovieSource>, title_surface: Arc<dyn TitleSurface>) -> Self {
        Self {
            source,
            title_surface,
            request: 0,
            selected_id: None,
            detail: None,
            is_loading: false,
            error: None,
            user_rating: None,
            rating_decisions: 0,
            title_guard: None,
        }
    }

    /// Fetch and show the detail for `imdb_id`, replacing whatever was open.
    pub async fn open(&mut self, imdb_id: &str) {
        let pending = self.begin_open(imdb_id);
        let fetched = pending.fetch().await;
        self.complete(fetched);
    }

    /// Select `imdb_id` and mark the view loading. The returned request is
    /// fetched by the caller and its outcome passed to [`DetailView::complete`].
    pub fn begin_open(&mut self, imdb_id: &str) -> PendingDetail {
        self.close();
        self.request += 1;
        self.selected_id = Some(imdb_id.to_string());
        self.is_loading = true;

        PendingDetail {
            source: Arc::clone(&self.source),
            request: self.request,
            imdb_id: imdb_id.to_string(),
        }
    }

    /// Apply a fetched detail. Outcomes of superseded or closed requests are dropped.
    pub fn complete(&mut self, fetched: FetchedDetail) {
        if fetched.request != self.request || !self.is_loading {
            debug!("Discarding stale detail for {}", fetched.imdb_id);
            return;
        }
        self.is_loading = false;

        let imdb_id = fetched.imdb_id;
        match fetched.result {
            Ok(detail) => {
                debug!("Loaded detail for {} ({})", imdb_id, detail.title);
                if !detail.title.is_empty() {
                    self.title_guard = Some(TitleGuard::acquire(
                        Arc::clone(&self.title_surface),
                        &movie_title(&detail.title),
                    ));
                }
                self.detail = Some(detail);
            }
            Err(e) if e.is_not_found() => {
                debug!("No detail for {}: {}", imdb_id, e);
                self.error = Some(e.to_string());
            }
            Err(e) => {
                warn!("Failed to fetch detail for {}: {}", imdb_id, e);
                self.error = Some(DETAIL_FAILED_MESSAGE.to_string());
            }
        }
    }

    pub fn close(&mut self) {
        // Dropping the guard restores the title
        self.title_guard = None;
        self.selected_id = None;
        self.detail = None;
        self.is_loading = false;
        self.error = None;
        self.user_rating = None;
        self.rating_decisions = 0;
    }

    pub fn is_open(&self) -> bool {
        self.selected_id.is_some()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.detail.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn user_rating(&self) -> Option<UserRating> {
        self.user_rating
    }

    /// How many times the rating changed since this ID was opened
    pub fn rating_decisions(&self) -> u32 {
        self.rating_decisions
    }

    /// Record a star rating. Re-selecting the current rating is not a new decision.
    pub fn rate(&mut self, rating: UserRating) {
        if self.user_rating != Some(rating) {
            self.user_rating = Some(rating);
            self.rating_decisions += 1;
        }
    }

    /// Build the record to add to the watched list. None until a detail is loaded and rated.
    pub fn to_watched_record(&self) -> Option<WatchedRecord> {
        let imdb_id = self.selected_id.as_ref()?;
        let detail = self.detail.as_ref()?;
        let user_rating = self.user_rating?;

        Some(WatchedRecord {
            imdb_id: imdb_id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster: detail.poster.clone(),
            imdb_rating: detail.imdb_rating,
            runtime: detail.runtime,
            user_rating: Some(user_rating),
            count_rating_decisions: self.rating_decisions,
            added_at: Some(Utc::now()),
        })
    }
}
