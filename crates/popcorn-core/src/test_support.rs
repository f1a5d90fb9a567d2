use async_trait::async_trait;
use popcorn_models::{MovieDetail, MovieSummary};
use popcorn_sources::{MovieSource, SourceError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::storage::{KeyValueStore, StoreError};

type SearchReply = Result<Vec<MovieSummary>, SourceError>;
type DetailReply = Result<MovieDetail, SourceError>;

/// Movie source whose search responses are released by the test.
///
/// `gate(query)` returns the sender that completes the next search for that
/// query. Details come from `gate_detail` when one is registered for the ID,
/// otherwise from a fixed table.
#[derive(Default)]
pub struct GatedSource {
    gates: Mutex<HashMap<String, oneshot::Receiver<SearchReply>>>,
    detail_gates: Mutex<HashMap<String, oneshot::Receiver<DetailReply>>>,
    details: Mutex<HashMap<String, MovieDetail>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl GatedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gate(&self, query: &str) -> oneshot::Sender<SearchReply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(query.to_string(), rx);
        tx
    }

    pub fn gate_detail(&self, imdb_id: &str) -> oneshot::Sender<DetailReply> {
        let (tx, rx) = oneshot::channel();
        self.detail_gates.lock().unwrap().insert(imdb_id.to_string(), rx);
        tx
    }

    pub fn with_detail(self: Arc<Self>, detail: MovieDetail) -> Arc<Self> {
        let id = detail.imdb_id.clone();
        self.with_detail_for(&id, detail)
    }

    /// Answer requests for `requested_id` with `detail`, whatever ID it carries
    pub fn with_detail_for(self: Arc<Self>, requested_id: &str, detail: MovieDetail) -> Arc<Self> {
        self.details.lock().unwrap().insert(requested_id.to_string(), detail);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieSource for GatedSource {
    fn source_name(&self) -> &str {
        "gated"
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().remove(query);
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                Err(SourceError::Status {
                    status: 599,
                    body: "gate dropped".to_string(),
                })
            }),
            None => Err(SourceError::NotFound("Movie not found!".to_string())),
        }
    }

    async fn details(&self, imdb_id: &str) -> Result<MovieDetail, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.detail_gates.lock().unwrap().remove(imdb_id);
        if let Some(rx) = gate {
            return rx.await.unwrap_or_else(|_| {
                Err(SourceError::Status {
                    status: 599,
                    body: "gate dropped".to_string(),
                })
            });
        }
        self.details
            .lock()
            .unwrap()
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound("Incorrect IMDb ID.".to_string()))
    }
}

pub fn summary(imdb_id: &str, title: &str) -> MovieSummary {
    MovieSummary {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "1999".to_string(),
        poster: None,
    }
}

pub fn detail(imdb_id: &str, title: &str) -> MovieDetail {
    MovieDetail {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "1999".to_string(),
        poster: Some(format!("https://img/{}.jpg", imdb_id)),
        released: "31 Mar 1999".to_string(),
        runtime: Some(136),
        runtime_text: "136 min".to_string(),
        genre: "Action, Sci-Fi".to_string(),
        imdb_rating: Some(8.7),
        plot: "A hacker learns the truth.".to_string(),
        actors: "Keanu Reeves".to_string(),
        director: "Lana Wachowski".to_string(),
    }
}

/// Store whose reads succeed (empty) and whose writes always fail
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: PathBuf::from(format!("/read-only/{}.json", key)),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
