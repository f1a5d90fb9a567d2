pub mod detail;
pub mod keys;
pub mod persisted;
pub mod search;
pub mod session;
pub mod storage;
pub mod title;
pub mod watched;

#[cfg(test)]
pub(crate) mod test_support;

pub use detail::{DetailView, FetchedDetail, PendingDetail, DETAIL_FAILED_MESSAGE};
pub use keys::{KeyBinder, KeyDispatcher, Subscription};
pub use persisted::PersistedValue;
pub use search::{QueryOutcome, SearchController, SearchState, FETCH_FAILED_MESSAGE, MIN_QUERY_LEN, NOT_FOUND_MESSAGE};
pub use session::{AddOutcome, Session, SessionAction, ENTER, ESCAPE};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use title::{movie_title, DocumentTitle, TitleGuard, TitleSurface, DEFAULT_TITLE};
pub use watched::{WatchedStore, WATCHED_KEY};
