use async_trait::async_trait;
use popcorn_models::{MovieDetail, MovieSummary};

use crate::error::SourceError;

#[async_trait]
pub trait MovieSource: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    /// Search titles by free text. A response with zero matches is `SourceError::NotFound`.
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, SourceError>;

    /// Fetch the full record for one IMDb ID.
    async fn details(&self, imdb_id: &str) -> Result<MovieDetail, SourceError>;
}
