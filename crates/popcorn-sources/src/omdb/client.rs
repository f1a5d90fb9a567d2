use async_trait::async_trait;
use popcorn_models::{MovieDetail, MovieSummary};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::MovieSource;

/// Create a reqwest Client for OMDb requests
pub fn create_omdb_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Self {
        Self {
            client: Arc::new(create_omdb_client(timeout)),
            base_url,
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MovieSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, SourceError> {
        api::search(&self.client, &self.base_url, &self.api_key, query).await
    }

    async fn details(&self, imdb_id: &str) -> Result<MovieDetail, SourceError> {
        api::get_details(&self.client, &self.base_url, &self.api_key, imdb_id).await
    }
}
