use popcorn_models::{normalize_poster, parse_imdb_rating, parse_runtime, MovieDetail, MovieSummary};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::SourceError;

/// Message used when OMDb answers `Response: "False"` without an `Error` field
const DEFAULT_NOT_FOUND: &str = "Movie not found";

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
}

fn is_true(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

/// Parse a search payload. `Response: "False"` or an empty list is `NotFound`.
pub fn parse_search_response(body: &str) -> Result<Vec<MovieSummary>, SourceError> {
    let payload: OmdbSearchResponse = serde_json::from_str(body)?;

    if !is_true(&payload.response) || payload.search.is_empty() {
        let message = payload.error.unwrap_or_else(|| DEFAULT_NOT_FOUND.to_string());
        return Err(SourceError::NotFound(message));
    }

    Ok(payload
        .search
        .into_iter()
        .map(|item| MovieSummary {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: normalize_poster(item.poster),
        })
        .collect())
}

/// Parse a detail payload. `requested_id` fills in the ID when the payload omits it.
pub fn parse_detail_response(body: &str, requested_id: &str) -> Result<MovieDetail, SourceError> {
    let payload: OmdbDetailResponse = serde_json::from_str(body)?;

    if !is_true(&payload.response) {
        let message = payload.error.unwrap_or_else(|| DEFAULT_NOT_FOUND.to_string());
        return Err(SourceError::NotFound(message));
    }

    let imdb_id = if payload.imdb_id.is_empty() {
        requested_id.to_string()
    } else {
        payload.imdb_id
    };

    Ok(MovieDetail {
        imdb_id,
        runtime: parse_runtime(&payload.runtime),
        runtime_text: payload.runtime,
        imdb_rating: parse_imdb_rating(&payload.imdb_rating),
        title: payload.title,
        year: payload.year,
        poster: normalize_poster(payload.poster),
        released: payload.released,
        genre: payload.genre,
        plot: payload.plot,
        actors: payload.actors,
        director: payload.director,
    })
}

async fn get_body(client: &Client, base_url: &str, params: &[(&str, &str)]) -> Result<String, SourceError> {
    let response = client.get(base_url).query(params).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!("OMDb request failed: {} - {}", status, body);
        return Err(SourceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.text().await?)
}

/// Search OMDb by title text (`s=` parameter)
pub async fn search(client: &Client, base_url: &str, api_key: &str, query: &str) -> Result<Vec<MovieSummary>, SourceError> {
    debug!("OMDb search: {:?}", query);
    let body = get_body(client, base_url, &[("apikey", api_key), ("s", query)]).await?;
    let results = parse_search_response(&body)?;
    debug!("OMDb search {:?} returned {} results", query, results.len());
    Ok(results)
}

/// Fetch one title by IMDb ID (`i=` parameter)
pub async fn get_details(client: &Client, base_url: &str, api_key: &str, imdb_id: &str) -> Result<MovieDetail, SourceError> {
    debug!("OMDb details: {}", imdb_id);
    let body = get_body(client, base_url, &[("apikey", api_key), ("i", imdb_id)]).await?;
    parse_detail_response(&body, imdb_id)
}
