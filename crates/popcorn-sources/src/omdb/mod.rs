//! OMDb (https://www.omdbapi.com) movie source
pub mod api;
pub mod client;

pub use client::OmdbClient;
