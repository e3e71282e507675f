//! TMDB v3 metadata provider.
//!
//! The admin ingestion flow talks to the [`MetadataProvider`] port rather
//! than [`TmdbClient`] directly so it can run against scripted fakes.

mod client;
mod images;
mod provider;
pub mod types;

pub use client::{TmdbClient, TmdbClientConfig};
pub use images::{BackdropSize, PosterSize, ProfileSize, StillSize};
pub use provider::MetadataProvider;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid API key")]
    InvalidApiKey,

    #[error("not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Decode(String),
}
