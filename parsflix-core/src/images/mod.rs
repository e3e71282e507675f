//! Hosted image storage.
//!
//! Catalog imagery (posters, backdrops, profiles) is mirrored off TMDB's CDN
//! into a store we control. Services depend on the [`ImageStore`] port; the
//! production adapter is [`CloudinaryClient`].

mod cloudinary;

pub use cloudinary::{CloudinaryClient, CloudinaryConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image store API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("source image fetch failed with {status}: {url}")]
    SourceFetch { status: u16, url: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("invalid image store configuration: {0}")]
    Config(String),
}

/// A successfully stored image, as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImage {
    pub public_id: String,
    pub secure_url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Option<u64>,
}

/// Port over the hosted image store.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Download `source_url` and re-upload it under `public_id`.
    async fn store_from_url(
        &self,
        source_url: &str,
        public_id: &str,
    ) -> Result<StoredImage, ImageStoreError>;

    /// Remove a stored image. Returns `false` when the store reports the
    /// asset as already gone; that is not an error.
    async fn destroy(&self, public_id: &str)
        -> Result<bool, ImageStoreError>;
}
