use std::time::Duration;

use async_trait::async_trait;
use parsflix_model::TmdbId;
use serde::de::DeserializeOwned;

use super::images::{
    self, BackdropSize, PosterSize, ProfileSize, StillSize,
};
use super::provider::MetadataProvider;
use super::types::{
    ApiStatus, Credits, GenreEntry, GenreListResponse, MovieDetails,
    MovieSearchResult, SearchPage, SeasonDetails, SeriesDetails,
    SeriesSearchResult,
};
use super::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone)]
pub struct TmdbClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
}

impl TmdbClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }
}

/// Typed TMDB v3 client.
///
/// Authentication is the `api_key` query parameter on every request; the key
/// never appears in log output.
pub struct TmdbClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    pub fn new(config: TmdbClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("parsflix/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 => return Err(ProviderError::InvalidApiKey),
            404 => return Err(ProviderError::NotFound),
            429 => return Err(ProviderError::RateLimited),
            _ if !status.is_success() => {
                let message = response
                    .json::<ApiStatus>()
                    .await
                    .ok()
                    .and_then(|body| body.status_message)
                    .unwrap_or_else(|| status.to_string());
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| {
            ProviderError::Decode(format!("{path}: {err}"))
        })
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn movie_details(
        &self,
        id: TmdbId,
    ) -> Result<MovieDetails, ProviderError> {
        self.get(
            &format!("/movie/{id}"),
            &[("append_to_response", "credits".to_string())],
        )
        .await
    }

    async fn series_details(
        &self,
        id: TmdbId,
    ) -> Result<SeriesDetails, ProviderError> {
        self.get(&format!("/tv/{id}"), &[]).await
    }

    async fn series_credits(
        &self,
        id: TmdbId,
    ) -> Result<Credits, ProviderError> {
        self.get(&format!("/tv/{id}/credits"), &[]).await
    }

    async fn season_details(
        &self,
        series_id: TmdbId,
        season_number: i32,
    ) -> Result<SeasonDetails, ProviderError> {
        self.get(&format!("/tv/{series_id}/season/{season_number}"), &[])
            .await
    }

    async fn movie_genres(&self) -> Result<Vec<GenreEntry>, ProviderError> {
        let list: GenreListResponse =
            self.get("/genre/movie/list", &[]).await?;
        Ok(list.genres)
    }

    async fn series_genres(&self) -> Result<Vec<GenreEntry>, ProviderError> {
        let list: GenreListResponse = self.get("/genre/tv/list", &[]).await?;
        Ok(list.genres)
    }

    async fn search_movies(
        &self,
        query: &str,
        year: Option<i32>,
        page: u32,
    ) -> Result<SearchPage<MovieSearchResult>, ProviderError> {
        let mut params = vec![
            ("query", query.to_string()),
            ("page", page.max(1).to_string()),
        ];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }
        self.get("/search/movie", &params).await
    }

    async fn search_series(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage<SeriesSearchResult>, ProviderError> {
        self.get(
            "/search/tv",
            &[
                ("query", query.to_string()),
                ("page", page.max(1).to_string()),
            ],
        )
        .await
    }

    fn poster_url(&self, path: &str, size: PosterSize) -> String {
        images::image_url(&self.image_base_url, size.as_str(), path)
    }

    fn backdrop_url(&self, path: &str, size: BackdropSize) -> String {
        images::image_url(&self.image_base_url, size.as_str(), path)
    }

    fn profile_url(&self, path: &str, size: ProfileSize) -> String {
        images::image_url(&self.image_base_url, size.as_str(), path)
    }

    fn still_url(&self, path: &str, size: StillSize) -> String {
        images::image_url(&self.image_base_url, size.as_str(), path)
    }
}
