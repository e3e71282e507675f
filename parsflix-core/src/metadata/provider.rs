use async_trait::async_trait;
use parsflix_model::TmdbId;

use super::images::{BackdropSize, PosterSize, ProfileSize, StillSize};
use super::types::{
    Credits, GenreEntry, MovieDetails, MovieSearchResult, SearchPage,
    SeasonDetails, SeriesDetails, SeriesSearchResult,
};
use super::ProviderError;

/// Port over the metadata source consumed by ingestion and admin search.
///
/// The production implementation is [`super::TmdbClient`]; tests script the
/// trait directly.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Movie details with credits appended.
    async fn movie_details(
        &self,
        id: TmdbId,
    ) -> Result<MovieDetails, ProviderError>;

    /// Series details, including per-season summaries.
    async fn series_details(
        &self,
        id: TmdbId,
    ) -> Result<SeriesDetails, ProviderError>;

    async fn series_credits(
        &self,
        id: TmdbId,
    ) -> Result<Credits, ProviderError>;

    /// One season with its episode list.
    async fn season_details(
        &self,
        series_id: TmdbId,
        season_number: i32,
    ) -> Result<SeasonDetails, ProviderError>;

    async fn movie_genres(&self) -> Result<Vec<GenreEntry>, ProviderError>;

    async fn series_genres(&self) -> Result<Vec<GenreEntry>, ProviderError>;

    async fn search_movies(
        &self,
        query: &str,
        year: Option<i32>,
        page: u32,
    ) -> Result<SearchPage<MovieSearchResult>, ProviderError>;

    async fn search_series(
        &self,
        query: &str,
        page: u32,
    ) -> Result<SearchPage<SeriesSearchResult>, ProviderError>;

    fn poster_url(&self, path: &str, size: PosterSize) -> String;

    fn backdrop_url(&self, path: &str, size: BackdropSize) -> String;

    fn profile_url(&self, path: &str, size: ProfileSize) -> String;

    fn still_url(&self, path: &str, size: StillSize) -> String;
}
