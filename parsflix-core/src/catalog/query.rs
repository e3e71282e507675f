use std::sync::Arc;

use parsflix_model::{
    Credit, Genre, MovieDetail, MovieId, MovieSummary, Page, SeasonDetail,
    SeriesDetail, SeriesId, SeriesSummary,
};
use serde::{Deserialize, Serialize};

use crate::database::ports::{
    CatalogCounts, CatalogEntry, CatalogFilter, SearchResults,
};
use crate::database::CatalogStore;
use crate::error::{CatalogError, Result};

use super::browse_cache::BrowseCache;

/// Rows per browse rail and per search bucket.
const ROW_LIMIT: i64 = 12;
/// Genre rails rendered on the browse page.
const GENRE_RAIL_LIMIT: usize = 6;
/// Titles with fewer votes than this never reach the top-rated rails.
const TOP_RATED_MIN_VOTES: i64 = 50;
const FEATURED_LIMIT: i64 = 10;
const SEARCH_LIMIT: i64 = 20;

/// The assembled browse page: hero carousel plus content rails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseResponse {
    pub featured: Vec<CatalogEntry>,
    pub latest_movies: Vec<MovieSummary>,
    pub latest_series: Vec<SeriesSummary>,
    pub top_rated_movies: Vec<MovieSummary>,
    pub top_rated_series: Vec<SeriesSummary>,
    pub genre_rails: Vec<GenreRail>,
}

/// One per-genre movie rail. Empty rails are dropped during assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRail {
    pub genre: Genre,
    pub movies: Vec<MovieSummary>,
}

/// Read side of the catalog: listings, details, browse, and search.
#[derive(Debug, Clone)]
pub struct CatalogQueryService {
    store: CatalogStore,
    browse_cache: Arc<BrowseCache>,
}

impl CatalogQueryService {
    pub fn new(store: CatalogStore, browse_cache: Arc<BrowseCache>) -> Self {
        Self {
            store,
            browse_cache,
        }
    }

    pub async fn movies(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Page<MovieSummary>> {
        self.store.movies.page(filter).await
    }

    pub async fn movie(&self, id: MovieId) -> Result<MovieDetail> {
        self.store
            .movies
            .detail(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("movie {id} not found")))
    }

    pub async fn movie_credits(&self, id: MovieId) -> Result<Vec<Credit>> {
        if self.store.movies.find(id).await?.is_none() {
            return Err(CatalogError::not_found(format!(
                "movie {id} not found"
            )));
        }
        self.store.movies.credits(id).await
    }

    pub async fn series(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Page<SeriesSummary>> {
        self.store.series.page(filter).await
    }

    pub async fn series_detail(&self, id: SeriesId) -> Result<SeriesDetail> {
        self.store
            .series
            .detail(id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!("series {id} not found"))
            })
    }

    pub async fn series_credits(&self, id: SeriesId) -> Result<Vec<Credit>> {
        if self.store.series.find(id).await?.is_none() {
            return Err(CatalogError::not_found(format!(
                "series {id} not found"
            )));
        }
        self.store.series.credits(id).await
    }

    pub async fn season(
        &self,
        series_id: SeriesId,
        season_number: i32,
    ) -> Result<SeasonDetail> {
        self.store
            .series
            .season(series_id, season_number)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!(
                    "season {season_number} of series {series_id} not found"
                ))
            })
    }

    pub async fn genres(&self) -> Result<Vec<Genre>> {
        self.store.genres.list().await
    }

    /// Assemble the browse page, memoized behind the TTL cache.
    pub async fn browse(&self) -> Result<BrowseResponse> {
        if let Some(cached) = self.browse_cache.get().await {
            return Ok(cached);
        }

        let content = &self.store.content;
        let featured = content.featured(FEATURED_LIMIT).await?;
        let latest_movies = content.latest_movies(ROW_LIMIT).await?;
        let latest_series = content.latest_series(ROW_LIMIT).await?;
        let top_rated_movies = content
            .top_rated_movies(ROW_LIMIT, TOP_RATED_MIN_VOTES)
            .await?;
        let top_rated_series = content
            .top_rated_series(ROW_LIMIT, TOP_RATED_MIN_VOTES)
            .await?;

        let mut genre_rails = Vec::new();
        for genre in self.store.genres.list().await? {
            if genre_rails.len() == GENRE_RAIL_LIMIT {
                break;
            }
            let movies = content.genre_movies(genre.id, ROW_LIMIT).await?;
            if !movies.is_empty() {
                genre_rails.push(GenreRail { genre, movies });
            }
        }

        let response = BrowseResponse {
            featured,
            latest_movies,
            latest_series,
            top_rated_movies,
            top_rated_series,
            genre_rails,
        };
        self.browse_cache.put(response.clone()).await;
        Ok(response)
    }

    pub async fn featured(&self) -> Result<Vec<CatalogEntry>> {
        self.store.content.featured(FEATURED_LIMIT).await
    }

    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::validation(
                "search query must not be empty",
            ));
        }
        self.store.content.search(query, SEARCH_LIMIT).await
    }

    pub async fn counts(&self) -> Result<CatalogCounts> {
        self.store.content.counts().await
    }
}
