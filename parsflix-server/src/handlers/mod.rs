//! Request handlers for the public and admin API surfaces.

pub mod admin;
pub mod content;
pub mod genres;
pub mod movies;
pub mod series;

use parsflix_core::database::ports::{CatalogFilter, CatalogSort, SortOrder};
use parsflix_model::{PageParams, TmdbId};
use serde::Deserialize;

/// Query parameters shared by the movie and series listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// TMDB genre id, matching what `/genres` returns.
    pub genre: Option<i64>,
    pub year: Option<i32>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: CatalogSort,
    #[serde(default)]
    pub order: SortOrder,
}

impl ListQuery {
    pub fn into_filter(self) -> CatalogFilter {
        CatalogFilter {
            page: PageParams::new(self.page, self.per_page),
            genre: self.genre.map(TmdbId),
            year: self.year,
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            sort: self.sort,
            order: self.order,
        }
    }
}
