use async_trait::async_trait;
use parsflix_model::{GenreId, MovieSummary, SeriesSummary};
use sqlx::PgPool;

use crate::database::ports::{
    CatalogCounts, CatalogEntry, ContentRepository, SearchResults,
};
use crate::error::Result;

use super::rows::{
    MovieSummaryRow, SeriesSummaryRow, MOVIE_SUMMARY_COLUMNS,
    SERIES_SUMMARY_COLUMNS,
};

#[derive(Debug, Clone)]
pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_table(&self, table: &str) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    async fn latest_movies(&self, limit: i64) -> Result<Vec<MovieSummary>> {
        let rows = sqlx::query_as::<_, MovieSummaryRow>(&format!(
            "SELECT {MOVIE_SUMMARY_COLUMNS} FROM movies
             ORDER BY created_at DESC, id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MovieSummary::from).collect())
    }

    async fn latest_series(&self, limit: i64) -> Result<Vec<SeriesSummary>> {
        let rows = sqlx::query_as::<_, SeriesSummaryRow>(&format!(
            "SELECT {SERIES_SUMMARY_COLUMNS} FROM series
             ORDER BY created_at DESC, id LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SeriesSummary::from).collect())
    }

    async fn top_rated_movies(
        &self,
        limit: i64,
        min_votes: i64,
    ) -> Result<Vec<MovieSummary>> {
        let rows = sqlx::query_as::<_, MovieSummaryRow>(&format!(
            "SELECT {MOVIE_SUMMARY_COLUMNS} FROM movies
             WHERE vote_count >= $2
             ORDER BY vote_average DESC, vote_count DESC LIMIT $1"
        ))
        .bind(limit)
        .bind(min_votes)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MovieSummary::from).collect())
    }

    async fn top_rated_series(
        &self,
        limit: i64,
        min_votes: i64,
    ) -> Result<Vec<SeriesSummary>> {
        let rows = sqlx::query_as::<_, SeriesSummaryRow>(&format!(
            "SELECT {SERIES_SUMMARY_COLUMNS} FROM series
             WHERE vote_count >= $2
             ORDER BY vote_average DESC, vote_count DESC LIMIT $1"
        ))
        .bind(limit)
        .bind(min_votes)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SeriesSummary::from).collect())
    }

    async fn genre_movies(
        &self,
        genre_id: GenreId,
        limit: i64,
    ) -> Result<Vec<MovieSummary>> {
        let rows = sqlx::query_as::<_, MovieSummaryRow>(&format!(
            "SELECT {MOVIE_SUMMARY_COLUMNS} FROM movies
             WHERE id IN (
                 SELECT movie_id FROM movie_genres WHERE genre_id = $1
             )
             ORDER BY popularity DESC, id LIMIT $2"
        ))
        .bind(genre_id.to_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MovieSummary::from).collect())
    }

    async fn search(&self, query: &str, limit: i64) -> Result<SearchResults> {
        let pattern = format!("%{query}%");

        let movies = sqlx::query_as::<_, MovieSummaryRow>(&format!(
            "SELECT {MOVIE_SUMMARY_COLUMNS} FROM movies
             WHERE title ILIKE $1 OR original_title ILIKE $1
             ORDER BY popularity DESC LIMIT $2"
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let series = sqlx::query_as::<_, SeriesSummaryRow>(&format!(
            "SELECT {SERIES_SUMMARY_COLUMNS} FROM series
             WHERE name ILIKE $1 OR original_name ILIKE $1
             ORDER BY popularity DESC LIMIT $2"
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(SearchResults {
            movies: movies.into_iter().map(MovieSummary::from).collect(),
            series: series.into_iter().map(SeriesSummary::from).collect(),
        })
    }

    async fn featured(&self, limit: i64) -> Result<Vec<CatalogEntry>> {
        let movies = sqlx::query_as::<_, MovieSummaryRow>(&format!(
            "SELECT {MOVIE_SUMMARY_COLUMNS} FROM movies
             ORDER BY popularity DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let series = sqlx::query_as::<_, SeriesSummaryRow>(&format!(
            "SELECT {SERIES_SUMMARY_COLUMNS} FROM series
             ORDER BY popularity DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut entries: Vec<CatalogEntry> = movies
            .into_iter()
            .map(|row| CatalogEntry::Movie(MovieSummary::from(row)))
            .chain(
                series
                    .into_iter()
                    .map(|row| CatalogEntry::Series(SeriesSummary::from(row))),
            )
            .collect();
        entries.sort_by(|a, b| {
            b.popularity()
                .partial_cmp(&a.popularity())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }

    async fn counts(&self) -> Result<CatalogCounts> {
        Ok(CatalogCounts {
            movies: self.count_table("movies").await?,
            series: self.count_table("series").await?,
            episodes: self.count_table("episodes").await?,
            genres: self.count_table("genres").await?,
            people: self.count_table("people").await?,
            users: self.count_table("users").await?,
        })
    }
}
