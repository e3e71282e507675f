use async_trait::async_trait;
use parsflix_model::{Genre, GenreId};
use sqlx::PgPool;

use crate::database::ports::{GenreRepository, GenreSeed, GenreSyncReport};
use crate::error::Result;

use super::rows::GenreRow;

#[derive(Debug, Clone)]
pub struct PostgresGenreRepository {
    pool: PgPool,
}

impl PostgresGenreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for PostgresGenreRepository {
    async fn list(&self) -> Result<Vec<Genre>> {
        let rows = sqlx::query_as::<_, GenreRow>(
            "SELECT id, tmdb_id, name FROM genres ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }

    async fn find(&self, id: GenreId) -> Result<Option<Genre>> {
        let row = sqlx::query_as::<_, GenreRow>(
            "SELECT id, tmdb_id, name FROM genres WHERE id = $1",
        )
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Genre::from))
    }

    async fn upsert_many(
        &self,
        seeds: &[GenreSeed],
    ) -> Result<GenreSyncReport> {
        let tmdb_ids: Vec<i64> =
            seeds.iter().map(|seed| seed.tmdb_id.value()).collect();

        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM genres WHERE tmdb_id = ANY($1)",
        )
        .bind(&tmdb_ids)
        .fetch_one(&mut *tx)
        .await?;

        for seed in seeds {
            sqlx::query(
                "INSERT INTO genres (id, tmdb_id, name)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (tmdb_id) DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(GenreId::new().to_uuid())
            .bind(seed.tmdb_id.value())
            .bind(&seed.name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let refreshed = existing as u64;
        Ok(GenreSyncReport {
            inserted: seeds.len() as u64 - refreshed,
            refreshed,
        })
    }
}
