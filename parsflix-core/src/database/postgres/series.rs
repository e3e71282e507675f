use async_trait::async_trait;
use parsflix_model::{
    Credit, Episode, Genre, Page, Season, SeasonDetail, SeasonId, Series,
    SeriesDetail, SeriesId, SeriesSummary, TmdbId,
};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::database::ports::{
    CatalogFilter, CatalogSort, NewSeason, NewSeriesGraph, SeriesRepository,
    SeriesUpdate, SortOrder,
};
use crate::error::{CatalogError, Result};

use super::rows::{
    replace_credits, split_credits, upsert_genres, upsert_people, CreditRow,
    CreditTable, EpisodeRow, GenreRow, SeasonRow, SeriesRow, SeriesSummaryRow,
    SERIES_COLUMNS, SERIES_SUMMARY_COLUMNS,
};

const SEASON_COLUMNS: &str = "id, series_id, tmdb_id, season_number, name, \
     overview, air_date, poster_url, poster_public_id, episode_count";

const EPISODE_COLUMNS: &str = "id, season_id, tmdb_id, episode_number, name, \
     overview, air_date, runtime_minutes, still_url, vote_average";

#[derive(Debug, Clone)]
pub struct PostgresSeriesRepository {
    pool: PgPool,
}

impl PostgresSeriesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn genres_for(&self, id: SeriesId) -> Result<Vec<Genre>> {
        let rows = sqlx::query_as::<_, GenreRow>(
            "SELECT g.id, g.tmdb_id, g.name
             FROM genres g
             JOIN series_genres sg ON sg.genre_id = g.id
             WHERE sg.series_id = $1
             ORDER BY g.name",
        )
        .bind(id.to_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }

    async fn seasons_for(&self, id: SeriesId) -> Result<Vec<Season>> {
        let rows = sqlx::query_as::<_, SeasonRow>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons
             WHERE series_id = $1 ORDER BY season_number"
        ))
        .bind(id.to_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Season::from).collect())
    }
}

async fn insert_season(
    tx: &mut Transaction<'_, Postgres>,
    series_id: SeriesId,
    new: &NewSeason,
) -> Result<Season> {
    let row = sqlx::query_as::<_, SeasonRow>(&format!(
        "INSERT INTO seasons (id, series_id, tmdb_id, season_number, name, \
         overview, air_date, poster_url, poster_public_id, episode_count)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {SEASON_COLUMNS}"
    ))
    .bind(SeasonId::new().to_uuid())
    .bind(series_id.to_uuid())
    .bind(new.tmdb_id.map(|id| id.value()))
    .bind(new.season_number)
    .bind(&new.name)
    .bind(&new.overview)
    .bind(new.air_date)
    .bind(&new.poster_url)
    .bind(&new.poster_public_id)
    .bind(new.episode_count)
    .fetch_one(&mut **tx)
    .await?;
    let season = Season::from(row);

    for episode in &new.episodes {
        sqlx::query(
            "INSERT INTO episodes (id, season_id, tmdb_id, episode_number, \
             name, overview, air_date, runtime_minutes, still_url, \
             vote_average)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(parsflix_model::EpisodeId::new().to_uuid())
        .bind(season.id.to_uuid())
        .bind(episode.tmdb_id.map(|id| id.value()))
        .bind(episode.episode_number)
        .bind(&episode.name)
        .bind(&episode.overview)
        .bind(episode.air_date)
        .bind(episode.runtime_minutes)
        .bind(&episode.still_url)
        .bind(episode.vote_average)
        .execute(&mut **tx)
        .await?;
    }
    Ok(season)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter) {
    if let Some(genre) = filter.genre {
        builder.push(
            " AND id IN (SELECT sg.series_id FROM series_genres sg \
             JOIN genres g ON g.id = sg.genre_id WHERE g.tmdb_id = ",
        );
        builder.push_bind(genre.value());
        builder.push(")");
    }
    if let Some(year) = filter.year {
        builder.push(" AND EXTRACT(YEAR FROM first_air_date) = ");
        builder.push_bind(year);
    }
    if let Some(search) = filter.search.as_deref() {
        builder.push(" AND name ILIKE ");
        builder.push_bind(format!("%{search}%"));
    }
}

fn order_clause(filter: &CatalogFilter) -> String {
    let column = match filter.sort {
        CatalogSort::Latest => "created_at",
        CatalogSort::Title => "name",
        CatalogSort::Rating => "vote_average",
        CatalogSort::Popularity => "popularity",
        CatalogSort::ReleaseDate => "first_air_date",
    };
    let direction = match filter.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!(" ORDER BY {column} {direction} NULLS LAST, id")
}

#[async_trait]
impl SeriesRepository for PostgresSeriesRepository {
    async fn page(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Page<SeriesSummary>> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM series WHERE TRUE",
        );
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {SERIES_SUMMARY_COLUMNS} FROM series WHERE TRUE"
        ));
        push_filters(&mut query, filter);
        query.push(order_clause(filter));
        query.push(" LIMIT ");
        query.push_bind(filter.page.limit());
        query.push(" OFFSET ");
        query.push_bind(filter.page.offset());

        let rows = query
            .build_query_as::<SeriesSummaryRow>()
            .fetch_all(&self.pool)
            .await?;
        let items = rows.into_iter().map(SeriesSummary::from).collect();
        Ok(Page::new(items, filter.page, total as u64))
    }

    async fn find(&self, id: SeriesId) -> Result<Option<Series>> {
        let row = sqlx::query_as::<_, SeriesRow>(&format!(
            "SELECT {SERIES_COLUMNS} FROM series WHERE id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Series::from))
    }

    async fn detail(&self, id: SeriesId) -> Result<Option<SeriesDetail>> {
        let Some(series) = self.find(id).await? else {
            return Ok(None);
        };
        let genres = self.genres_for(id).await?;
        let seasons = self.seasons_for(id).await?;
        let (cast, crew) = split_credits(self.credits(id).await?);
        Ok(Some(SeriesDetail {
            series,
            genres,
            seasons,
            cast,
            crew,
        }))
    }

    async fn find_by_tmdb_id(
        &self,
        tmdb_id: TmdbId,
    ) -> Result<Option<Series>> {
        let row = sqlx::query_as::<_, SeriesRow>(&format!(
            "SELECT {SERIES_COLUMNS} FROM series WHERE tmdb_id = $1"
        ))
        .bind(tmdb_id.value())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Series::from))
    }

    async fn create_graph(
        &self,
        graph: &NewSeriesGraph,
    ) -> Result<SeriesDetail> {
        let mut tx = self.pool.begin().await?;

        let new = &graph.series;
        let row = sqlx::query_as::<_, SeriesRow>(&format!(
            "INSERT INTO series (id, tmdb_id, name, original_name, tagline, \
             overview, first_air_date, last_air_date, number_of_seasons, \
             number_of_episodes, status, vote_average, vote_count, \
             popularity, original_language, poster_url, poster_public_id, \
             backdrop_url, backdrop_public_id, trailer_url, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
             $14, $15, $16, $17, $18, $19, $20, $21)
             RETURNING {SERIES_COLUMNS}"
        ))
        .bind(SeriesId::new().to_uuid())
        .bind(new.tmdb_id.value())
        .bind(&new.name)
        .bind(&new.original_name)
        .bind(&new.tagline)
        .bind(&new.overview)
        .bind(new.first_air_date)
        .bind(new.last_air_date)
        .bind(new.number_of_seasons)
        .bind(new.number_of_episodes)
        .bind(&new.status)
        .bind(new.vote_average)
        .bind(new.vote_count)
        .bind(new.popularity)
        .bind(&new.original_language)
        .bind(&new.poster_url)
        .bind(&new.poster_public_id)
        .bind(&new.backdrop_url)
        .bind(&new.backdrop_public_id)
        .bind(&new.trailer_url)
        .bind(new.created_by.to_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db)
                if db.constraint() == Some("series_tmdb_id_key") =>
            {
                CatalogError::conflict(format!(
                    "series with TMDB id {} is already in the catalog",
                    new.tmdb_id
                ))
            }
            _ => CatalogError::from(err),
        })?;
        let series = Series::from(row);

        let genres = upsert_genres(&mut tx, &graph.genres).await?;
        for genre in &genres {
            sqlx::query(
                "INSERT INTO series_genres (series_id, genre_id)
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(series.id.to_uuid())
            .bind(genre.id.to_uuid())
            .execute(&mut *tx)
            .await?;
        }

        let people = upsert_people(&mut tx, &graph.people).await?;
        let credits = replace_credits(
            &mut tx,
            CreditTable::Series,
            series.id.to_uuid(),
            &graph.credits,
            &people,
        )
        .await?;

        let mut seasons = Vec::with_capacity(graph.seasons.len());
        for season in &graph.seasons {
            seasons.push(insert_season(&mut tx, series.id, season).await?);
        }

        tx.commit().await?;

        let (cast, crew) = split_credits(credits);
        Ok(SeriesDetail {
            series,
            genres,
            seasons,
            cast,
            crew,
        })
    }

    async fn update(
        &self,
        id: SeriesId,
        update: &SeriesUpdate,
    ) -> Result<Option<Series>> {
        let row = sqlx::query_as::<_, SeriesRow>(&format!(
            "UPDATE series SET
                 name = COALESCE($2, name),
                 overview = COALESCE($3, overview),
                 tagline = COALESCE($4, tagline),
                 trailer_url = COALESCE($5, trailer_url),
                 poster_url = COALESCE($6, poster_url),
                 backdrop_url = COALESCE($7, backdrop_url),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {SERIES_COLUMNS}"
        ))
        .bind(id.to_uuid())
        .bind(&update.name)
        .bind(&update.overview)
        .bind(&update.tagline)
        .bind(&update.trailer_url)
        .bind(&update.poster_url)
        .bind(&update.backdrop_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Series::from))
    }

    async fn delete(&self, id: SeriesId) -> Result<bool> {
        let done = sqlx::query("DELETE FROM series WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn credits(&self, id: SeriesId) -> Result<Vec<Credit>> {
        let rows = sqlx::query_as::<_, CreditRow>(
            "SELECT p.id AS person_id, p.tmdb_id AS person_tmdb_id,
                    p.name AS person_name, p.profile_url, p.profile_public_id,
                    sc.kind, sc.character_name, sc.job, sc.department,
                    sc.credit_order
             FROM series_credits sc
             JOIN people p ON p.id = sc.person_id
             WHERE sc.series_id = $1
             ORDER BY sc.kind, sc.credit_order",
        )
        .bind(id.to_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Credit::from).collect())
    }

    async fn season(
        &self,
        series_id: SeriesId,
        season_number: i32,
    ) -> Result<Option<SeasonDetail>> {
        let row = sqlx::query_as::<_, SeasonRow>(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons
             WHERE series_id = $1 AND season_number = $2"
        ))
        .bind(series_id.to_uuid())
        .bind(season_number)
        .fetch_optional(&self.pool)
        .await?;
        let Some(season) = row.map(Season::from) else {
            return Ok(None);
        };

        let episodes = sqlx::query_as::<_, EpisodeRow>(&format!(
            "SELECT {EPISODE_COLUMNS} FROM episodes
             WHERE season_id = $1 ORDER BY episode_number"
        ))
        .bind(season.id.to_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(SeasonDetail {
            season,
            episodes: episodes.into_iter().map(Episode::from).collect(),
        }))
    }
}
