use async_trait::async_trait;
use parsflix_model::{
    Credit, Genre, Movie, MovieDetail, MovieId, MovieSummary, Page, TmdbId,
};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::ports::{
    CatalogFilter, CatalogSort, MovieRepository, MovieUpdate, NewMovieGraph,
    SortOrder,
};
use crate::error::{CatalogError, Result};

use super::rows::{
    replace_credits, split_credits, upsert_genres, upsert_people, CreditRow,
    CreditTable, GenreRow, MovieRow, MovieSummaryRow, MOVIE_COLUMNS,
    MOVIE_SUMMARY_COLUMNS,
};

#[derive(Debug, Clone)]
pub struct PostgresMovieRepository {
    pool: PgPool,
}

impl PostgresMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn genres_for(&self, id: MovieId) -> Result<Vec<Genre>> {
        let rows = sqlx::query_as::<_, GenreRow>(
            "SELECT g.id, g.tmdb_id, g.name
             FROM genres g
             JOIN movie_genres mg ON mg.genre_id = g.id
             WHERE mg.movie_id = $1
             ORDER BY g.name",
        )
        .bind(id.to_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter) {
    if let Some(genre) = filter.genre {
        builder.push(
            " AND id IN (SELECT mg.movie_id FROM movie_genres mg \
             JOIN genres g ON g.id = mg.genre_id WHERE g.tmdb_id = ",
        );
        builder.push_bind(genre.value());
        builder.push(")");
    }
    if let Some(year) = filter.year {
        builder.push(" AND EXTRACT(YEAR FROM release_date) = ");
        builder.push_bind(year);
    }
    if let Some(search) = filter.search.as_deref() {
        builder.push(" AND title ILIKE ");
        builder.push_bind(format!("%{search}%"));
    }
}

fn order_clause(filter: &CatalogFilter) -> String {
    let column = match filter.sort {
        CatalogSort::Latest => "created_at",
        CatalogSort::Title => "title",
        CatalogSort::Rating => "vote_average",
        CatalogSort::Popularity => "popularity",
        CatalogSort::ReleaseDate => "release_date",
    };
    let direction = match filter.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!(" ORDER BY {column} {direction} NULLS LAST, id")
}

#[async_trait]
impl MovieRepository for PostgresMovieRepository {
    async fn page(&self, filter: &CatalogFilter) -> Result<Page<MovieSummary>> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM movies WHERE TRUE",
        );
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {MOVIE_SUMMARY_COLUMNS} FROM movies WHERE TRUE"
        ));
        push_filters(&mut query, filter);
        query.push(order_clause(filter));
        query.push(" LIMIT ");
        query.push_bind(filter.page.limit());
        query.push(" OFFSET ");
        query.push_bind(filter.page.offset());

        let rows = query
            .build_query_as::<MovieSummaryRow>()
            .fetch_all(&self.pool)
            .await?;
        let items = rows.into_iter().map(MovieSummary::from).collect();
        Ok(Page::new(items, filter.page, total as u64))
    }

    async fn find(&self, id: MovieId) -> Result<Option<Movie>> {
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Movie::from))
    }

    async fn detail(&self, id: MovieId) -> Result<Option<MovieDetail>> {
        let Some(movie) = self.find(id).await? else {
            return Ok(None);
        };
        let genres = self.genres_for(id).await?;
        let (cast, crew) = split_credits(self.credits(id).await?);
        Ok(Some(MovieDetail {
            movie,
            genres,
            cast,
            crew,
        }))
    }

    async fn find_by_tmdb_id(&self, tmdb_id: TmdbId) -> Result<Option<Movie>> {
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE tmdb_id = $1"
        ))
        .bind(tmdb_id.value())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Movie::from))
    }

    async fn create_graph(&self, graph: &NewMovieGraph) -> Result<MovieDetail> {
        let mut tx = self.pool.begin().await?;

        let new = &graph.movie;
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            "INSERT INTO movies (id, tmdb_id, title, original_title, tagline, \
             overview, release_date, runtime_minutes, vote_average, \
             vote_count, popularity, original_language, status, poster_url, \
             poster_public_id, backdrop_url, backdrop_public_id, trailer_url, \
             created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
             $14, $15, $16, $17, $18, $19)
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(MovieId::new().to_uuid())
        .bind(new.tmdb_id.value())
        .bind(&new.title)
        .bind(&new.original_title)
        .bind(&new.tagline)
        .bind(&new.overview)
        .bind(new.release_date)
        .bind(new.runtime_minutes)
        .bind(new.vote_average)
        .bind(new.vote_count)
        .bind(new.popularity)
        .bind(&new.original_language)
        .bind(&new.status)
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
                if db.constraint() == Some("movies_tmdb_id_key") =>
            {
                CatalogError::conflict(format!(
                    "movie with TMDB id {} is already in the catalog",
                    new.tmdb_id
                ))
            }
            _ => CatalogError::from(err),
        })?;
        let movie = Movie::from(row);

        let genres = upsert_genres(&mut tx, &graph.genres).await?;
        for genre in &genres {
            sqlx::query(
                "INSERT INTO movie_genres (movie_id, genre_id)
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(movie.id.to_uuid())
            .bind(genre.id.to_uuid())
            .execute(&mut *tx)
            .await?;
        }

        let people = upsert_people(&mut tx, &graph.people).await?;
        let credits = replace_credits(
            &mut tx,
            CreditTable::Movie,
            movie.id.to_uuid(),
            &graph.credits,
            &people,
        )
        .await?;

        tx.commit().await?;

        let (cast, crew) = split_credits(credits);
        Ok(MovieDetail {
            movie,
            genres,
            cast,
            crew,
        })
    }

    async fn update(
        &self,
        id: MovieId,
        update: &MovieUpdate,
    ) -> Result<Option<Movie>> {
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            "UPDATE movies SET
                 title = COALESCE($2, title),
                 overview = COALESCE($3, overview),
                 tagline = COALESCE($4, tagline),
                 trailer_url = COALESCE($5, trailer_url),
                 poster_url = COALESCE($6, poster_url),
                 backdrop_url = COALESCE($7, backdrop_url),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(id.to_uuid())
        .bind(&update.title)
        .bind(&update.overview)
        .bind(&update.tagline)
        .bind(&update.trailer_url)
        .bind(&update.poster_url)
        .bind(&update.backdrop_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Movie::from))
    }

    async fn delete(&self, id: MovieId) -> Result<bool> {
        let done = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn credits(&self, id: MovieId) -> Result<Vec<Credit>> {
        let rows = sqlx::query_as::<_, CreditRow>(
            "SELECT p.id AS person_id, p.tmdb_id AS person_tmdb_id,
                    p.name AS person_name, p.profile_url, p.profile_public_id,
                    mc.kind, mc.character_name, mc.job, mc.department,
                    mc.credit_order
             FROM movie_credits mc
             JOIN people p ON p.id = mc.person_id
             WHERE mc.movie_id = $1
             ORDER BY mc.kind, mc.credit_order",
        )
        .bind(id.to_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Credit::from).collect())
    }
}
