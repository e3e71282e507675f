//! Row structs bridging SQL results to the domain model.
//!
//! The model crate stays database-agnostic, so every query maps through one
//! of these `FromRow` types and a `From` impl.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use parsflix_model::{
    Credit, CreditKind, Episode, EpisodeId, Genre, GenreId, Movie, MovieId,
    MovieSummary, Person, PersonId, Season, SeasonId, Series, SeriesId,
    SeriesSummary, SessionId, TmdbId, User, UserId, UserRole,
};
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use crate::database::ports::{
    CreditSeed, GenreSeed, PersonSeed, SessionRecord,
};
use crate::error::Result;

#[derive(Debug, FromRow)]
pub(crate) struct MovieRow {
    pub id: Uuid,
    pub tmdb_id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub original_language: Option<String>,
    pub status: Option<String>,
    pub poster_url: Option<String>,
    pub poster_public_id: Option<String>,
    pub backdrop_url: Option<String>,
    pub backdrop_public_id: Option<String>,
    pub trailer_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const MOVIE_COLUMNS: &str = "id, tmdb_id, title, original_title, \
     tagline, overview, release_date, runtime_minutes, vote_average, \
     vote_count, popularity, original_language, status, poster_url, \
     poster_public_id, backdrop_url, backdrop_public_id, trailer_url, \
     created_by, created_at, updated_at";

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: MovieId::from_uuid(row.id),
            tmdb_id: TmdbId(row.tmdb_id),
            title: row.title,
            original_title: row.original_title,
            tagline: row.tagline,
            overview: row.overview,
            release_date: row.release_date,
            runtime_minutes: row.runtime_minutes,
            vote_average: row.vote_average,
            vote_count: row.vote_count,
            popularity: row.popularity,
            original_language: row.original_language,
            status: row.status,
            poster_url: row.poster_url,
            poster_public_id: row.poster_public_id,
            backdrop_url: row.backdrop_url,
            backdrop_public_id: row.backdrop_public_id,
            trailer_url: row.trailer_url,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MovieSummaryRow {
    pub id: Uuid,
    pub tmdb_id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub popularity: f64,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

pub(crate) const MOVIE_SUMMARY_COLUMNS: &str = "id, tmdb_id, title, \
     release_date, vote_average, popularity, poster_url, backdrop_url";

impl From<MovieSummaryRow> for MovieSummary {
    fn from(row: MovieSummaryRow) -> Self {
        MovieSummary {
            id: MovieId::from_uuid(row.id),
            tmdb_id: TmdbId(row.tmdb_id),
            title: row.title,
            release_date: row.release_date,
            vote_average: row.vote_average,
            popularity: row.popularity,
            poster_url: row.poster_url,
            backdrop_url: row.backdrop_url,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SeriesRow {
    pub id: Uuid,
    pub tmdb_id: i64,
    pub name: String,
    pub original_name: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    pub number_of_seasons: i32,
    pub number_of_episodes: i32,
    pub status: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub original_language: Option<String>,
    pub poster_url: Option<String>,
    pub poster_public_id: Option<String>,
    pub backdrop_url: Option<String>,
    pub backdrop_public_id: Option<String>,
    pub trailer_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const SERIES_COLUMNS: &str = "id, tmdb_id, name, original_name, \
     tagline, overview, first_air_date, last_air_date, number_of_seasons, \
     number_of_episodes, status, vote_average, vote_count, popularity, \
     original_language, poster_url, poster_public_id, backdrop_url, \
     backdrop_public_id, trailer_url, created_by, created_at, updated_at";

impl From<SeriesRow> for Series {
    fn from(row: SeriesRow) -> Self {
        Series {
            id: SeriesId::from_uuid(row.id),
            tmdb_id: TmdbId(row.tmdb_id),
            name: row.name,
            original_name: row.original_name,
            tagline: row.tagline,
            overview: row.overview,
            first_air_date: row.first_air_date,
            last_air_date: row.last_air_date,
            number_of_seasons: row.number_of_seasons,
            number_of_episodes: row.number_of_episodes,
            status: row.status,
            vote_average: row.vote_average,
            vote_count: row.vote_count,
            popularity: row.popularity,
            original_language: row.original_language,
            poster_url: row.poster_url,
            poster_public_id: row.poster_public_id,
            backdrop_url: row.backdrop_url,
            backdrop_public_id: row.backdrop_public_id,
            trailer_url: row.trailer_url,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SeriesSummaryRow {
    pub id: Uuid,
    pub tmdb_id: i64,
    pub name: String,
    pub first_air_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub popularity: f64,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

pub(crate) const SERIES_SUMMARY_COLUMNS: &str = "id, tmdb_id, name, \
     first_air_date, vote_average, popularity, poster_url, backdrop_url";

impl From<SeriesSummaryRow> for SeriesSummary {
    fn from(row: SeriesSummaryRow) -> Self {
        SeriesSummary {
            id: SeriesId::from_uuid(row.id),
            tmdb_id: TmdbId(row.tmdb_id),
            name: row.name,
            first_air_date: row.first_air_date,
            vote_average: row.vote_average,
            popularity: row.popularity,
            poster_url: row.poster_url,
            backdrop_url: row.backdrop_url,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SeasonRow {
    pub id: Uuid,
    pub series_id: Uuid,
    pub tmdb_id: Option<i64>,
    pub season_number: i32,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub poster_url: Option<String>,
    pub poster_public_id: Option<String>,
    pub episode_count: i32,
}

impl From<SeasonRow> for Season {
    fn from(row: SeasonRow) -> Self {
        Season {
            id: SeasonId::from_uuid(row.id),
            series_id: SeriesId::from_uuid(row.series_id),
            tmdb_id: row.tmdb_id.map(TmdbId),
            season_number: row.season_number,
            name: row.name,
            overview: row.overview,
            air_date: row.air_date,
            poster_url: row.poster_url,
            poster_public_id: row.poster_public_id,
            episode_count: row.episode_count,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct EpisodeRow {
    pub id: Uuid,
    pub season_id: Uuid,
    pub tmdb_id: Option<i64>,
    pub episode_number: i32,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub still_url: Option<String>,
    pub vote_average: f64,
}

impl From<EpisodeRow> for Episode {
    fn from(row: EpisodeRow) -> Self {
        Episode {
            id: EpisodeId::from_uuid(row.id),
            season_id: SeasonId::from_uuid(row.season_id),
            tmdb_id: row.tmdb_id.map(TmdbId),
            episode_number: row.episode_number,
            name: row.name,
            overview: row.overview,
            air_date: row.air_date,
            runtime_minutes: row.runtime_minutes,
            still_url: row.still_url,
            vote_average: row.vote_average,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct GenreRow {
    pub id: Uuid,
    pub tmdb_id: i64,
    pub name: String,
}

impl From<GenreRow> for Genre {
    fn from(row: GenreRow) -> Self {
        Genre {
            id: GenreId::from_uuid(row.id),
            tmdb_id: TmdbId(row.tmdb_id),
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PersonRow {
    pub id: Uuid,
    pub tmdb_id: i64,
    pub name: String,
    pub profile_url: Option<String>,
    pub profile_public_id: Option<String>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: PersonId::from_uuid(row.id),
            tmdb_id: TmdbId(row.tmdb_id),
            name: row.name,
            profile_url: row.profile_url,
            profile_public_id: row.profile_public_id,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CreditRow {
    pub person_id: Uuid,
    pub person_tmdb_id: i64,
    pub person_name: String,
    pub profile_url: Option<String>,
    pub profile_public_id: Option<String>,
    pub kind: String,
    pub character_name: Option<String>,
    pub job: Option<String>,
    pub department: Option<String>,
    pub credit_order: i32,
}

impl From<CreditRow> for Credit {
    fn from(row: CreditRow) -> Self {
        Credit {
            person: Person {
                id: PersonId::from_uuid(row.person_id),
                tmdb_id: TmdbId(row.person_tmdb_id),
                name: row.person_name,
                profile_url: row.profile_url,
                profile_public_id: row.profile_public_id,
            },
            kind: match row.kind.as_str() {
                "crew" => CreditKind::Crew,
                _ => CreditKind::Cast,
            },
            character: row.character_name,
            job: row.job,
            department: row.department,
            position: row.credit_order,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

pub(crate) const USER_COLUMNS: &str =
    "id, email, display_name, role, created_at, last_login_at";

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            role: UserRole::parse(&row.role).unwrap_or(UserRole::User),
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        SessionRecord {
            id: SessionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            revoked: row.revoked,
            created_at: row.created_at,
        }
    }
}

// ===== Shared graph helpers =====
//
// Movie and series ingestion both upsert genres/people and replace credit
// rows inside the caller's transaction.

pub(crate) async fn upsert_genres(
    tx: &mut Transaction<'_, Postgres>,
    seeds: &[GenreSeed],
) -> Result<Vec<Genre>> {
    let mut genres = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let row = sqlx::query_as::<_, GenreRow>(
            "INSERT INTO genres (id, tmdb_id, name)
             VALUES ($1, $2, $3)
             ON CONFLICT (tmdb_id) DO UPDATE SET name = EXCLUDED.name
             RETURNING id, tmdb_id, name",
        )
        .bind(GenreId::new().to_uuid())
        .bind(seed.tmdb_id.value())
        .bind(&seed.name)
        .fetch_one(&mut **tx)
        .await?;
        genres.push(Genre::from(row));
    }
    Ok(genres)
}

/// Upsert people by TMDB id. Known people keep their stored profile image;
/// only name refreshes follow the provider.
pub(crate) async fn upsert_people(
    tx: &mut Transaction<'_, Postgres>,
    seeds: &[PersonSeed],
) -> Result<HashMap<i64, Person>> {
    let mut people = HashMap::with_capacity(seeds.len());
    for seed in seeds {
        let row = sqlx::query_as::<_, PersonRow>(
            "INSERT INTO people (id, tmdb_id, name, profile_url, profile_public_id)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (tmdb_id) DO UPDATE SET
                 name = EXCLUDED.name,
                 profile_url =
                     COALESCE(people.profile_url, EXCLUDED.profile_url),
                 profile_public_id =
                     COALESCE(people.profile_public_id, EXCLUDED.profile_public_id)
             RETURNING id, tmdb_id, name, profile_url, profile_public_id",
        )
        .bind(PersonId::new().to_uuid())
        .bind(seed.tmdb_id.value())
        .bind(&seed.name)
        .bind(&seed.profile_url)
        .bind(&seed.profile_public_id)
        .fetch_one(&mut **tx)
        .await?;
        people.insert(seed.tmdb_id.value(), Person::from(row));
    }
    Ok(people)
}

pub(crate) enum CreditTable {
    Movie,
    Series,
}

impl CreditTable {
    fn table(&self) -> &'static str {
        match self {
            CreditTable::Movie => "movie_credits",
            CreditTable::Series => "series_credits",
        }
    }

    fn owner_column(&self) -> &'static str {
        match self {
            CreditTable::Movie => "movie_id",
            CreditTable::Series => "series_id",
        }
    }
}

/// Replace the owner's credit rows wholesale so re-ingestion never leaves
/// stale entries behind. Seeds whose person is missing from `people` are
/// skipped.
pub(crate) async fn replace_credits(
    tx: &mut Transaction<'_, Postgres>,
    table: CreditTable,
    owner_id: Uuid,
    seeds: &[CreditSeed],
    people: &HashMap<i64, Person>,
) -> Result<Vec<Credit>> {
    sqlx::query(&format!(
        "DELETE FROM {} WHERE {} = $1",
        table.table(),
        table.owner_column()
    ))
    .bind(owner_id)
    .execute(&mut **tx)
    .await?;

    let insert = format!(
        "INSERT INTO {} (id, {}, person_id, kind, character_name, job, \
         department, credit_order)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        table.table(),
        table.owner_column()
    );

    let mut credits = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let Some(person) = people.get(&seed.person_tmdb_id.value()) else {
            continue;
        };
        sqlx::query(&insert)
            .bind(Uuid::now_v7())
            .bind(owner_id)
            .bind(person.id.to_uuid())
            .bind(seed.kind.as_str())
            .bind(&seed.character)
            .bind(&seed.job)
            .bind(&seed.department)
            .bind(seed.position)
            .execute(&mut **tx)
            .await?;
        credits.push(Credit {
            person: person.clone(),
            kind: seed.kind,
            character: seed.character.clone(),
            job: seed.job.clone(),
            department: seed.department.clone(),
            position: seed.position,
        });
    }
    Ok(credits)
}

/// Split a mixed credit list into billing-ordered cast and crew.
pub(crate) fn split_credits(credits: Vec<Credit>) -> (Vec<Credit>, Vec<Credit>) {
    let (mut cast, mut crew): (Vec<_>, Vec<_>) = credits
        .into_iter()
        .partition(|credit| credit.kind == CreditKind::Cast);
    cast.sort_by_key(|credit| credit.position);
    crew.sort_by_key(|credit| credit.position);
    (cast, crew)
}
