//! Repository ports.
//!
//! Application services depend on these traits; the PostgreSQL adapters live
//! in [`super::postgres`] and tests provide in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parsflix_model::{
    Credit, CreditKind, Genre, GenreId, Movie, MovieDetail, MovieId,
    MovieSummary, Page, PageParams, SeasonDetail, Series, SeriesDetail,
    SeriesId, SeriesSummary, SessionId, TmdbId, User, UserId, UserRole,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ===== List filters =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    #[default]
    Latest,
    Title,
    Rating,
    Popularity,
    ReleaseDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filters for the paged movie/series listing endpoints. `genre` is the TMDB
/// genre id, which is what browsing clients hold.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub page: PageParams,
    pub genre: Option<TmdbId>,
    pub year: Option<i32>,
    pub search: Option<String>,
    pub sort: CatalogSort,
    pub order: SortOrder,
}

// ===== Ingestion graphs =====

#[derive(Debug, Clone, PartialEq)]
pub struct GenreSeed {
    pub tmdb_id: TmdbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonSeed {
    pub tmdb_id: TmdbId,
    pub name: String,
    pub profile_url: Option<String>,
    pub profile_public_id: Option<String>,
}

/// One credit row, keyed by the person's TMDB id within the same graph.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditSeed {
    pub person_tmdb_id: TmdbId,
    pub kind: CreditKind,
    pub character: Option<String>,
    pub job: Option<String>,
    pub department: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone)]
pub struct NewMovie {
    pub tmdb_id: TmdbId,
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
    pub created_by: UserId,
}

/// Everything needed to persist one movie atomically.
#[derive(Debug, Clone)]
pub struct NewMovieGraph {
    pub movie: NewMovie,
    pub genres: Vec<GenreSeed>,
    pub people: Vec<PersonSeed>,
    pub credits: Vec<CreditSeed>,
}

#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub tmdb_id: Option<TmdbId>,
    pub episode_number: i32,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub still_url: Option<String>,
    pub vote_average: f64,
}

#[derive(Debug, Clone)]
pub struct NewSeason {
    pub tmdb_id: Option<TmdbId>,
    pub season_number: i32,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub poster_url: Option<String>,
    pub poster_public_id: Option<String>,
    pub episode_count: i32,
    pub episodes: Vec<NewEpisode>,
}

#[derive(Debug, Clone)]
pub struct NewSeries {
    pub tmdb_id: TmdbId,
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
    pub created_by: UserId,
}

#[derive(Debug, Clone)]
pub struct NewSeriesGraph {
    pub series: NewSeries,
    pub genres: Vec<GenreSeed>,
    pub people: Vec<PersonSeed>,
    pub credits: Vec<CreditSeed>,
    pub seasons: Vec<NewSeason>,
}

// ===== Curated updates =====

/// Partial curated overrides; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub trailer_url: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

impl MovieUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.overview.is_none()
            && self.tagline.is_none()
            && self.trailer_url.is_none()
            && self.poster_url.is_none()
            && self.backdrop_url.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesUpdate {
    pub name: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub trailer_url: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

impl SeriesUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.overview.is_none()
            && self.tagline.is_none()
            && self.trailer_url.is_none()
            && self.poster_url.is_none()
            && self.backdrop_url.is_none()
    }
}

// ===== Cross-type read models =====

/// A mixed movie/series entry, discriminated on the wire by `media_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum CatalogEntry {
    Movie(MovieSummary),
    Series(SeriesSummary),
}

impl CatalogEntry {
    pub fn popularity(&self) -> f64 {
        match self {
            CatalogEntry::Movie(movie) => movie.popularity,
            CatalogEntry::Series(series) => series.popularity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub movies: Vec<MovieSummary>,
    pub series: Vec<SeriesSummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreSyncReport {
    pub inserted: u64,
    pub refreshed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub movies: u64,
    pub series: u64,
    pub episodes: u64,
    pub genres: u64,
    pub people: u64,
    pub users: u64,
}

// ===== Accounts and sessions =====

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// A refresh-token session row. Only the token's HMAC digest is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

// ===== Ports =====

#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn page(&self, filter: &CatalogFilter) -> Result<Page<MovieSummary>>;

    async fn find(&self, id: MovieId) -> Result<Option<Movie>>;

    async fn detail(&self, id: MovieId) -> Result<Option<MovieDetail>>;

    async fn find_by_tmdb_id(&self, tmdb_id: TmdbId) -> Result<Option<Movie>>;

    /// Persist the whole graph in one transaction. Duplicate `tmdb_id` is a
    /// `Conflict`; any failure leaves no partial rows.
    async fn create_graph(&self, graph: &NewMovieGraph) -> Result<MovieDetail>;

    async fn update(
        &self,
        id: MovieId,
        update: &MovieUpdate,
    ) -> Result<Option<Movie>>;

    /// Delete the row (links, credits cascade). Returns `false` when the id
    /// is unknown.
    async fn delete(&self, id: MovieId) -> Result<bool>;

    async fn credits(&self, id: MovieId) -> Result<Vec<Credit>>;
}

#[async_trait]
pub trait SeriesRepository: Send + Sync {
    async fn page(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Page<SeriesSummary>>;

    async fn find(&self, id: SeriesId) -> Result<Option<Series>>;

    async fn detail(&self, id: SeriesId) -> Result<Option<SeriesDetail>>;

    async fn find_by_tmdb_id(
        &self,
        tmdb_id: TmdbId,
    ) -> Result<Option<Series>>;

    /// Persist series, seasons, and episodes in one transaction.
    async fn create_graph(
        &self,
        graph: &NewSeriesGraph,
    ) -> Result<SeriesDetail>;

    async fn update(
        &self,
        id: SeriesId,
        update: &SeriesUpdate,
    ) -> Result<Option<Series>>;

    async fn delete(&self, id: SeriesId) -> Result<bool>;

    async fn credits(&self, id: SeriesId) -> Result<Vec<Credit>>;

    async fn season(
        &self,
        series_id: SeriesId,
        season_number: i32,
    ) -> Result<Option<SeasonDetail>>;
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Genre>>;

    async fn find(&self, id: GenreId) -> Result<Option<Genre>>;

    /// Insert-or-refresh by TMDB id; names follow TMDB on refresh.
    async fn upsert_many(
        &self,
        seeds: &[GenreSeed],
    ) -> Result<GenreSyncReport>;
}

/// Read-side queries backing the browse, search, and featured surfaces.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn latest_movies(&self, limit: i64) -> Result<Vec<MovieSummary>>;

    async fn latest_series(&self, limit: i64) -> Result<Vec<SeriesSummary>>;

    async fn top_rated_movies(
        &self,
        limit: i64,
        min_votes: i64,
    ) -> Result<Vec<MovieSummary>>;

    async fn top_rated_series(
        &self,
        limit: i64,
        min_votes: i64,
    ) -> Result<Vec<SeriesSummary>>;

    async fn genre_movies(
        &self,
        genre_id: GenreId,
        limit: i64,
    ) -> Result<Vec<MovieSummary>>;

    async fn search(&self, query: &str, limit: i64) -> Result<SearchResults>;

    /// Popularity-ranked mixed movie/series set for the hero carousel.
    async fn featured(&self, limit: i64) -> Result<Vec<CatalogEntry>>;

    async fn counts(&self) -> Result<CatalogCounts>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// User row plus credentials row in one transaction. A duplicate email
    /// is a `Conflict`.
    async fn create_with_password(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn password_hash(&self, id: UserId) -> Result<Option<String>>;

    async fn count(&self) -> Result<u64>;

    async fn touch_last_login(&self, id: UserId) -> Result<()>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: &NewSession) -> Result<SessionRecord>;

    /// Look up by token hash; revoked or expired sessions do not match.
    async fn find_active(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>>;

    async fn revoke(&self, id: SessionId) -> Result<bool>;

    async fn revoke_all_for_user(&self, user_id: UserId) -> Result<u64>;
}
