//! In-memory adapters and a `TestServer` harness for the API tests.
//!
//! Nothing here touches PostgreSQL, TMDB, or Cloudinary; every port is
//! backed by mutex-guarded vectors so each test owns its world.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use argon2::ParamsBuilder;
use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Datelike, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use parsflix_core::auth::AuthCrypto;
use parsflix_core::database::CatalogStore;
use parsflix_core::database::ports::{
    CatalogCounts, CatalogEntry, CatalogFilter, CatalogSort, ContentRepository,
    CreditSeed, GenreRepository, GenreSeed, GenreSyncReport, MovieRepository,
    MovieUpdate, NewMovieGraph, NewSeriesGraph, NewSession, NewUser,
    PersonSeed, SearchResults, SeriesRepository, SeriesUpdate, SessionRecord,
    SessionRepository, SortOrder, UserRepository,
};
use parsflix_core::error::{CatalogError, Result};
use parsflix_core::images::{ImageStore, ImageStoreError, StoredImage};
use parsflix_core::metadata::ProviderError;
use parsflix_core::metadata::types::{
    CastMember, Credits, GenreEntry, MovieDetails, MovieSearchResult,
    SearchPage, SeasonDetails, SeriesDetails, SeriesSearchResult,
};
use parsflix_core::metadata::{
    BackdropSize, MetadataProvider, PosterSize, ProfileSize, StillSize,
};
use parsflix_model::{
    Credit, CreditKind, Episode, EpisodeId, Genre, GenreId, Movie,
    MovieDetail, MovieId, MovieSummary, Page, Person, PersonId, Season,
    SeasonDetail, SeasonId, Series, SeriesDetail, SeriesId, SeriesSummary,
    SessionId, TmdbId, User, UserId,
};
use parsflix_server::auth::jwt::TokenSigner;
use parsflix_server::infra::app_state::AppState;
use parsflix_server::infra::config::{
    AuthConfig, CloudinarySettings, Config, ConfigMetadata, CorsConfig,
    DatabaseConfig, IngestConfig, ServerConfig, TmdbConfig,
};
use parsflix_server::routes;

// ===== In-memory catalog =====

#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<CatalogState>,
}

#[derive(Default)]
struct CatalogState {
    movies: Vec<MovieDetail>,
    series: Vec<StoredSeries>,
    genres: Vec<Genre>,
    users: Vec<UserAccount>,
    sessions: Vec<SessionRecord>,
}

struct StoredSeries {
    detail: SeriesDetail,
    seasons: Vec<SeasonDetail>,
}

struct UserAccount {
    user: User,
    password_hash: String,
}

impl MemoryCatalog {
    pub fn movie_count(&self) -> usize {
        self.state.lock().unwrap().movies.len()
    }

    pub fn series_count(&self) -> usize {
        self.state.lock().unwrap().series.len()
    }

    fn upsert_genres(
        state: &mut CatalogState,
        seeds: &[GenreSeed],
    ) -> Vec<Genre> {
        let mut out = Vec::new();
        for seed in seeds {
            if let Some(existing) = state
                .genres
                .iter_mut()
                .find(|genre| genre.tmdb_id == seed.tmdb_id)
            {
                existing.name = seed.name.clone();
                out.push(existing.clone());
            } else {
                let genre = Genre {
                    id: GenreId::new(),
                    tmdb_id: seed.tmdb_id,
                    name: seed.name.clone(),
                };
                state.genres.push(genre.clone());
                out.push(genre);
            }
        }
        out
    }

    fn build_credits(
        graph_people: &[PersonSeed],
        seeds: &[CreditSeed],
    ) -> (Vec<Credit>, Vec<Credit>) {
        let people: HashMap<i64, Person> = graph_people
            .iter()
            .map(|seed| {
                (
                    seed.tmdb_id.value(),
                    Person {
                        id: PersonId::new(),
                        tmdb_id: seed.tmdb_id,
                        name: seed.name.clone(),
                        profile_url: seed.profile_url.clone(),
                        profile_public_id: seed.profile_public_id.clone(),
                    },
                )
            })
            .collect();

        let mut cast = Vec::new();
        let mut crew = Vec::new();
        for seed in seeds {
            let Some(person) = people.get(&seed.person_tmdb_id.value()) else {
                continue;
            };
            let credit = Credit {
                person: person.clone(),
                kind: seed.kind,
                character: seed.character.clone(),
                job: seed.job.clone(),
                department: seed.department.clone(),
                position: seed.position,
            };
            match seed.kind {
                CreditKind::Cast => cast.push(credit),
                CreditKind::Crew => crew.push(credit),
            }
        }
        cast.sort_by_key(|credit| credit.position);
        crew.sort_by_key(|credit| credit.position);
        (cast, crew)
    }
}

fn page_slice<T: Clone>(items: Vec<T>, filter: &CatalogFilter) -> Page<T> {
    let total = items.len() as u64;
    let start = filter.page.offset() as usize;
    let sliced: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(filter.page.limit() as usize)
        .collect();
    Page::new(sliced, filter.page, total)
}

#[async_trait]
impl MovieRepository for MemoryCatalog {
    async fn page(&self, filter: &CatalogFilter) -> Result<Page<MovieSummary>> {
        let state = self.state.lock().unwrap();
        let mut matched: Vec<&MovieDetail> = state
            .movies
            .iter()
            .filter(|detail| {
                let movie = &detail.movie;
                if let Some(search) = &filter.search
                    && !movie
                        .title
                        .to_lowercase()
                        .contains(&search.to_lowercase())
                {
                    return false;
                }
                if let Some(year) = filter.year
                    && movie.release_date.map(|d| d.year()) != Some(year)
                {
                    return false;
                }
                if let Some(genre) = filter.genre
                    && !detail.genres.iter().any(|g| g.tmdb_id == genre)
                {
                    return false;
                }
                true
            })
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match filter.sort {
                CatalogSort::Latest => {
                    a.movie.created_at.cmp(&b.movie.created_at)
                }
                CatalogSort::Title => a.movie.title.cmp(&b.movie.title),
                CatalogSort::Rating => a
                    .movie
                    .vote_average
                    .partial_cmp(&b.movie.vote_average)
                    .unwrap_or(std::cmp::Ordering::Equal),
                CatalogSort::Popularity => a
                    .movie
                    .popularity
                    .partial_cmp(&b.movie.popularity)
                    .unwrap_or(std::cmp::Ordering::Equal),
                CatalogSort::ReleaseDate => {
                    a.movie.release_date.cmp(&b.movie.release_date)
                }
            };
            match filter.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let summaries: Vec<MovieSummary> =
            matched.iter().map(|detail| detail.movie.summary()).collect();
        Ok(page_slice(summaries, filter))
    }

    async fn find(&self, id: MovieId) -> Result<Option<Movie>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .movies
            .iter()
            .find(|detail| detail.movie.id == id)
            .map(|detail| detail.movie.clone()))
    }

    async fn detail(&self, id: MovieId) -> Result<Option<MovieDetail>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .movies
            .iter()
            .find(|detail| detail.movie.id == id)
            .cloned())
    }

    async fn find_by_tmdb_id(&self, tmdb_id: TmdbId) -> Result<Option<Movie>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .movies
            .iter()
            .find(|detail| detail.movie.tmdb_id == tmdb_id)
            .map(|detail| detail.movie.clone()))
    }

    async fn create_graph(&self, graph: &NewMovieGraph) -> Result<MovieDetail> {
        let mut state = self.state.lock().unwrap();
        if state
            .movies
            .iter()
            .any(|detail| detail.movie.tmdb_id == graph.movie.tmdb_id)
        {
            return Err(CatalogError::conflict(format!(
                "movie with TMDB id {} is already in the catalog",
                graph.movie.tmdb_id
            )));
        }

        let now = Utc::now();
        let new = &graph.movie;
        let movie = Movie {
            id: MovieId::new(),
            tmdb_id: new.tmdb_id,
            title: new.title.clone(),
            original_title: new.original_title.clone(),
            tagline: new.tagline.clone(),
            overview: new.overview.clone(),
            release_date: new.release_date,
            runtime_minutes: new.runtime_minutes,
            vote_average: new.vote_average,
            vote_count: new.vote_count,
            popularity: new.popularity,
            original_language: new.original_language.clone(),
            status: new.status.clone(),
            poster_url: new.poster_url.clone(),
            poster_public_id: new.poster_public_id.clone(),
            backdrop_url: new.backdrop_url.clone(),
            backdrop_public_id: new.backdrop_public_id.clone(),
            trailer_url: new.trailer_url.clone(),
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };

        let genres = Self::upsert_genres(&mut state, &graph.genres);
        let (cast, crew) = Self::build_credits(&graph.people, &graph.credits);
        let detail = MovieDetail {
            movie,
            genres,
            cast,
            crew,
        };
        state.movies.push(detail.clone());
        Ok(detail)
    }

    async fn update(
        &self,
        id: MovieId,
        update: &MovieUpdate,
    ) -> Result<Option<Movie>> {
        let mut state = self.state.lock().unwrap();
        let Some(detail) =
            state.movies.iter_mut().find(|detail| detail.movie.id == id)
        else {
            return Ok(None);
        };
        let movie = &mut detail.movie;
        if let Some(title) = &update.title {
            movie.title = title.clone();
        }
        if let Some(overview) = &update.overview {
            movie.overview = Some(overview.clone());
        }
        if let Some(tagline) = &update.tagline {
            movie.tagline = Some(tagline.clone());
        }
        if let Some(trailer_url) = &update.trailer_url {
            movie.trailer_url = Some(trailer_url.clone());
        }
        if let Some(poster_url) = &update.poster_url {
            movie.poster_url = Some(poster_url.clone());
        }
        if let Some(backdrop_url) = &update.backdrop_url {
            movie.backdrop_url = Some(backdrop_url.clone());
        }
        movie.updated_at = Utc::now();
        Ok(Some(movie.clone()))
    }

    async fn delete(&self, id: MovieId) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.movies.len();
        state.movies.retain(|detail| detail.movie.id != id);
        Ok(state.movies.len() < before)
    }

    async fn credits(&self, id: MovieId) -> Result<Vec<Credit>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .movies
            .iter()
            .find(|detail| detail.movie.id == id)
            .map(|detail| {
                detail
                    .cast
                    .iter()
                    .chain(detail.crew.iter())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl SeriesRepository for MemoryCatalog {
    async fn page(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Page<SeriesSummary>> {
        let state = self.state.lock().unwrap();
        let mut matched: Vec<&StoredSeries> = state
            .series
            .iter()
            .filter(|stored| {
                let series = &stored.detail.series;
                if let Some(search) = &filter.search
                    && !series
                        .name
                        .to_lowercase()
                        .contains(&search.to_lowercase())
                {
                    return false;
                }
                if let Some(year) = filter.year
                    && series.first_air_date.map(|d| d.year()) != Some(year)
                {
                    return false;
                }
                if let Some(genre) = filter.genre
                    && !stored
                        .detail
                        .genres
                        .iter()
                        .any(|g| g.tmdb_id == genre)
                {
                    return false;
                }
                true
            })
            .collect();

        matched.sort_by(|a, b| {
            let a = &a.detail.series;
            let b = &b.detail.series;
            let ordering = match filter.sort {
                CatalogSort::Latest => a.created_at.cmp(&b.created_at),
                CatalogSort::Title => a.name.cmp(&b.name),
                CatalogSort::Rating => a
                    .vote_average
                    .partial_cmp(&b.vote_average)
                    .unwrap_or(std::cmp::Ordering::Equal),
                CatalogSort::Popularity => a
                    .popularity
                    .partial_cmp(&b.popularity)
                    .unwrap_or(std::cmp::Ordering::Equal),
                CatalogSort::ReleaseDate => {
                    a.first_air_date.cmp(&b.first_air_date)
                }
            };
            match filter.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let summaries: Vec<SeriesSummary> = matched
            .iter()
            .map(|stored| stored.detail.series.summary())
            .collect();
        Ok(page_slice(summaries, filter))
    }

    async fn find(&self, id: SeriesId) -> Result<Option<Series>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .series
            .iter()
            .find(|stored| stored.detail.series.id == id)
            .map(|stored| stored.detail.series.clone()))
    }

    async fn detail(&self, id: SeriesId) -> Result<Option<SeriesDetail>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .series
            .iter()
            .find(|stored| stored.detail.series.id == id)
            .map(|stored| stored.detail.clone()))
    }

    async fn find_by_tmdb_id(
        &self,
        tmdb_id: TmdbId,
    ) -> Result<Option<Series>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .series
            .iter()
            .find(|stored| stored.detail.series.tmdb_id == tmdb_id)
            .map(|stored| stored.detail.series.clone()))
    }

    async fn create_graph(
        &self,
        graph: &NewSeriesGraph,
    ) -> Result<SeriesDetail> {
        let mut state = self.state.lock().unwrap();
        if state
            .series
            .iter()
            .any(|stored| stored.detail.series.tmdb_id == graph.series.tmdb_id)
        {
            return Err(CatalogError::conflict(format!(
                "series with TMDB id {} is already in the catalog",
                graph.series.tmdb_id
            )));
        }

        let now = Utc::now();
        let new = &graph.series;
        let series_id = SeriesId::new();
        let series = Series {
            id: series_id,
            tmdb_id: new.tmdb_id,
            name: new.name.clone(),
            original_name: new.original_name.clone(),
            tagline: new.tagline.clone(),
            overview: new.overview.clone(),
            first_air_date: new.first_air_date,
            last_air_date: new.last_air_date,
            number_of_seasons: new.number_of_seasons,
            number_of_episodes: new.number_of_episodes,
            status: new.status.clone(),
            vote_average: new.vote_average,
            vote_count: new.vote_count,
            popularity: new.popularity,
            original_language: new.original_language.clone(),
            poster_url: new.poster_url.clone(),
            poster_public_id: new.poster_public_id.clone(),
            backdrop_url: new.backdrop_url.clone(),
            backdrop_public_id: new.backdrop_public_id.clone(),
            trailer_url: new.trailer_url.clone(),
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };

        let mut seasons = Vec::new();
        let mut season_details = Vec::new();
        for new_season in &graph.seasons {
            let season = Season {
                id: SeasonId::new(),
                series_id,
                tmdb_id: new_season.tmdb_id,
                season_number: new_season.season_number,
                name: new_season.name.clone(),
                overview: new_season.overview.clone(),
                air_date: new_season.air_date,
                poster_url: new_season.poster_url.clone(),
                poster_public_id: new_season.poster_public_id.clone(),
                episode_count: new_season.episode_count,
            };
            let episodes: Vec<Episode> = new_season
                .episodes
                .iter()
                .map(|new_episode| Episode {
                    id: EpisodeId::new(),
                    season_id: season.id,
                    tmdb_id: new_episode.tmdb_id,
                    episode_number: new_episode.episode_number,
                    name: new_episode.name.clone(),
                    overview: new_episode.overview.clone(),
                    air_date: new_episode.air_date,
                    runtime_minutes: new_episode.runtime_minutes,
                    still_url: new_episode.still_url.clone(),
                    vote_average: new_episode.vote_average,
                })
                .collect();
            seasons.push(season.clone());
            season_details.push(SeasonDetail { season, episodes });
        }

        let genres = Self::upsert_genres(&mut state, &graph.genres);
        let (cast, crew) = Self::build_credits(&graph.people, &graph.credits);
        let detail = SeriesDetail {
            series,
            genres,
            seasons,
            cast,
            crew,
        };
        state.series.push(StoredSeries {
            detail: detail.clone(),
            seasons: season_details,
        });
        Ok(detail)
    }

    async fn update(
        &self,
        id: SeriesId,
        update: &SeriesUpdate,
    ) -> Result<Option<Series>> {
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state
            .series
            .iter_mut()
            .find(|stored| stored.detail.series.id == id)
        else {
            return Ok(None);
        };
        let series = &mut stored.detail.series;
        if let Some(name) = &update.name {
            series.name = name.clone();
        }
        if let Some(overview) = &update.overview {
            series.overview = Some(overview.clone());
        }
        if let Some(tagline) = &update.tagline {
            series.tagline = Some(tagline.clone());
        }
        if let Some(trailer_url) = &update.trailer_url {
            series.trailer_url = Some(trailer_url.clone());
        }
        if let Some(poster_url) = &update.poster_url {
            series.poster_url = Some(poster_url.clone());
        }
        if let Some(backdrop_url) = &update.backdrop_url {
            series.backdrop_url = Some(backdrop_url.clone());
        }
        series.updated_at = Utc::now();
        Ok(Some(series.clone()))
    }

    async fn delete(&self, id: SeriesId) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.series.len();
        state
            .series
            .retain(|stored| stored.detail.series.id != id);
        Ok(state.series.len() < before)
    }

    async fn credits(&self, id: SeriesId) -> Result<Vec<Credit>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .series
            .iter()
            .find(|stored| stored.detail.series.id == id)
            .map(|stored| {
                stored
                    .detail
                    .cast
                    .iter()
                    .chain(stored.detail.crew.iter())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn season(
        &self,
        series_id: SeriesId,
        season_number: i32,
    ) -> Result<Option<SeasonDetail>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .series
            .iter()
            .find(|stored| stored.detail.series.id == series_id)
            .and_then(|stored| {
                stored
                    .seasons
                    .iter()
                    .find(|season| season.season.season_number == season_number)
                    .cloned()
            }))
    }
}

#[async_trait]
impl GenreRepository for MemoryCatalog {
    async fn list(&self) -> Result<Vec<Genre>> {
        let mut genres = self.state.lock().unwrap().genres.clone();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn find(&self, id: GenreId) -> Result<Option<Genre>> {
        let state = self.state.lock().unwrap();
        Ok(state.genres.iter().find(|genre| genre.id == id).cloned())
    }

    async fn upsert_many(&self, seeds: &[GenreSeed]) -> Result<GenreSyncReport> {
        let mut state = self.state.lock().unwrap();
        let mut report = GenreSyncReport::default();
        for seed in seeds {
            if state
                .genres
                .iter()
                .any(|genre| genre.tmdb_id == seed.tmdb_id)
            {
                report.refreshed += 1;
            } else {
                report.inserted += 1;
            }
        }
        Self::upsert_genres(&mut state, seeds);
        Ok(report)
    }
}

#[async_trait]
impl ContentRepository for MemoryCatalog {
    async fn latest_movies(&self, limit: i64) -> Result<Vec<MovieSummary>> {
        let state = self.state.lock().unwrap();
        let mut movies: Vec<&MovieDetail> = state.movies.iter().collect();
        movies.sort_by(|a, b| b.movie.created_at.cmp(&a.movie.created_at));
        Ok(movies
            .iter()
            .take(limit as usize)
            .map(|detail| detail.movie.summary())
            .collect())
    }

    async fn latest_series(&self, limit: i64) -> Result<Vec<SeriesSummary>> {
        let state = self.state.lock().unwrap();
        let mut series: Vec<&StoredSeries> = state.series.iter().collect();
        series.sort_by(|a, b| {
            b.detail.series.created_at.cmp(&a.detail.series.created_at)
        });
        Ok(series
            .iter()
            .take(limit as usize)
            .map(|stored| stored.detail.series.summary())
            .collect())
    }

    async fn top_rated_movies(
        &self,
        limit: i64,
        min_votes: i64,
    ) -> Result<Vec<MovieSummary>> {
        let state = self.state.lock().unwrap();
        let mut movies: Vec<&MovieDetail> = state
            .movies
            .iter()
            .filter(|detail| detail.movie.vote_count >= min_votes)
            .collect();
        movies.sort_by(|a, b| {
            b.movie
                .vote_average
                .partial_cmp(&a.movie.vote_average)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(movies
            .iter()
            .take(limit as usize)
            .map(|detail| detail.movie.summary())
            .collect())
    }

    async fn top_rated_series(
        &self,
        limit: i64,
        min_votes: i64,
    ) -> Result<Vec<SeriesSummary>> {
        let state = self.state.lock().unwrap();
        let mut series: Vec<&StoredSeries> = state
            .series
            .iter()
            .filter(|stored| stored.detail.series.vote_count >= min_votes)
            .collect();
        series.sort_by(|a, b| {
            b.detail
                .series
                .vote_average
                .partial_cmp(&a.detail.series.vote_average)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(series
            .iter()
            .take(limit as usize)
            .map(|stored| stored.detail.series.summary())
            .collect())
    }

    async fn genre_movies(
        &self,
        genre_id: GenreId,
        limit: i64,
    ) -> Result<Vec<MovieSummary>> {
        let state = self.state.lock().unwrap();
        let mut movies: Vec<&MovieDetail> = state
            .movies
            .iter()
            .filter(|detail| {
                detail.genres.iter().any(|genre| genre.id == genre_id)
            })
            .collect();
        movies.sort_by(|a, b| {
            b.movie
                .popularity
                .partial_cmp(&a.movie.popularity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(movies
            .iter()
            .take(limit as usize)
            .map(|detail| detail.movie.summary())
            .collect())
    }

    async fn search(&self, query: &str, limit: i64) -> Result<SearchResults> {
        let state = self.state.lock().unwrap();
        let needle = query.to_lowercase();
        let movies = state
            .movies
            .iter()
            .filter(|detail| {
                detail.movie.title.to_lowercase().contains(&needle)
            })
            .take(limit as usize)
            .map(|detail| detail.movie.summary())
            .collect();
        let series = state
            .series
            .iter()
            .filter(|stored| {
                stored.detail.series.name.to_lowercase().contains(&needle)
            })
            .take(limit as usize)
            .map(|stored| stored.detail.series.summary())
            .collect();
        Ok(SearchResults { movies, series })
    }

    async fn featured(&self, limit: i64) -> Result<Vec<CatalogEntry>> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<CatalogEntry> = state
            .movies
            .iter()
            .map(|detail| CatalogEntry::Movie(detail.movie.summary()))
            .chain(state.series.iter().map(|stored| {
                CatalogEntry::Series(stored.detail.series.summary())
            }))
            .collect();
        entries.sort_by(|a, b| {
            b.popularity()
                .partial_cmp(&a.popularity())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn counts(&self) -> Result<CatalogCounts> {
        let state = self.state.lock().unwrap();
        let episodes = state
            .series
            .iter()
            .flat_map(|stored| &stored.seasons)
            .map(|season| season.episodes.len() as u64)
            .sum();
        let people: std::collections::HashSet<PersonId> = state
            .movies
            .iter()
            .flat_map(|detail| detail.cast.iter().chain(detail.crew.iter()))
            .chain(state.series.iter().flat_map(|stored| {
                stored.detail.cast.iter().chain(stored.detail.crew.iter())
            }))
            .map(|credit| credit.person.id)
            .collect();
        Ok(CatalogCounts {
            movies: state.movies.len() as u64,
            series: state.series.len() as u64,
            episodes,
            genres: state.genres.len() as u64,
            people: people.len() as u64,
            users: state.users.len() as u64,
        })
    }
}

#[async_trait]
impl UserRepository for MemoryCatalog {
    async fn create_with_password(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User> {
        let mut state = self.state.lock().unwrap();
        if state
            .users
            .iter()
            .any(|account| account.user.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(CatalogError::conflict("email is already registered"));
        }
        let created = User {
            id: UserId::new(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            created_at: Utc::now(),
            last_login_at: None,
        };
        state.users.push(UserAccount {
            user: created.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|account| account.user.email.eq_ignore_ascii_case(email))
            .map(|account| account.user.clone()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|account| account.user.id == id)
            .map(|account| account.user.clone()))
    }

    async fn password_hash(&self, id: UserId) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|account| account.user.id == id)
            .map(|account| account.password_hash.clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().users.len() as u64)
    }

    async fn touch_last_login(&self, id: UserId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(account) =
            state.users.iter_mut().find(|account| account.user.id == id)
        {
            account.user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryCatalog {
    async fn insert(&self, session: &NewSession) -> Result<SessionRecord> {
        let mut state = self.state.lock().unwrap();
        let record = SessionRecord {
            id: SessionId::new(),
            user_id: session.user_id,
            token_hash: session.token_hash.clone(),
            expires_at: session.expires_at,
            revoked: false,
            created_at: Utc::now(),
        };
        state.sessions.push(record.clone());
        Ok(record)
    }

    async fn find_active(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>> {
        let state = self.state.lock().unwrap();
        let now = Utc::now();
        Ok(state
            .sessions
            .iter()
            .find(|session| {
                session.token_hash == token_hash
                    && !session.revoked
                    && session.expires_at > now
            })
            .cloned())
    }

    async fn revoke(&self, id: SessionId) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if let Some(session) = state
            .sessions
            .iter_mut()
            .find(|session| session.id == id && !session.revoked)
        {
            session.revoked = true;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let mut revoked = 0;
        for session in state
            .sessions
            .iter_mut()
            .filter(|session| session.user_id == user_id && !session.revoked)
        {
            session.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}

/// Movie port that behaves like the in-memory catalog until the final graph
/// insert, which always fails. Exercises ingest cleanup after the imagery
/// is already mirrored.
pub struct BrokenGraphMovies {
    inner: Arc<MemoryCatalog>,
}

#[async_trait]
impl MovieRepository for BrokenGraphMovies {
    async fn page(&self, filter: &CatalogFilter) -> Result<Page<MovieSummary>> {
        MovieRepository::page(self.inner.as_ref(), filter).await
    }

    async fn find(&self, id: MovieId) -> Result<Option<Movie>> {
        MovieRepository::find(self.inner.as_ref(), id).await
    }

    async fn detail(&self, id: MovieId) -> Result<Option<MovieDetail>> {
        MovieRepository::detail(self.inner.as_ref(), id).await
    }

    async fn find_by_tmdb_id(&self, tmdb_id: TmdbId) -> Result<Option<Movie>> {
        MovieRepository::find_by_tmdb_id(self.inner.as_ref(), tmdb_id).await
    }

    async fn create_graph(
        &self,
        _graph: &NewMovieGraph,
    ) -> Result<MovieDetail> {
        Err(CatalogError::Database("graph insert refused".to_string()))
    }

    async fn update(
        &self,
        id: MovieId,
        update: &MovieUpdate,
    ) -> Result<Option<Movie>> {
        MovieRepository::update(self.inner.as_ref(), id, update).await
    }

    async fn delete(&self, id: MovieId) -> Result<bool> {
        MovieRepository::delete(self.inner.as_ref(), id).await
    }

    async fn credits(&self, id: MovieId) -> Result<Vec<Credit>> {
        MovieRepository::credits(self.inner.as_ref(), id).await
    }
}

// ===== Scripted metadata provider =====

#[derive(Default)]
pub struct ScriptedProvider {
    pub movies: Mutex<HashMap<i64, MovieDetails>>,
    pub series: Mutex<HashMap<i64, SeriesDetails>>,
    pub series_credit_lists: Mutex<HashMap<i64, Credits>>,
    pub seasons: Mutex<HashMap<(i64, i32), SeasonDetails>>,
    pub movie_genre_list: Mutex<Vec<GenreEntry>>,
    pub series_genre_list: Mutex<Vec<GenreEntry>>,
}

impl ScriptedProvider {
    pub fn script_movie(&self, details: MovieDetails) {
        self.movies.lock().unwrap().insert(details.id, details);
    }

    pub fn script_series(
        &self,
        details: SeriesDetails,
        credits: Credits,
        seasons: Vec<SeasonDetails>,
    ) {
        let id = details.id;
        for season in seasons {
            self.seasons
                .lock()
                .unwrap()
                .insert((id, season.season_number), season);
        }
        self.series_credit_lists.lock().unwrap().insert(id, credits);
        self.series.lock().unwrap().insert(id, details);
    }
}

#[async_trait]
impl MetadataProvider for ScriptedProvider {
    async fn movie_details(
        &self,
        id: TmdbId,
    ) -> std::result::Result<MovieDetails, ProviderError> {
        self.movies
            .lock()
            .unwrap()
            .get(&id.value())
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn series_details(
        &self,
        id: TmdbId,
    ) -> std::result::Result<SeriesDetails, ProviderError> {
        self.series
            .lock()
            .unwrap()
            .get(&id.value())
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn series_credits(
        &self,
        id: TmdbId,
    ) -> std::result::Result<Credits, ProviderError> {
        Ok(self
            .series_credit_lists
            .lock()
            .unwrap()
            .get(&id.value())
            .cloned()
            .unwrap_or_default())
    }

    async fn season_details(
        &self,
        series_id: TmdbId,
        season_number: i32,
    ) -> std::result::Result<SeasonDetails, ProviderError> {
        self.seasons
            .lock()
            .unwrap()
            .get(&(series_id.value(), season_number))
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn movie_genres(
        &self,
    ) -> std::result::Result<Vec<GenreEntry>, ProviderError> {
        Ok(self.movie_genre_list.lock().unwrap().clone())
    }

    async fn series_genres(
        &self,
    ) -> std::result::Result<Vec<GenreEntry>, ProviderError> {
        Ok(self.series_genre_list.lock().unwrap().clone())
    }

    async fn search_movies(
        &self,
        query: &str,
        _year: Option<i32>,
        page: u32,
    ) -> std::result::Result<SearchPage<MovieSearchResult>, ProviderError> {
        let needle = query.to_lowercase();
        let results: Vec<MovieSearchResult> = self
            .movies
            .lock()
            .unwrap()
            .values()
            .filter(|details| details.title.to_lowercase().contains(&needle))
            .map(|details| MovieSearchResult {
                id: details.id,
                title: details.title.clone(),
                release_date: details.release_date,
                overview: details.overview.clone(),
                poster_path: details.poster_path.clone(),
                vote_average: details.vote_average,
                popularity: details.popularity,
            })
            .collect();
        Ok(SearchPage {
            page,
            total_results: results.len() as u64,
            total_pages: 1,
            results,
        })
    }

    async fn search_series(
        &self,
        query: &str,
        page: u32,
    ) -> std::result::Result<SearchPage<SeriesSearchResult>, ProviderError>
    {
        let needle = query.to_lowercase();
        let results: Vec<SeriesSearchResult> = self
            .series
            .lock()
            .unwrap()
            .values()
            .filter(|details| details.name.to_lowercase().contains(&needle))
            .map(|details| SeriesSearchResult {
                id: details.id,
                name: details.name.clone(),
                first_air_date: details.first_air_date,
                overview: details.overview.clone(),
                poster_path: details.poster_path.clone(),
                vote_average: details.vote_average,
                popularity: details.popularity,
            })
            .collect();
        Ok(SearchPage {
            page,
            total_results: results.len() as u64,
            total_pages: 1,
            results,
        })
    }

    fn poster_url(&self, path: &str, _size: PosterSize) -> String {
        format!("https://image.tmdb.test{path}")
    }

    fn backdrop_url(&self, path: &str, _size: BackdropSize) -> String {
        format!("https://image.tmdb.test{path}")
    }

    fn profile_url(&self, path: &str, _size: ProfileSize) -> String {
        format!("https://image.tmdb.test{path}")
    }

    fn still_url(&self, path: &str, _size: StillSize) -> String {
        format!("https://image.tmdb.test{path}")
    }
}

// ===== In-memory image store =====

#[derive(Default)]
pub struct MemoryImageStore {
    pub stored: Mutex<Vec<String>>,
    pub destroyed: Mutex<Vec<String>>,
    failing_fragments: Mutex<Vec<String>>,
}

impl MemoryImageStore {
    /// Make every upload whose public id contains `fragment` fail.
    pub fn fail_uploads_matching(&self, fragment: &str) {
        self.failing_fragments
            .lock()
            .unwrap()
            .push(fragment.to_string());
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store_from_url(
        &self,
        _source_url: &str,
        public_id: &str,
    ) -> std::result::Result<StoredImage, ImageStoreError> {
        if self
            .failing_fragments
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| public_id.contains(fragment))
        {
            return Err(ImageStoreError::Api {
                status: 500,
                message: format!("upload of {public_id} refused"),
            });
        }
        self.stored.lock().unwrap().push(public_id.to_string());
        Ok(StoredImage {
            public_id: public_id.to_string(),
            secure_url: format!("https://cdn.parsflix.test/{public_id}"),
            width: Some(500),
            height: Some(750),
            bytes: Some(1024),
        })
    }

    async fn destroy(
        &self,
        public_id: &str,
    ) -> std::result::Result<bool, ImageStoreError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(true)
    }
}

// ===== Test harness =====

pub struct TestApp {
    pub server: TestServer,
    pub catalog: Arc<MemoryCatalog>,
    pub provider: Arc<ScriptedProvider>,
    pub images: Arc<MemoryImageStore>,
}

pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
}

pub fn spawn() -> TestApp {
    spawn_with(|catalog| catalog)
}

/// Like [`spawn`], but with the graph insert failing on the movie port.
pub fn spawn_with_failing_movie_graph() -> TestApp {
    spawn_with(|catalog| Arc::new(BrokenGraphMovies { inner: catalog }))
}

fn spawn_with<F, R>(movie_port: F) -> TestApp
where
    F: FnOnce(Arc<MemoryCatalog>) -> Arc<R>,
    R: MovieRepository + 'static,
{
    let catalog = Arc::new(MemoryCatalog::default());
    let provider = Arc::new(ScriptedProvider::default());
    let images = Arc::new(MemoryImageStore::default());

    let store = CatalogStore {
        movies: movie_port(catalog.clone()),
        series: catalog.clone(),
        genres: catalog.clone(),
        content: catalog.clone(),
        users: catalog.clone(),
        sessions: catalog.clone(),
    };

    let params = ParamsBuilder::new()
        .m_cost(8)
        .t_cost(1)
        .p_cost(1)
        .output_len(32)
        .build()
        .expect("valid Argon2 parameters");
    let auth_crypto = Arc::new(
        AuthCrypto::with_params("pepper", "token-key", params)
            .expect("auth crypto"),
    );
    let tokens = TokenSigner::new("test-secret", 900);

    let state = AppState::new(
        Arc::new(test_config()),
        store,
        provider.clone(),
        images.clone(),
        auth_crypto,
        tokens,
    );
    let server =
        TestServer::new(routes::build(state)).expect("test server boots");

    TestApp {
        server,
        catalog,
        provider,
        images,
    }
}

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        tmdb: TmdbConfig {
            api_key: Some("test-key".to_string()),
            base_url: None,
            image_base_url: None,
        },
        cloudinary: CloudinarySettings {
            url: None,
            upload_folder: None,
        },
        auth: AuthConfig {
            jwt_secret: Some("test-secret".to_string()),
            password_pepper: "pepper".to_string(),
            token_hmac_key: "token-key".to_string(),
            access_token_ttl_secs: 900,
            refresh_token_ttl_days: 30,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        ingest: IngestConfig {
            cast_limit: 15,
            include_specials: false,
        },
        metadata: ConfigMetadata::default(),
    }
}

impl TestApp {
    /// Register an account and return its token pair. The first account on
    /// the instance comes back as an admin.
    pub async fn register(&self, email: &str) -> AuthSession {
        let response = self
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "email": email,
                "password": "passw0rd",
                "display_name": "Test User",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        AuthSession {
            access_token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
            user_id: body["user"]["id"]
                .as_str()
                .unwrap()
                .parse()
                .expect("user id is a UUID"),
        }
    }
}

// ===== Provider fixtures =====

pub fn movie_details(id: i64, title: &str) -> MovieDetails {
    MovieDetails {
        id,
        title: title.to_string(),
        original_title: Some(title.to_string()),
        tagline: Some("A test of character".to_string()),
        overview: Some("Plot goes here.".to_string()),
        release_date: chrono::NaiveDate::from_ymd_opt(1999, 3, 31),
        runtime: Some(136),
        vote_average: 8.2,
        vote_count: 25_000,
        popularity: 98.5,
        original_language: Some("en".to_string()),
        status: Some("Released".to_string()),
        poster_path: Some("/poster.jpg".to_string()),
        backdrop_path: Some("/backdrop.jpg".to_string()),
        genres: vec![GenreEntry {
            id: 878,
            name: "Science Fiction".to_string(),
        }],
        credits: Some(Credits {
            cast: vec![CastMember {
                id: 6384,
                name: "Lead Actor".to_string(),
                character: Some("Protagonist".to_string()),
                profile_path: Some("/lead.jpg".to_string()),
                order: 0,
            }],
            crew: Vec::new(),
        }),
    }
}

pub fn series_details(id: i64, name: &str) -> SeriesDetails {
    SeriesDetails {
        id,
        name: name.to_string(),
        original_name: Some(name.to_string()),
        tagline: None,
        overview: Some("Episodic plot goes here.".to_string()),
        first_air_date: chrono::NaiveDate::from_ymd_opt(2008, 1, 20),
        last_air_date: chrono::NaiveDate::from_ymd_opt(2013, 9, 29),
        number_of_seasons: 1,
        number_of_episodes: 2,
        status: Some("Ended".to_string()),
        vote_average: 8.9,
        vote_count: 12_000,
        popularity: 245.1,
        original_language: Some("en".to_string()),
        poster_path: Some("/series-poster.jpg".to_string()),
        backdrop_path: None,
        genres: vec![GenreEntry {
            id: 18,
            name: "Drama".to_string(),
        }],
        seasons: vec![parsflix_core::metadata::types::SeasonSummary {
            id: Some(3572),
            season_number: 1,
            name: Some("Season 1".to_string()),
            overview: None,
            air_date: chrono::NaiveDate::from_ymd_opt(2008, 1, 20),
            episode_count: 2,
            poster_path: Some("/season1.jpg".to_string()),
        }],
    }
}

pub fn season_details(season_number: i32) -> SeasonDetails {
    use parsflix_core::metadata::types::EpisodeEntry;
    SeasonDetails {
        id: Some(3572),
        season_number,
        name: Some(format!("Season {season_number}")),
        overview: None,
        air_date: chrono::NaiveDate::from_ymd_opt(2008, 1, 20),
        poster_path: Some("/season1.jpg".to_string()),
        episodes: vec![
            EpisodeEntry {
                id: Some(62085),
                episode_number: 1,
                name: Some("Pilot".to_string()),
                overview: None,
                air_date: chrono::NaiveDate::from_ymd_opt(2008, 1, 20),
                runtime: Some(58),
                still_path: Some("/ep1.jpg".to_string()),
                vote_average: 8.1,
            },
            EpisodeEntry {
                id: Some(62086),
                episode_number: 2,
                name: None,
                overview: None,
                air_date: chrono::NaiveDate::from_ymd_opt(2008, 1, 27),
                runtime: Some(48),
                still_path: None,
                vote_average: 8.0,
            },
        ],
    }
}
