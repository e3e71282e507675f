use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parsflix_model::{
    CreditKind, Movie, MovieDetail, MovieId, Series, SeriesDetail, SeriesId,
    TmdbId, User,
};
use tracing::{info, warn};

use crate::database::ports::{
    CreditSeed, GenreSeed, GenreSyncReport, MovieUpdate, NewEpisode,
    NewMovie, NewMovieGraph, NewSeason, NewSeries, NewSeriesGraph,
    PersonSeed, SeriesUpdate,
};
use crate::database::CatalogStore;
use crate::error::{CatalogError, Result};
use crate::images::ImageStore;
use crate::metadata::types::{Credits, GenreEntry};
use crate::metadata::{
    BackdropSize, MetadataProvider, PosterSize, ProfileSize, StillSize,
};

use super::browse_cache::BrowseCache;

/// Crew roles worth keeping on a catalog record.
const KEY_CREW_JOBS: [&str; 4] = ["Director", "Writer", "Screenplay", "Creator"];

/// The TMDB "Specials" pseudo-season.
const SPECIALS_SEASON: i32 = 0;

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Cast members persisted per title, in billing order.
    pub cast_limit: usize,
    /// Whether season 0 is ingested alongside regular seasons.
    pub include_specials: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            cast_limit: 15,
            include_specials: false,
        }
    }
}

/// Admin-side content ingestion: pull a title from the metadata provider,
/// mirror its imagery, and persist the whole graph atomically.
#[derive(Clone)]
pub struct IngestService {
    store: CatalogStore,
    provider: Arc<dyn MetadataProvider>,
    images: Arc<dyn ImageStore>,
    browse_cache: Arc<BrowseCache>,
    options: IngestOptions,
}

/// A mirrored image plus the deterministic public id it was stored under.
struct Mirrored {
    url: String,
    public_id: String,
}

impl IngestService {
    pub fn new(
        store: CatalogStore,
        provider: Arc<dyn MetadataProvider>,
        images: Arc<dyn ImageStore>,
        browse_cache: Arc<BrowseCache>,
        options: IngestOptions,
    ) -> Self {
        Self {
            store,
            provider,
            images,
            browse_cache,
            options,
        }
    }

    pub async fn create_movie(
        &self,
        tmdb_id: TmdbId,
        actor: &User,
    ) -> Result<MovieDetail> {
        if self.store.movies.find_by_tmdb_id(tmdb_id).await?.is_some() {
            return Err(CatalogError::conflict(format!(
                "movie with TMDB id {tmdb_id} is already in the catalog"
            )));
        }

        let details = self.provider.movie_details(tmdb_id).await?;
        let credits = details.credits.clone().unwrap_or_default();

        let mut uploaded: Vec<String> = Vec::new();
        let poster = self
            .mirror(
                details.poster_path.as_deref().map(|path| {
                    self.provider.poster_url(path, PosterSize::W500)
                }),
                format!("movie-{tmdb_id}-poster"),
                &mut uploaded,
            )
            .await?;
        let backdrop = self
            .mirror(
                details.backdrop_path.as_deref().map(|path| {
                    self.provider.backdrop_url(path, BackdropSize::W1280)
                }),
                format!("movie-{tmdb_id}-backdrop"),
                &mut uploaded,
            )
            .await?;

        let (people, credit_seeds) = self.build_credits(&credits).await;

        let graph = NewMovieGraph {
            movie: NewMovie {
                tmdb_id,
                title: details.title.clone(),
                original_title: details.original_title,
                tagline: details.tagline,
                overview: details.overview,
                release_date: details.release_date,
                runtime_minutes: details.runtime,
                vote_average: details.vote_average,
                vote_count: details.vote_count,
                popularity: details.popularity,
                original_language: details.original_language,
                status: details.status,
                poster_url: poster.as_ref().map(|img| img.url.clone()),
                poster_public_id: poster.map(|img| img.public_id),
                backdrop_url: backdrop.as_ref().map(|img| img.url.clone()),
                backdrop_public_id: backdrop.map(|img| img.public_id),
                trailer_url: None,
                created_by: actor.id,
            },
            genres: genre_seeds(&details.genres),
            people,
            credits: credit_seeds,
        };

        let detail = match self.store.movies.create_graph(&graph).await {
            Ok(detail) => detail,
            Err(err) => {
                self.discard_uploads(&uploaded).await;
                return Err(err);
            }
        };

        self.browse_cache.invalidate().await;
        info!(
            tmdb_id = tmdb_id.value(),
            title = %detail.movie.title,
            "movie ingested"
        );
        Ok(detail)
    }

    pub async fn create_series(
        &self,
        tmdb_id: TmdbId,
        actor: &User,
    ) -> Result<SeriesDetail> {
        if self.store.series.find_by_tmdb_id(tmdb_id).await?.is_some() {
            return Err(CatalogError::conflict(format!(
                "series with TMDB id {tmdb_id} is already in the catalog"
            )));
        }

        let details = self.provider.series_details(tmdb_id).await?;
        let credits = self.provider.series_credits(tmdb_id).await?;

        let mut uploaded: Vec<String> = Vec::new();
        let poster = self
            .mirror(
                details.poster_path.as_deref().map(|path| {
                    self.provider.poster_url(path, PosterSize::W500)
                }),
                format!("series-{tmdb_id}-poster"),
                &mut uploaded,
            )
            .await?;
        let backdrop = self
            .mirror(
                details.backdrop_path.as_deref().map(|path| {
                    self.provider.backdrop_url(path, BackdropSize::W1280)
                }),
                format!("series-{tmdb_id}-backdrop"),
                &mut uploaded,
            )
            .await?;

        let mut seasons = Vec::new();
        for summary in &details.seasons {
            let number = summary.season_number;
            if number == SPECIALS_SEASON && !self.options.include_specials {
                continue;
            }
            let season = match self.provider.season_details(tmdb_id, number).await {
                Ok(season) => season,
                Err(err) => {
                    self.discard_uploads(&uploaded).await;
                    return Err(err.into());
                }
            };

            let season_poster = self
                .mirror(
                    season.poster_path.as_deref().map(|path| {
                        self.provider.poster_url(path, PosterSize::W342)
                    }),
                    format!("series-{tmdb_id}-season-{number}"),
                    &mut uploaded,
                )
                .await?;

            let episodes: Vec<NewEpisode> = season
                .episodes
                .iter()
                .map(|episode| NewEpisode {
                    tmdb_id: episode.id.map(TmdbId),
                    episode_number: episode.episode_number,
                    name: episode
                        .name
                        .clone()
                        .unwrap_or_else(|| {
                            format!("Episode {}", episode.episode_number)
                        }),
                    overview: episode.overview.clone(),
                    air_date: episode.air_date,
                    runtime_minutes: episode.runtime,
                    // Stills stay on TMDB's CDN to bound upload volume.
                    still_url: episode.still_path.as_deref().map(|path| {
                        self.provider.still_url(path, StillSize::W300)
                    }),
                    vote_average: episode.vote_average,
                })
                .collect();

            seasons.push(NewSeason {
                tmdb_id: season.id.map(TmdbId),
                season_number: number,
                name: season
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Season {number}")),
                overview: season.overview.clone(),
                air_date: season.air_date,
                poster_url: season_poster.as_ref().map(|img| img.url.clone()),
                poster_public_id: season_poster.map(|img| img.public_id),
                episode_count: episodes.len() as i32,
                episodes,
            });
        }

        let (people, credit_seeds) = self.build_credits(&credits).await;

        let graph = NewSeriesGraph {
            series: NewSeries {
                tmdb_id,
                name: details.name.clone(),
                original_name: details.original_name,
                tagline: details.tagline,
                overview: details.overview,
                first_air_date: details.first_air_date,
                last_air_date: details.last_air_date,
                number_of_seasons: details.number_of_seasons,
                number_of_episodes: details.number_of_episodes,
                status: details.status,
                vote_average: details.vote_average,
                vote_count: details.vote_count,
                popularity: details.popularity,
                original_language: details.original_language,
                poster_url: poster.as_ref().map(|img| img.url.clone()),
                poster_public_id: poster.map(|img| img.public_id),
                backdrop_url: backdrop.as_ref().map(|img| img.url.clone()),
                backdrop_public_id: backdrop.map(|img| img.public_id),
                trailer_url: None,
                created_by: actor.id,
            },
            genres: genre_seeds(&details.genres),
            people,
            credits: credit_seeds,
            seasons,
        };

        let detail = match self.store.series.create_graph(&graph).await {
            Ok(detail) => detail,
            Err(err) => {
                self.discard_uploads(&uploaded).await;
                return Err(err);
            }
        };

        self.browse_cache.invalidate().await;
        info!(
            tmdb_id = tmdb_id.value(),
            name = %detail.series.name,
            seasons = detail.seasons.len(),
            "series ingested"
        );
        Ok(detail)
    }

    pub async fn update_movie(
        &self,
        id: MovieId,
        update: &MovieUpdate,
        actor: &User,
    ) -> Result<Movie> {
        if update.is_empty() {
            return Err(CatalogError::validation("no fields to update"));
        }
        let movie = self
            .store
            .movies
            .find(id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!("movie {id} not found"))
            })?;
        ensure_owner(movie.created_by == actor.id)?;

        let updated = self
            .store
            .movies
            .update(id, update)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!("movie {id} not found"))
            })?;
        self.browse_cache.invalidate().await;
        Ok(updated)
    }

    pub async fn update_series(
        &self,
        id: SeriesId,
        update: &SeriesUpdate,
        actor: &User,
    ) -> Result<Series> {
        if update.is_empty() {
            return Err(CatalogError::validation("no fields to update"));
        }
        let series = self
            .store
            .series
            .find(id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!("series {id} not found"))
            })?;
        ensure_owner(series.created_by == actor.id)?;

        let updated = self
            .store
            .series
            .update(id, update)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!("series {id} not found"))
            })?;
        self.browse_cache.invalidate().await;
        Ok(updated)
    }

    pub async fn delete_movie(&self, id: MovieId, actor: &User) -> Result<()> {
        let movie = self
            .store
            .movies
            .find(id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!("movie {id} not found"))
            })?;
        ensure_owner(movie.created_by == actor.id)?;

        self.store.movies.delete(id).await?;
        self.browse_cache.invalidate().await;

        let mut public_ids = Vec::new();
        public_ids.extend(movie.poster_public_id.clone());
        public_ids.extend(movie.backdrop_public_id.clone());
        self.discard_uploads(&public_ids).await;

        info!(movie_id = %id, title = %movie.title, "movie deleted");
        Ok(())
    }

    pub async fn delete_series(
        &self,
        id: SeriesId,
        actor: &User,
    ) -> Result<()> {
        let detail = self
            .store
            .series
            .detail(id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!("series {id} not found"))
            })?;
        ensure_owner(detail.series.created_by == actor.id)?;

        self.store.series.delete(id).await?;
        self.browse_cache.invalidate().await;

        let mut public_ids = Vec::new();
        public_ids.extend(detail.series.poster_public_id.clone());
        public_ids.extend(detail.series.backdrop_public_id.clone());
        for season in &detail.seasons {
            public_ids.extend(season.poster_public_id.clone());
        }
        self.discard_uploads(&public_ids).await;

        info!(series_id = %id, name = %detail.series.name, "series deleted");
        Ok(())
    }

    /// Pull both TMDB genre lists and upsert them by TMDB id.
    pub async fn sync_genres(&self) -> Result<GenreSyncReport> {
        let mut by_id: HashMap<i64, GenreSeed> = HashMap::new();
        for entry in self
            .provider
            .movie_genres()
            .await?
            .into_iter()
            .chain(self.provider.series_genres().await?)
        {
            by_id.insert(
                entry.id,
                GenreSeed {
                    tmdb_id: TmdbId(entry.id),
                    name: entry.name,
                },
            );
        }

        let mut seeds: Vec<GenreSeed> = by_id.into_values().collect();
        seeds.sort_by_key(|seed| seed.tmdb_id.value());
        let report = self.store.genres.upsert_many(&seeds).await?;
        info!(
            inserted = report.inserted,
            refreshed = report.refreshed,
            "genres synced"
        );
        Ok(report)
    }

    /// Mirror one image to the store, recording its public id for rollback.
    /// `None` source URLs pass through untouched. A failed upload discards
    /// every id recorded so far before the error surfaces, so earlier
    /// uploads in the same ingest never outlive it.
    async fn mirror(
        &self,
        source_url: Option<String>,
        public_id: String,
        uploaded: &mut Vec<String>,
    ) -> Result<Option<Mirrored>> {
        let Some(source_url) = source_url else {
            return Ok(None);
        };
        let stored = match self
            .images
            .store_from_url(&source_url, &public_id)
            .await
        {
            Ok(stored) => stored,
            Err(err) => {
                self.discard_uploads(uploaded).await;
                return Err(err.into());
            }
        };
        uploaded.push(stored.public_id.clone());
        Ok(Some(Mirrored {
            url: stored.secure_url,
            public_id: stored.public_id,
        }))
    }

    /// Build person and credit seeds from a credit list: the top
    /// `cast_limit` cast members plus key crew. Cast profiles are mirrored
    /// best-effort; a failed upload falls back to the TMDB URL.
    async fn build_credits(
        &self,
        credits: &Credits,
    ) -> (Vec<PersonSeed>, Vec<CreditSeed>) {
        let mut people: Vec<PersonSeed> = Vec::new();
        let mut seeds: Vec<CreditSeed> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();

        for member in credits.cast.iter().take(self.options.cast_limit) {
            if seen.insert(member.id) {
                let (profile_url, profile_public_id) = self
                    .mirror_profile(member.profile_path.as_deref(), member.id)
                    .await;
                people.push(PersonSeed {
                    tmdb_id: TmdbId(member.id),
                    name: member.name.clone(),
                    profile_url,
                    profile_public_id,
                });
            }
            seeds.push(CreditSeed {
                person_tmdb_id: TmdbId(member.id),
                kind: CreditKind::Cast,
                character: member.character.clone(),
                job: None,
                department: None,
                position: member.order,
            });
        }

        for (position, member) in credits
            .crew
            .iter()
            .filter(|member| {
                member
                    .job
                    .as_deref()
                    .is_some_and(|job| KEY_CREW_JOBS.contains(&job))
            })
            .enumerate()
        {
            if seen.insert(member.id) {
                people.push(PersonSeed {
                    tmdb_id: TmdbId(member.id),
                    name: member.name.clone(),
                    profile_url: member.profile_path.as_deref().map(|path| {
                        self.provider.profile_url(path, ProfileSize::W185)
                    }),
                    profile_public_id: None,
                });
            }
            seeds.push(CreditSeed {
                person_tmdb_id: TmdbId(member.id),
                kind: CreditKind::Crew,
                character: None,
                job: member.job.clone(),
                department: member.department.clone(),
                position: position as i32,
            });
        }

        (people, seeds)
    }

    async fn mirror_profile(
        &self,
        profile_path: Option<&str>,
        person_tmdb_id: i64,
    ) -> (Option<String>, Option<String>) {
        let Some(path) = profile_path else {
            return (None, None);
        };
        let source = self.provider.profile_url(path, ProfileSize::W185);
        // One public id per person, shared across every title they appear
        // in. These uploads are never rolled back with a failed ingest;
        // re-uploading the same id overwrites in place.
        let public_id = format!("person-{person_tmdb_id}");
        match self.images.store_from_url(&source, &public_id).await {
            Ok(stored) => (Some(stored.secure_url), Some(stored.public_id)),
            Err(err) => {
                warn!(
                    person_tmdb_id,
                    error = %err,
                    "profile image mirror failed, keeping source URL"
                );
                (Some(source), None)
            }
        }
    }

    /// Best-effort Cloudinary cleanup; failures are logged and swallowed.
    async fn discard_uploads(&self, public_ids: &[String]) {
        for public_id in public_ids {
            if let Err(err) = self.images.destroy(public_id).await {
                warn!(
                    public_id = %public_id,
                    error = %err,
                    "image cleanup failed"
                );
            }
        }
    }
}

fn ensure_owner(is_owner: bool) -> Result<()> {
    if is_owner {
        Ok(())
    } else {
        Err(CatalogError::forbidden(
            "only the admin who added this record may modify it",
        ))
    }
}

fn genre_seeds(entries: &[GenreEntry]) -> Vec<GenreSeed> {
    entries
        .iter()
        .map(|entry| GenreSeed {
            tmdb_id: TmdbId(entry.id),
            name: entry.name.clone(),
        })
        .collect()
}
