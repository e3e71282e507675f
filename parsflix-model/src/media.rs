use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::genre::Genre;
use crate::ids::{EpisodeId, MovieId, SeasonId, SeriesId, TmdbId, UserId};
use crate::people::Credit;

/// A curated movie record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_public_id: Option<String>,
    pub backdrop_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_public_id: Option<String>,
    pub trailer_url: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Card projection used by list and browse endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub tmdb_id: TmdbId,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub popularity: f64,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

/// A curated series record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_public_id: Option<String>,
    pub backdrop_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_public_id: Option<String>,
    pub trailer_url: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub id: SeriesId,
    pub tmdb_id: TmdbId,
    pub name: String,
    pub first_air_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub popularity: f64,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

/// One season of a series, including the poster mirrored at ingest time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub series_id: SeriesId,
    pub tmdb_id: Option<TmdbId>,
    pub season_number: i32,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_public_id: Option<String>,
    pub episode_count: i32,
}

/// One episode. Stills stay on TMDB's CDN rather than being re-hosted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub season_id: SeasonId,
    pub tmdb_id: Option<TmdbId>,
    pub episode_number: i32,
    pub name: String,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub runtime_minutes: Option<i32>,
    pub still_url: Option<String>,
    pub vote_average: f64,
}

/// Full movie document: the record plus its genre and credit joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub genres: Vec<Genre>,
    pub cast: Vec<Credit>,
    pub crew: Vec<Credit>,
}

/// Full series document with season summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDetail {
    #[serde(flatten)]
    pub series: Series,
    pub genres: Vec<Genre>,
    pub seasons: Vec<Season>,
    pub cast: Vec<Credit>,
    pub crew: Vec<Credit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDetail {
    #[serde(flatten)]
    pub season: Season,
    pub episodes: Vec<Episode>,
}

impl Movie {
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            tmdb_id: self.tmdb_id,
            title: self.title.clone(),
            release_date: self.release_date,
            vote_average: self.vote_average,
            popularity: self.popularity,
            poster_url: self.poster_url.clone(),
            backdrop_url: self.backdrop_url.clone(),
        }
    }
}

impl Series {
    pub fn summary(&self) -> SeriesSummary {
        SeriesSummary {
            id: self.id,
            tmdb_id: self.tmdb_id,
            name: self.name.clone(),
            first_air_date: self.first_air_date,
            vote_average: self.vote_average,
            popularity: self.popularity,
            poster_url: self.poster_url.clone(),
            backdrop_url: self.backdrop_url.clone(),
        }
    }
}
