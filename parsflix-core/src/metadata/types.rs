//! Wire types for the TMDB v3 API.
//!
//! TMDB is loose with absent data: dates arrive as `""` as often as `null`,
//! and runtimes of `0` mean "unknown". The lenient deserializers here
//! normalize all of those to `None` so the rest of the crate never sees
//! sentinel values.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
}

fn lenient_runtime<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i32>::deserialize(deserializer)?;
    Ok(raw.filter(|minutes| *minutes > 0))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreEntry {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenreListResponse {
    #[serde(default)]
    pub genres: Vec<GenreEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_runtime")]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub popularity: f64,
    pub original_language: Option<String>,
    pub status: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreEntry>,
    /// Present when fetched with `append_to_response=credits`.
    pub credits: Option<Credits>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesDetails {
    pub id: i64,
    pub name: String,
    pub original_name: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub first_air_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub last_air_date: Option<NaiveDate>,
    #[serde(default)]
    pub number_of_seasons: i32,
    #[serde(default)]
    pub number_of_episodes: i32,
    pub status: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub popularity: f64,
    pub original_language: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreEntry>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub id: Option<i64>,
    pub season_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub air_date: Option<NaiveDate>,
    #[serde(default)]
    pub episode_count: i32,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonDetails {
    pub id: Option<i64>,
    pub season_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub air_date: Option<NaiveDate>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeEntry {
    pub id: Option<i64>,
    pub episode_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub air_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_runtime")]
    pub runtime: Option<i32>,
    pub still_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieSearchResult {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub release_date: Option<NaiveDate>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesSearchResult {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub first_air_date: Option<NaiveDate>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
}

/// Error body TMDB returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiStatus {
    pub status_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_and_missing_dates_become_none() {
        let json = r#"{
            "id": 603,
            "title": "The Matrix",
            "release_date": "",
            "runtime": 136,
            "vote_average": 8.2,
            "vote_count": 24000,
            "popularity": 85.6
        }"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.release_date, None);
        assert_eq!(details.runtime, Some(136));

        let json = r#"{"id": 1, "title": "Untitled"}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.release_date, None);
        assert_eq!(details.runtime, None);
    }

    #[test]
    fn zero_and_null_runtime_become_none() {
        let json = r#"{"id": 1, "title": "T", "runtime": 0}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.runtime, None);

        let json = r#"{"id": 1, "title": "T", "runtime": null}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.runtime, None);
    }

    #[test]
    fn unparseable_dates_are_dropped_not_fatal() {
        let json = r#"{"id": 1, "title": "T", "release_date": "sometime"}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.release_date, None);

        let json = r#"{"id": 1, "title": "T", "release_date": "1999-03-31"}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(
            details.release_date,
            NaiveDate::from_ymd_opt(1999, 3, 31)
        );
    }

    #[test]
    fn series_details_carry_season_summaries() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "number_of_seasons": 5,
            "number_of_episodes": 62,
            "seasons": [
                {"id": 3577, "season_number": 0, "name": "Specials", "episode_count": 9},
                {"id": 3572, "season_number": 1, "name": "Season 1", "air_date": "2008-01-20", "episode_count": 7}
            ]
        }"#;
        let details: SeriesDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.seasons.len(), 2);
        assert_eq!(details.seasons[0].season_number, 0);
        assert_eq!(
            details.seasons[1].air_date,
            NaiveDate::from_ymd_opt(2008, 1, 20)
        );
    }

    #[test]
    fn search_pages_decode_with_sparse_results() {
        let json = r#"{
            "page": 1,
            "results": [{"id": 603, "title": "The Matrix"}],
            "total_pages": 1,
            "total_results": 1
        }"#;
        let page: SearchPage<MovieSearchResult> =
            serde_json::from_str(json).unwrap();
        assert_eq!(page.results[0].title, "The Matrix");
        assert_eq!(page.results[0].release_date, None);

        let json = r#"{"results": [{"id": 1396, "name": "Breaking Bad"}]}"#;
        let page: SearchPage<SeriesSearchResult> =
            serde_json::from_str(json).unwrap();
        assert_eq!(page.page, 0);
        assert_eq!(page.results[0].name, "Breaking Bad");
    }

    #[test]
    fn credits_default_to_empty_lists() {
        let credits: Credits = serde_json::from_str("{}").unwrap();
        assert!(credits.cast.is_empty());
        assert!(credits.crew.is_empty());

        let json = r#"{
            "cast": [{"id": 6384, "name": "Keanu Reeves", "character": "Neo", "order": 0}],
            "crew": [{"id": 9340, "name": "Lana Wachowski", "job": "Director", "department": "Directing"}]
        }"#;
        let credits: Credits = serde_json::from_str(json).unwrap();
        assert_eq!(credits.cast[0].character.as_deref(), Some("Neo"));
        assert_eq!(credits.crew[0].job.as_deref(), Some("Director"));
    }
}
