//! Admin-only endpoints: TMDB lookup, ingestion, curation, and stats.
//!
//! Every handler here sits behind both the auth and admin middleware, so the
//! `User` extension is always present and always an admin.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use parsflix_core::CatalogError;
use parsflix_core::database::ports::{
    CatalogCounts, GenreSyncReport, MovieUpdate, SeriesUpdate,
};
use parsflix_core::metadata::types::{
    MovieSearchResult, SearchPage, SeriesSearchResult,
};
use parsflix_model::{
    MediaType, Movie, MovieDetail, MovieId, Series, SeriesDetail, SeriesId,
    TmdbId, User,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api_types::ApiResponse;
use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct TmdbSearchQuery {
    pub query: String,
    #[serde(default = "default_media_type")]
    pub media_type: MediaType,
    pub year: Option<i32>,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_media_type() -> MediaType {
    MediaType::Movie
}

fn default_page() -> u32 {
    1
}

/// Search results keep TMDB's page shape so admins can page through them.
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum TmdbSearchResponse {
    Movies(SearchPage<MovieSearchResult>),
    Series(SearchPage<SeriesSearchResult>),
}

pub async fn tmdb_search(
    State(state): State<AppState>,
    Query(params): Query<TmdbSearchQuery>,
) -> AppResult<Json<TmdbSearchResponse>> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::bad_request("search query must not be empty"));
    }

    let response = match params.media_type {
        MediaType::Movie => TmdbSearchResponse::Movies(
            state
                .provider
                .search_movies(query, params.year, params.page)
                .await
                .map_err(CatalogError::from)?,
        ),
        MediaType::Series => TmdbSearchResponse::Series(
            state
                .provider
                .search_series(query, params.page)
                .await
                .map_err(CatalogError::from)?,
        ),
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub tmdb_id: i64,
}

pub async fn create_movie(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Json(request): Json<IngestRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MovieDetail>>)> {
    let detail = state
        .ingest
        .create_movie(TmdbId(request.tmdb_id), &actor)
        .await
        .map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(detail))))
}

pub async fn create_series(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Json(request): Json<IngestRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SeriesDetail>>)> {
    let detail = state
        .ingest
        .create_series(TmdbId(request.tmdb_id), &actor)
        .await
        .map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(detail))))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
    Json(update): Json<MovieUpdate>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let movie = state
        .ingest
        .update_movie(MovieId::from_uuid(id), &update, &actor)
        .await
        .map_err(AppError::from)?;
    Ok(Json(ApiResponse::success(movie)))
}

pub async fn update_series(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
    Json(update): Json<SeriesUpdate>,
) -> AppResult<Json<ApiResponse<Series>>> {
    let series = state
        .ingest
        .update_series(SeriesId::from_uuid(id), &update, &actor)
        .await
        .map_err(AppError::from)?;
    Ok(Json(ApiResponse::success(series)))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .ingest
        .delete_movie(MovieId::from_uuid(id), &actor)
        .await
        .map_err(AppError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_series(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .ingest
        .delete_series(SeriesId::from_uuid(id), &actor)
        .await
        .map_err(AppError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn sync_genres(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<GenreSyncReport>>> {
    let report = state.ingest.sync_genres().await.map_err(AppError::from)?;
    Ok(Json(ApiResponse::success_with_message(
        report,
        "genre list synchronized",
    )))
}

pub async fn stats(
    State(state): State<AppState>,
) -> AppResult<Json<CatalogCounts>> {
    let counts = state.queries.counts().await.map_err(AppError::from)?;
    Ok(Json(counts))
}
