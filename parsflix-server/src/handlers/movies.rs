use axum::{
    Json,
    extract::{Path, Query, State},
};
use parsflix_model::{Credit, MovieDetail, MovieId, MovieSummary, Page};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

use super::ListQuery;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<MovieSummary>>> {
    let page = state
        .queries
        .movies(&query.into_filter())
        .await
        .map_err(AppError::from)?;
    Ok(Json(page))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MovieDetail>> {
    let detail = state
        .queries
        .movie(MovieId::from_uuid(id))
        .await
        .map_err(AppError::from)?;
    Ok(Json(detail))
}

pub async fn credits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Credit>>> {
    let credits = state
        .queries
        .movie_credits(MovieId::from_uuid(id))
        .await
        .map_err(AppError::from)?;
    Ok(Json(credits))
}
