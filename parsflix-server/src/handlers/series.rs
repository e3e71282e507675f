use axum::{
    Json,
    extract::{Path, Query, State},
};
use parsflix_model::{
    Credit, Page, SeasonDetail, SeriesDetail, SeriesId, SeriesSummary,
};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

use super::ListQuery;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<SeriesSummary>>> {
    let page = state
        .queries
        .series(&query.into_filter())
        .await
        .map_err(AppError::from)?;
    Ok(Json(page))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SeriesDetail>> {
    let detail = state
        .queries
        .series_detail(SeriesId::from_uuid(id))
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
        .series_credits(SeriesId::from_uuid(id))
        .await
        .map_err(AppError::from)?;
    Ok(Json(credits))
}

pub async fn season(
    State(state): State<AppState>,
    Path((id, number)): Path<(Uuid, i32)>,
) -> AppResult<Json<SeasonDetail>> {
    let season = state
        .queries
        .season(SeriesId::from_uuid(id), number)
        .await
        .map_err(AppError::from)?;
    Ok(Json(season))
}
