use axum::{
    Json,
    extract::{Query, State},
};
use parsflix_core::catalog::BrowseResponse;
use parsflix_core::database::ports::{CatalogEntry, SearchResults};
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

pub async fn browse(
    State(state): State<AppState>,
) -> AppResult<Json<BrowseResponse>> {
    let response = state.queries.browse().await.map_err(AppError::from)?;
    Ok(Json(response))
}

pub async fn featured(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    let entries = state.queries.featured().await.map_err(AppError::from)?;
    Ok(Json(entries))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResults>> {
    let results = state
        .queries
        .search(&query.query)
        .await
        .map_err(AppError::from)?;
    Ok(Json(results))
}
