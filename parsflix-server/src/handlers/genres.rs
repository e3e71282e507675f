use axum::{Json, extract::State};
use parsflix_model::Genre;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.queries.genres().await.map_err(AppError::from)?;
    Ok(Json(genres))
}
