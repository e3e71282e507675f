use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use parsflix_model::{User, UserId};

use crate::errors::AppError;
use crate::infra::app_state::AppState;

/// Resolve the Bearer access token to a [`User`] request extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)?;
    let claims = state
        .tokens
        .verify(&token)
        .map_err(|_| AppError::unauthorized("invalid or expired token"))?;

    let user = state
        .store
        .users
        .find_by_id(UserId::from_uuid(claims.sub))
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::unauthorized("unknown user"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Reject non-admin callers. Must sit inside `auth_middleware` so the user
/// extension is already populated.
pub async fn admin_middleware(
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<User>()
        .ok_or_else(|| AppError::unauthorized("authentication required"))?;

    if !user.is_admin() {
        return Err(AppError::forbidden("admin access required"));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Result<String, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::unauthorized("expected a Bearer token"))
}
