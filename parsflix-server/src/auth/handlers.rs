use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use parsflix_core::database::ports::{NewSession, NewUser};
use parsflix_model::{User, UserRole};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

use super::jwt::new_refresh_token;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern")
});

const DISPLAY_NAME_MAX: usize = 80;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair issued at register/login/refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let email = request.email.trim().to_string();
    let display_name = request.display_name.trim().to_string();
    validate_registration(&email, &request.password, &display_name)?;

    // The first account on an empty instance becomes the admin.
    let role = if state.store.users.count().await.map_err(AppError::from)? == 0
    {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let password_hash = state
        .auth_crypto
        .hash_password(&request.password)
        .map_err(|err| AppError::internal(err.to_string()))?;

    let user = state
        .store
        .users
        .create_with_password(
            &NewUser {
                email,
                display_name,
                role,
            },
            &password_hash,
        )
        .await
        .map_err(AppError::from)?;

    info!(user_id = %user.id, role = user.role.as_str(), "account registered");
    let response = issue_session(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Unknown email and bad password share one message.
    let invalid = || AppError::unauthorized("invalid email or password");

    let user = state
        .store
        .users
        .find_by_email(request.email.trim())
        .await
        .map_err(AppError::from)?
        .ok_or_else(invalid)?;

    let stored_hash = state
        .store
        .users
        .password_hash(user.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(invalid)?;

    let verified = state
        .auth_crypto
        .verify_password(&request.password, &stored_hash)
        .map_err(|err| AppError::internal(err.to_string()))?;
    if !verified {
        return Err(invalid());
    }

    state
        .store
        .users
        .touch_last_login(user.id)
        .await
        .map_err(AppError::from)?;

    let response = issue_session(&state, user).await?;
    Ok(Json(response))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = state.auth_crypto.hash_token(&request.refresh_token);

    let session = state
        .store
        .sessions
        .find_active(&token_hash)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            AppError::unauthorized("refresh token is invalid or expired")
        })?;

    // Rotation: the presented token is single-use.
    state
        .store
        .sessions
        .revoke(session.id)
        .await
        .map_err(AppError::from)?;

    let user = state
        .store
        .users
        .find_by_id(session.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::unauthorized("unknown user"))?;

    let response = issue_session(&state, user).await?;
    Ok(Json(response))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<StatusCode> {
    let token_hash = state.auth_crypto.hash_token(&request.refresh_token);

    if let Some(session) = state
        .store
        .sessions
        .find_active(&token_hash)
        .await
        .map_err(AppError::from)?
        && session.user_id == user.id
    {
        state
            .store
            .sessions
            .revoke(session.id)
            .await
            .map_err(AppError::from)?;
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

async fn issue_session(
    state: &AppState,
    user: User,
) -> AppResult<AuthResponse> {
    let access_token = state
        .tokens
        .issue(&user)
        .map_err(|err| AppError::internal(err.to_string()))?;

    let refresh_token = new_refresh_token();
    let expires_at = Utc::now()
        + Duration::days(state.config.auth.refresh_token_ttl_days);
    state
        .store
        .sessions
        .insert(&NewSession {
            user_id: user.id,
            token_hash: state.auth_crypto.hash_token(&refresh_token),
            expires_at,
        })
        .await
        .map_err(AppError::from)?;

    Ok(AuthResponse {
        user,
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: state.tokens.ttl_secs(),
    })
}

fn validate_registration(
    email: &str,
    password: &str,
    display_name: &str,
) -> AppResult<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::bad_request("invalid email address"));
    }
    if password.len() < 8 {
        return Err(AppError::bad_request(
            "password must be at least 8 characters",
        ));
    }
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(AppError::bad_request(
            "password must contain at least one letter and one digit",
        ));
    }
    if display_name.is_empty() || display_name.chars().count() > DISPLAY_NAME_MAX
    {
        return Err(AppError::bad_request(format!(
            "display name must be 1 to {DISPLAY_NAME_MAX} characters"
        )));
    }
    Ok(())
}
