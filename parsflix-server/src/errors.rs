use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parsflix_core::CatalogError;
use parsflix_core::metadata::ProviderError;
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

/// HTTP-facing error: a status code plus a user-safe message.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(msg) => Self::not_found(msg),
            CatalogError::Conflict(msg) => Self::conflict(msg),
            CatalogError::Forbidden(msg) => Self::forbidden(msg),
            CatalogError::Validation(msg) => Self::bad_request(msg),
            CatalogError::Provider(ProviderError::NotFound) => {
                Self::not_found("title not found at the metadata provider")
            }
            CatalogError::Provider(ProviderError::RateLimited) => {
                Self::bad_gateway("metadata provider rate limit exceeded")
            }
            CatalogError::Provider(err) => {
                tracing::error!(error = %err, "metadata provider failure");
                Self::bad_gateway("metadata provider unavailable")
            }
            CatalogError::Image(err) => {
                tracing::error!(error = %err, "image store failure");
                Self::bad_gateway("image store unavailable")
            }
            CatalogError::Database(msg) => {
                tracing::error!(error = %msg, "database failure");
                Self::internal("internal server error")
            }
            CatalogError::Crypto(msg) => {
                tracing::error!(error = %msg, "crypto failure");
                Self::internal("internal server error")
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}
