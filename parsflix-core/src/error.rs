use thiserror::Error;

use crate::images::ImageStoreError;
use crate::metadata::ProviderError;

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

/// Error taxonomy for catalog operations.
///
/// The first four variants carry user-facing messages and map directly to
/// HTTP statuses at the API boundary; the rest wrap infrastructure failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("metadata provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("image store error: {0}")]
    Image(#[from] ImageStoreError),

    #[error("database error: {0}")]
    Database(String),

    #[error("crypto error: {0}")]
    Crypto(String),
}

impl CatalogError {
    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CatalogError::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CatalogError::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation(message.into())
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                CatalogError::NotFound("record not found".to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CatalogError::Conflict(format!(
                    "unique constraint violated: {}",
                    db_err.constraint().unwrap_or("unknown")
                ))
            }
            _ => CatalogError::Database(err.to_string()),
        }
    }
}
