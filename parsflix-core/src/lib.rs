//! Parsflix core library.
//!
//! Everything between the HTTP surface and PostgreSQL lives here: repository
//! ports and their sqlx adapters, the TMDB metadata client, the Cloudinary
//! image store, ingestion and query services, and password/token crypto.

pub mod auth;
pub mod catalog;
pub mod database;
pub mod error;
pub mod images;
pub mod metadata;

pub use database::{CatalogStore, MIGRATOR};
pub use error::{CatalogError, Result};
