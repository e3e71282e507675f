//! HTTP API server for the Parsflix catalog.
//!
//! The binary in `main.rs` wires the PostgreSQL store, TMDB client, and
//! Cloudinary client into [`infra::app_state::AppState`] and serves the
//! router from [`routes`]. The library surface exists so integration tests
//! can build the same router over in-memory adapters.

pub mod api_types;
pub mod auth;
pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;
