//! PostgreSQL adapters for the repository ports.
//!
//! Queries are bound at runtime so the crate builds without a live database.

mod content;
mod genres;
mod movies;
mod rows;
mod series;
mod sessions;
mod users;

pub use content::PostgresContentRepository;
pub use genres::PostgresGenreRepository;
pub use movies::PostgresMovieRepository;
pub use series::PostgresSeriesRepository;
pub use sessions::PostgresSessionRepository;
pub use users::PostgresUserRepository;
