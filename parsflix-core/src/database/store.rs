use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use sqlx::PgPool;

use super::ports::{
    ContentRepository, GenreRepository, MovieRepository, SessionRepository,
    SeriesRepository, UserRepository,
};
use super::postgres::{
    PostgresContentRepository, PostgresGenreRepository,
    PostgresMovieRepository, PostgresSeriesRepository,
    PostgresSessionRepository, PostgresUserRepository,
};

/// Aggregates the repository ports used by application services.
///
/// Composition keeps construction and test wiring straightforward: swap any
/// field for a fake without touching the others.
#[derive(Clone)]
pub struct CatalogStore {
    pub movies: Arc<dyn MovieRepository>,
    pub series: Arc<dyn SeriesRepository>,
    pub genres: Arc<dyn GenreRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl CatalogStore {
    /// Wire every port to its PostgreSQL adapter over a shared pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            movies: Arc::new(PostgresMovieRepository::new(pool.clone())),
            series: Arc::new(PostgresSeriesRepository::new(pool.clone())),
            genres: Arc::new(PostgresGenreRepository::new(pool.clone())),
            content: Arc::new(PostgresContentRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(pool)),
        }
    }
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogStore")
            .field("movies", &type_name_of_val(self.movies.as_ref()))
            .field("series", &type_name_of_val(self.series.as_ref()))
            .field("genres", &type_name_of_val(self.genres.as_ref()))
            .field("content", &type_name_of_val(self.content.as_ref()))
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("sessions", &type_name_of_val(self.sessions.as_ref()))
            .finish()
    }
}
