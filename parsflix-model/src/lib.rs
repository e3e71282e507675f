//! Core data model definitions shared across Parsflix crates.
#![allow(missing_docs)]

pub mod genre;
pub mod ids;
pub mod media;
pub mod media_type;
pub mod page;
pub mod people;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use genre::Genre;
pub use ids::{
    EpisodeId, GenreId, MovieId, PersonId, SeasonId, SeriesId, SessionId,
    TmdbId, UserId,
};
pub use media::{
    Episode, Movie, MovieDetail, MovieSummary, Season, SeasonDetail, Series,
    SeriesDetail, SeriesSummary,
};
pub use media_type::MediaType;
pub use page::{Page, PageParams};
pub use people::{Credit, CreditKind, Person};
pub use user::{User, UserRole};
