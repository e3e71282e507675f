use serde::{Deserialize, Serialize};

use crate::ids::{GenreId, TmdbId};

/// A catalog genre, keyed by its TMDB identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub tmdb_id: TmdbId,
    pub name: String,
}
