use serde::{Deserialize, Serialize};

use crate::ids::{PersonId, TmdbId};

/// A cast or crew member shared across catalog entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub tmdb_id: TmdbId,
    pub name: String,
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_public_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditKind {
    Cast,
    Crew,
}

impl CreditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditKind::Cast => "cast",
            CreditKind::Crew => "crew",
        }
    }
}

/// One row of a title's credit list.
///
/// Cast credits carry `character`, crew credits carry `job` and
/// `department`. `position` preserves TMDB's billing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    #[serde(flatten)]
    pub person: Person,
    pub kind: CreditKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub position: i32,
}
