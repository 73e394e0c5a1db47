use serde::{Deserialize, Serialize};

/// Whether a catalog row is a TV series or a movie. Matches the `content_type`
/// database enum; the external provider uses the same two record families.
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::ContentType"]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Series,
    Movie,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Series => write!(f, "series"),
            ContentKind::Movie => write!(f, "movie"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "series" => Ok(ContentKind::Series),
            "movie" => Ok(ContentKind::Movie),
            _ => Err(format!("Invalid content kind: {}", s)),
        }
    }
}
