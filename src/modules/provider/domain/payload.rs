//! Wire payloads returned by the metadata provider.
//!
//! TVDB is loose about scalar types: `year` may be a number or a string,
//! `status` may be a bare string or an object carrying a `name`, and money
//! fields arrive as formatted strings. Deserialization here is deliberately
//! forgiving: a field that cannot be interpreted becomes absent instead of
//! failing the whole payload.
//!
//! Unknown keys are preserved in each payload's `extra` map so the raw
//! provider record can be stored alongside the normalized columns.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let cleaned = s.trim().replace(['$', ','], "");
            cleaned.parse::<i64>().ok()
        }
        _ => None,
    }
}

fn de_lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64).map(|n| n as i32))
}

fn de_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

/// Numbers that the schema keeps as free-form strings (season/episode `year`).
fn de_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `status`-style fields: either `"Ended"` or `{"id": 2, "name": "Ended"}`.
fn de_name_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum NameField {
        Object { name: Option<String> },
        Plain(String),
        Other(Value),
    }

    let value = Option::<NameField>::deserialize(deserializer)?;
    Ok(match value {
        Some(NameField::Object { name }) => name,
        Some(NameField::Plain(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// One cast or crew entry on a title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterPayload {
    #[serde(rename = "peopleId", deserialize_with = "de_lenient_i32")]
    pub people_id: Option<i32>,
    #[serde(rename = "personName")]
    pub person_name: Option<String>,
    /// Provider role label ("Actor", "Director", "Executive Producer", ...).
    #[serde(rename = "peopleType")]
    pub people_type: Option<String>,
    /// Character name, meaningful for actors only.
    pub name: Option<String>,
    #[serde(deserialize_with = "de_lenient_i32")]
    pub sort: Option<i32>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenrePayload {
    #[serde(deserialize_with = "de_lenient_i32")]
    pub id: Option<i32>,
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasPayload {
    pub name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonTypePayload {
    #[serde(deserialize_with = "de_lenient_i32")]
    pub id: Option<i32>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonPayload {
    #[serde(deserialize_with = "de_lenient_i32")]
    pub id: Option<i32>,
    #[serde(deserialize_with = "de_lenient_i32")]
    pub number: Option<i32>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub season_type: Option<SeasonTypePayload>,
    #[serde(deserialize_with = "de_lenient_string")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodePayload {
    #[serde(deserialize_with = "de_lenient_i32")]
    pub id: Option<i32>,
    #[serde(rename = "seasonNumber", deserialize_with = "de_lenient_i32")]
    pub season_number: Option<i32>,
    #[serde(rename = "number", deserialize_with = "de_lenient_i32")]
    pub episode_number: Option<i32>,
    #[serde(rename = "absoluteNumber", deserialize_with = "de_lenient_i32")]
    pub absolute_number: Option<i32>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub image: Option<String>,
    /// Air date in `YYYY-MM-DD`; parsed at merge time, bad values dropped.
    pub aired: Option<String>,
    #[serde(deserialize_with = "de_lenient_i32")]
    pub runtime: Option<i32>,
    #[serde(deserialize_with = "de_lenient_string")]
    pub year: Option<String>,
    #[serde(rename = "finaleType")]
    pub finale_type: Option<String>,
}

/// Full detail record for a series or movie as returned by the provider's
/// extended endpoints. Series carry `seasons`; movies carry the runtime and
/// money fields. Everything the schema does not normalize stays in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlePayload {
    #[serde(deserialize_with = "de_lenient_i32")]
    pub id: Option<i32>,
    pub name: Option<String>,
    pub overview: Option<String>,
    #[serde(deserialize_with = "de_lenient_i32")]
    pub year: Option<i32>,
    #[serde(deserialize_with = "de_name_field")]
    pub status: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "originalLanguage")]
    pub original_language: Option<String>,
    #[serde(rename = "originalCountry")]
    pub original_country: Option<String>,
    pub genres: Vec<GenrePayload>,
    pub characters: Vec<CharacterPayload>,
    pub aliases: Vec<AliasPayload>,

    // Series fields
    pub seasons: Vec<SeasonPayload>,
    #[serde(rename = "numberOfSeasons", deserialize_with = "de_lenient_i32")]
    pub number_of_seasons: Option<i32>,
    #[serde(rename = "numberOfEpisodes", deserialize_with = "de_lenient_i32")]
    pub number_of_episodes: Option<i32>,
    #[serde(rename = "averageRuntime", deserialize_with = "de_lenient_i32")]
    pub average_runtime: Option<i32>,
    #[serde(rename = "firstAired")]
    pub first_aired: Option<String>,
    #[serde(rename = "lastAired")]
    pub last_aired: Option<String>,
    #[serde(rename = "originalNetwork", deserialize_with = "de_name_field")]
    pub original_network: Option<String>,

    // Movie fields
    #[serde(deserialize_with = "de_lenient_i32")]
    pub runtime: Option<i32>,
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    #[serde(deserialize_with = "de_lenient_i64")]
    pub budget: Option<i64>,
    #[serde(rename = "boxOffice", deserialize_with = "de_lenient_i64")]
    pub box_office: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TitlePayload {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The raw-blob form stored in `content.extra_metadata`.
    pub fn to_raw(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonPayload {
    #[serde(deserialize_with = "de_lenient_i32")]
    pub id: Option<i32>,
    pub name: Option<String>,
    pub biography: Option<String>,
    pub image: Option<String>,
    pub aliases: Vec<AliasPayload>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersonPayload {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_raw(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Summary record from the provider's search endpoint. Search results are
/// never cached; only detail views enter the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    #[serde(rename = "tvdb_id", deserialize_with = "de_lenient_i32")]
    pub tvdb_id: Option<i32>,
    pub name: Option<String>,
    /// "series" or "movie".
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub overview: Option<String>,
    #[serde(deserialize_with = "de_lenient_i32")]
    pub year: Option<i32>,
    pub image_url: Option<String>,
    pub thumbnail: Option<String>,
    pub primary_language: Option<String>,
    pub country: Option<String>,
    #[serde(deserialize_with = "de_name_field")]
    pub status: Option<String>,
}
