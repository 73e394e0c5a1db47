//! Catalog domain entities.
//!
//! These mirror the normalized storage rows. The resolver converts them back
//! into provider-shaped payloads so callers see one format regardless of
//! whether data came from cache or from a live provider call.

use crate::modules::catalog::domain::value_objects::{AliasOwner, RoleType};
use crate::shared::domain::ContentKind;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// A cached series or movie.
#[derive(Debug, Clone)]
pub struct Title {
    pub id: i32,
    pub tvdb_id: i32,
    pub kind: ContentKind,
    pub name: String,
    pub slug: Option<String>,
    pub overview: Option<String>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub original_language: Option<String>,
    pub original_country: Option<String>,
    /// None means the row was created by a minimal insert and has never
    /// been fully synchronized.
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub extra_metadata: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct SeriesDetail {
    pub id: i32,
    pub content_id: i32,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    pub average_runtime: Option<i32>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    pub network: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MovieDetail {
    pub id: i32,
    pub content_id: i32,
    pub runtime: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Season {
    pub id: i32,
    pub tvdb_id: i32,
    pub content_id: i32,
    pub season_number: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub image_url: Option<String>,
    pub season_type: Option<String>,
    pub season_type_id: Option<i32>,
    pub year: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Episode {
    pub id: i32,
    pub tvdb_id: i32,
    pub content_id: i32,
    /// None when no season with a matching number existed at merge time.
    pub season_id: Option<i32>,
    pub season_number: i32,
    pub episode_number: i32,
    pub absolute_number: Option<i32>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub image_url: Option<String>,
    pub aired: Option<NaiveDate>,
    pub runtime: Option<i32>,
    pub year: Option<String>,
    pub finale_type: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Person {
    pub id: i32,
    pub tvdb_id: i32,
    pub full_name: String,
    pub biography: Option<String>,
    pub image_url: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub extra_metadata: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Credit {
    pub id: i32,
    pub content_id: i32,
    pub person_id: i32,
    pub role: RoleType,
    pub character_name: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct Genre {
    pub id: i32,
    pub tvdb_id: Option<i32>,
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Alias {
    pub id: i32,
    pub owner: AliasOwner,
    pub name: String,
    pub language: String,
}

/// A title with everything the detail view needs, loaded in one repository
/// call.
#[derive(Debug, Clone)]
pub struct TitleDetails {
    pub title: Title,
    pub series_detail: Option<SeriesDetail>,
    pub movie_detail: Option<MovieDetail>,
    pub genres: Vec<Genre>,
    pub credits: Vec<CreditWithPerson>,
    pub aliases: Vec<Alias>,
}

#[derive(Debug, Clone)]
pub struct CreditWithPerson {
    pub credit: Credit,
    pub person: Person,
}

#[derive(Debug, Clone)]
pub struct PersonDetails {
    pub person: Person,
    pub aliases: Vec<Alias>,
    pub credits: Vec<CreditWithTitle>,
}

#[derive(Debug, Clone)]
pub struct CreditWithTitle {
    pub credit: Credit,
    pub title: Title,
}
