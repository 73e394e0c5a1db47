//! Diesel models for the catalog tables.

use crate::modules::catalog::domain::entities::{
    Alias, Credit, Episode, Genre, MovieDetail, Person, Season, SeriesDetail, Title,
};
use crate::modules::catalog::domain::value_objects::{AliasEntityKind, AliasOwner, RoleType};
use crate::schema::{
    aliases, content, content_genres, credits, episodes, genres, movie_details, people, seasons,
    series_details,
};
use crate::shared::domain::ContentKind;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;

// ================== CONTENT ==================

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = content)]
pub struct ContentModel {
    pub id: i32,
    pub tvdb_id: i32,
    pub content_type: ContentKind,
    pub name: String,
    pub slug: Option<String>,
    pub overview: Option<String>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub original_language: Option<String>,
    pub original_country: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub extra_metadata: Option<JsonValue>,
}

impl ContentModel {
    pub fn to_entity(self) -> Title {
        Title {
            id: self.id,
            tvdb_id: self.tvdb_id,
            kind: self.content_type,
            name: self.name,
            slug: self.slug,
            overview: self.overview,
            year: self.year,
            status: self.status,
            image_url: self.image_url,
            original_language: self.original_language,
            original_country: self.original_country,
            last_synced_at: self.last_synced_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            extra_metadata: self.extra_metadata,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = content)]
pub struct NewContent {
    pub tvdb_id: i32,
    pub content_type: ContentKind,
    pub name: String,
    pub overview: Option<String>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub original_language: Option<String>,
    pub original_country: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub extra_metadata: Option<JsonValue>,
}

/// Full-replace update used by the merge engine: absent payload fields
/// clear their columns.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = content, treat_none_as_null = true)]
pub struct ContentChangeset {
    pub name: String,
    pub overview: Option<String>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub image_url: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub extra_metadata: Option<JsonValue>,
    pub updated_at: DateTime<Utc>,
}

// ================== KIND DETAILS ==================

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = series_details)]
pub struct SeriesDetailModel {
    pub id: i32,
    pub content_id: i32,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    pub average_runtime: Option<i32>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    pub network: Option<String>,
}

impl SeriesDetailModel {
    pub fn to_entity(self) -> SeriesDetail {
        SeriesDetail {
            id: self.id,
            content_id: self.content_id,
            number_of_seasons: self.number_of_seasons,
            number_of_episodes: self.number_of_episodes,
            average_runtime: self.average_runtime,
            first_air_date: self.first_air_date,
            last_air_date: self.last_air_date,
            network: self.network,
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = series_details, treat_none_as_null = true)]
pub struct NewSeriesDetail {
    pub content_id: i32,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    pub average_runtime: Option<i32>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    pub network: Option<String>,
}

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = movie_details)]
pub struct MovieDetailModel {
    pub id: i32,
    pub content_id: i32,
    pub runtime: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
}

impl MovieDetailModel {
    pub fn to_entity(self) -> MovieDetail {
        MovieDetail {
            id: self.id,
            content_id: self.content_id,
            runtime: self.runtime,
            release_date: self.release_date,
            budget: self.budget,
            revenue: self.revenue,
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = movie_details, treat_none_as_null = true)]
pub struct NewMovieDetail {
    pub content_id: i32,
    pub runtime: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
}

// ================== SEASONS / EPISODES ==================

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = seasons)]
pub struct SeasonModel {
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

impl SeasonModel {
    pub fn to_entity(self) -> Season {
        Season {
            id: self.id,
            tvdb_id: self.tvdb_id,
            content_id: self.content_id,
            season_number: self.season_number,
            name: self.name,
            overview: self.overview,
            image_url: self.image_url,
            season_type: self.season_type,
            season_type_id: self.season_type_id,
            year: self.year,
            last_synced_at: self.last_synced_at,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = seasons)]
pub struct NewSeason {
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

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = episodes)]
pub struct EpisodeModel {
    pub id: i32,
    pub tvdb_id: i32,
    pub content_id: i32,
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

impl EpisodeModel {
    pub fn to_entity(self) -> Episode {
        Episode {
            id: self.id,
            tvdb_id: self.tvdb_id,
            content_id: self.content_id,
            season_id: self.season_id,
            season_number: self.season_number,
            episode_number: self.episode_number,
            absolute_number: self.absolute_number,
            name: self.name,
            overview: self.overview,
            image_url: self.image_url,
            aired: self.aired,
            runtime: self.runtime,
            year: self.year,
            finale_type: self.finale_type,
            last_synced_at: self.last_synced_at,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = episodes)]
pub struct NewEpisode {
    pub tvdb_id: i32,
    pub content_id: i32,
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

// ================== PEOPLE / CREDITS ==================

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = people)]
pub struct PersonModel {
    pub id: i32,
    pub tvdb_id: i32,
    pub full_name: String,
    pub biography: Option<String>,
    pub image_url: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub extra_metadata: Option<JsonValue>,
}

impl PersonModel {
    pub fn to_entity(self) -> Person {
        Person {
            id: self.id,
            tvdb_id: self.tvdb_id,
            full_name: self.full_name,
            biography: self.biography,
            image_url: self.image_url,
            last_synced_at: self.last_synced_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            extra_metadata: self.extra_metadata,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = people)]
pub struct NewPerson {
    pub tvdb_id: i32,
    pub full_name: String,
    pub biography: Option<String>,
    pub image_url: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub extra_metadata: Option<JsonValue>,
}

#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = people, treat_none_as_null = true)]
pub struct PersonChangeset {
    pub full_name: String,
    pub biography: Option<String>,
    pub image_url: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub extra_metadata: Option<JsonValue>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = credits)]
pub struct CreditModel {
    pub id: i32,
    pub content_id: i32,
    pub person_id: i32,
    pub role: RoleType,
    pub character_name: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl CreditModel {
    pub fn to_entity(self) -> Credit {
        Credit {
            id: self.id,
            content_id: self.content_id,
            person_id: self.person_id,
            role: self.role,
            character_name: self.character_name,
            sort_order: self.sort_order,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = credits)]
pub struct NewCredit {
    pub content_id: i32,
    pub person_id: i32,
    pub role: RoleType,
    pub character_name: Option<String>,
    pub sort_order: i32,
}

// ================== GENRES / ALIASES ==================

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = genres)]
pub struct GenreModel {
    pub id: i32,
    pub tvdb_id: Option<i32>,
    pub name: String,
    pub slug: Option<String>,
}

impl GenreModel {
    pub fn to_entity(self) -> Genre {
        Genre {
            id: self.id,
            tvdb_id: self.tvdb_id,
            name: self.name,
            slug: self.slug,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = genres)]
pub struct NewGenre {
    pub tvdb_id: Option<i32>,
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = content_genres)]
pub struct NewContentGenre {
    pub content_id: i32,
    pub genre_id: i32,
}

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = aliases)]
pub struct AliasModel {
    pub id: i32,
    pub entity_type: AliasEntityKind,
    pub entity_id: i32,
    pub name: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl AliasModel {
    pub fn to_entity(self) -> Alias {
        Alias {
            id: self.id,
            owner: AliasOwner::from_parts(self.entity_type, self.entity_id),
            name: self.name,
            language: self.language,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = aliases)]
pub struct NewAlias {
    pub entity_type: AliasEntityKind,
    pub entity_id: i32,
    pub name: String,
    pub language: String,
}
