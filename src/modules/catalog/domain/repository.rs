//! Repository trait for catalog lookups used by the read path.
//!
//! The merge engine writes through its own transactional code path; this
//! trait only covers what the resolver and listings need.

use crate::modules::catalog::domain::entities::{
    Episode, PersonDetails, Season, Title, TitleDetails,
};
use crate::modules::provider::domain::payload::TitlePayload;
use crate::shared::domain::ContentKind;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Core title row only, no children.
    async fn find_title(&self, tvdb_id: i32, kind: ContentKind) -> AppResult<Option<Title>>;

    /// Title plus kind detail, genres, credits and aliases.
    async fn find_title_details(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
    ) -> AppResult<Option<TitleDetails>>;

    async fn find_person_details(&self, tvdb_id: i32) -> AppResult<Option<PersonDetails>>;

    /// Seasons of a series ordered by season number; empty when the series
    /// is not cached.
    async fn list_seasons(&self, tvdb_id: i32) -> AppResult<Vec<Season>>;

    /// Episodes of a series ordered by (season, episode); optionally
    /// restricted to one season. Empty when the series is not cached.
    async fn list_episodes(
        &self,
        tvdb_id: i32,
        season_number: Option<i32>,
    ) -> AppResult<Vec<Episode>>;

    /// Get-or-create a core title row from payload scalars, with no children
    /// and `last_synced_at` left NULL. Used when a caller needs a durable
    /// row before the background sync lands.
    async fn insert_title_minimal(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
        payload: &TitlePayload,
    ) -> AppResult<Title>;
}
