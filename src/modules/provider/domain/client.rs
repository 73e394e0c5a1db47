//! Port for the external metadata provider.
//!
//! "Not found" is an `Ok(None)` / empty result, never an error: the pipeline
//! treats it as terminal, while `Err` values are transient and retryable.

use crate::modules::provider::domain::payload::{
    EpisodePayload, PersonPayload, SearchResult, TitlePayload,
};
use crate::shared::domain::ContentKind;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search for series and movies by free-text query.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> AppResult<Vec<SearchResult>>;

    /// Fetch the full detail record for one title, or None if the provider
    /// has no such id.
    async fn fetch_title_details(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
    ) -> AppResult<Option<TitlePayload>>;

    /// Fetch every episode of a series (all pages).
    async fn fetch_episodes(&self, series_tvdb_id: i32) -> AppResult<Vec<EpisodePayload>>;

    /// Fetch the full detail record for one person, or None.
    async fn fetch_person_details(&self, tvdb_id: i32) -> AppResult<Option<PersonPayload>>;
}
