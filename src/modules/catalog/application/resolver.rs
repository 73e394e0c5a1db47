//! Read-through resolver.
//!
//! Reads are served from the catalog when fresh. On a miss or a stale hit
//! the provider is called synchronously so the caller gets current data,
//! and a background sync job is queued carrying the fetched payload:
//! persistence is deferred, the response is not. Child listings (seasons,
//! episodes) are catalog-only; their freshness rides on the parent title's
//! refresh cycle so they never trigger provider calls of their own.

use std::sync::Arc;

use crate::modules::catalog::domain::entities::{Episode, Season, Title};
use crate::modules::catalog::domain::repository::CatalogRepository;
use crate::modules::catalog::infrastructure::mapper;
use crate::modules::provider::domain::client::MetadataProvider;
use crate::modules::provider::domain::payload::{PersonPayload, SearchResult, TitlePayload};
use crate::modules::sync::domain::entities::{Job, PRIORITY_INTERACTIVE};
use crate::modules::sync::domain::repository::JobRepository;
use crate::modules::sync::freshness::{
    is_fresh, PERSON_SYNC_THRESHOLD_DAYS, TITLE_SYNC_THRESHOLD_DAYS,
};
use crate::shared::domain::ContentKind;
use crate::shared::errors::AppResult;
use crate::{log_debug, log_warn};

pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
    provider: Arc<dyn MetadataProvider>,
    jobs: Arc<dyn JobRepository>,
}

impl CatalogService {
    pub fn new(
        repository: Arc<dyn CatalogRepository>,
        provider: Arc<dyn MetadataProvider>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            repository,
            provider,
            jobs,
        }
    }

    /// Resolve one title. None means neither the catalog nor the provider
    /// knows the id.
    pub async fn resolve_title(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
    ) -> AppResult<Option<TitlePayload>> {
        let cached = self.repository.find_title_details(tvdb_id, kind).await?;

        let cache_is_fresh = cached
            .as_ref()
            .is_some_and(|d| is_fresh(d.title.last_synced_at, TITLE_SYNC_THRESHOLD_DAYS));
        if cache_is_fresh {
            return Ok(cached.map(mapper::title_details_to_payload));
        }

        match self.provider.fetch_title_details(tvdb_id, kind).await {
            Ok(Some(payload)) => {
                // Persist later; respond now with the live record.
                self.enqueue_or_log(Job::sync_title(
                    tvdb_id,
                    kind,
                    Some(payload.clone()),
                    PRIORITY_INTERACTIVE,
                ))
                .await;
                Ok(Some(payload))
            }
            Ok(None) => Ok(None),
            Err(e) => match cached {
                // Provider outage: stale data beats no data. Queue a refresh
                // without a payload so the worker retries the fetch itself.
                Some(details) => {
                    log_warn!(
                        "Provider error for {} {}, serving stale cache: {}",
                        kind,
                        tvdb_id,
                        e
                    );
                    self.enqueue_or_log(Job::sync_title(tvdb_id, kind, None, PRIORITY_INTERACTIVE))
                        .await;
                    Ok(Some(mapper::title_details_to_payload(details)))
                }
                None => {
                    log_warn!("Provider error for uncached {} {}: {}", kind, tvdb_id, e);
                    Ok(None)
                }
            },
        }
    }

    pub async fn resolve_person(&self, tvdb_id: i32) -> AppResult<Option<PersonPayload>> {
        let cached = self.repository.find_person_details(tvdb_id).await?;

        let cache_is_fresh = cached
            .as_ref()
            .is_some_and(|d| is_fresh(d.person.last_synced_at, PERSON_SYNC_THRESHOLD_DAYS));
        if cache_is_fresh {
            return Ok(cached.map(mapper::person_details_to_payload));
        }

        match self.provider.fetch_person_details(tvdb_id).await {
            Ok(Some(payload)) => {
                self.enqueue_or_log(Job::sync_person(
                    tvdb_id,
                    Some(payload.clone()),
                    PRIORITY_INTERACTIVE,
                ))
                .await;
                Ok(Some(payload))
            }
            Ok(None) => Ok(None),
            Err(e) => match cached {
                Some(details) => {
                    log_warn!(
                        "Provider error for person {}, serving stale cache: {}",
                        tvdb_id,
                        e
                    );
                    self.enqueue_or_log(Job::sync_person(tvdb_id, None, PRIORITY_INTERACTIVE))
                        .await;
                    Ok(Some(mapper::person_details_to_payload(details)))
                }
                None => {
                    log_warn!("Provider error for uncached person {}: {}", tvdb_id, e);
                    Ok(None)
                }
            },
        }
    }

    /// Cached seasons, stale or not; refresh rides on the title's cycle.
    pub async fn list_seasons(&self, tvdb_id: i32) -> AppResult<Vec<Season>> {
        self.repository.list_seasons(tvdb_id).await
    }

    /// Cached episodes across all seasons.
    pub async fn list_episodes(&self, tvdb_id: i32) -> AppResult<Vec<Episode>> {
        self.repository.list_episodes(tvdb_id, None).await
    }

    /// Cached episodes of one season.
    pub async fn list_season_episodes(
        &self,
        tvdb_id: i32,
        season_number: i32,
    ) -> AppResult<Vec<Episode>> {
        self.repository
            .list_episodes(tvdb_id, Some(season_number))
            .await
    }

    /// Search goes straight to the provider and results are never cached;
    /// only detail views populate the catalog.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> AppResult<Vec<SearchResult>> {
        self.provider.search(query, limit, offset).await
    }

    /// Guarantee a durable core title row before returning, for callers
    /// about to create rows referencing it (check-ins). The full sync still
    /// happens in the background.
    pub async fn ensure_title_minimal(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
    ) -> AppResult<Option<Title>> {
        if let Some(existing) = self.repository.find_title(tvdb_id, kind).await? {
            return Ok(Some(existing));
        }

        let Some(payload) = self.provider.fetch_title_details(tvdb_id, kind).await? else {
            return Ok(None);
        };

        let title = self
            .repository
            .insert_title_minimal(tvdb_id, kind, &payload)
            .await?;

        self.enqueue_or_log(Job::sync_title(
            tvdb_id,
            kind,
            Some(payload),
            PRIORITY_INTERACTIVE,
        ))
        .await;

        log_debug!(
            "Minimal title row {} ready, full sync queued",
            title.tvdb_id
        );
        Ok(Some(title))
    }

    /// A failed enqueue never fails the foreground request, but it is
    /// never silent either.
    async fn enqueue_or_log(&self, job: Job) {
        let job_type = job.job_type;
        if let Err(e) = self.jobs.enqueue(job).await {
            log_warn!("Failed to enqueue {} job: {}", job_type, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::domain::entities::{TitleDetails, PersonDetails, Person};
    use crate::modules::catalog::domain::repository::MockCatalogRepository;
    use crate::modules::provider::domain::client::MockMetadataProvider;
    use crate::modules::sync::domain::entities::{JobRecord, JobType, TitleSyncPayload};
    use crate::modules::sync::domain::repository::MockJobRepository;
    use crate::shared::errors::AppError;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn title_details(tvdb_id: i32, synced_days_ago: Option<i64>) -> TitleDetails {
        TitleDetails {
            title: Title {
                id: 1,
                tvdb_id,
                kind: ContentKind::Series,
                name: "Cached Series".to_string(),
                slug: None,
                overview: None,
                year: Some(2020),
                status: None,
                image_url: None,
                original_language: None,
                original_country: None,
                last_synced_at: synced_days_ago.map(|d| Utc::now() - Duration::days(d)),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                extra_metadata: None,
            },
            series_detail: None,
            movie_detail: None,
            genres: vec![],
            credits: vec![],
            aliases: vec![],
        }
    }

    fn job_record(job: Job) -> JobRecord {
        JobRecord {
            id: Uuid::new_v4(),
            job_type: job.job_type.to_string(),
            payload: job.payload,
            priority: job.priority,
            status: "pending".to_string(),
            attempts: 0,
            max_attempts: 3,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    fn service(
        repository: MockCatalogRepository,
        provider: MockMetadataProvider,
        jobs: MockJobRepository,
    ) -> CatalogService {
        CatalogService::new(Arc::new(repository), Arc::new(provider), Arc::new(jobs))
    }

    #[tokio::test]
    async fn fresh_title_is_served_without_provider_or_queue() {
        let mut repository = MockCatalogRepository::new();
        repository
            .expect_find_title_details()
            .returning(|id, _| Ok(Some(title_details(id, Some(1)))));

        // No expectations on provider or queue: any call would panic.
        let service = service(repository, MockMetadataProvider::new(), MockJobRepository::new());

        let payload = service
            .resolve_title(121361, ContentKind::Series)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(payload.id, Some(121361));
        assert_eq!(payload.name.as_deref(), Some("Cached Series"));
    }

    #[tokio::test]
    async fn stale_title_returns_live_data_and_enqueues_payload() {
        let mut repository = MockCatalogRepository::new();
        repository
            .expect_find_title_details()
            .returning(|id, _| Ok(Some(title_details(id, Some(30)))));

        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_title_details().returning(|id, _| {
            Ok(Some(TitlePayload {
                id: Some(id),
                name: Some("Live Series".to_string()),
                ..Default::default()
            }))
        });

        let mut jobs = MockJobRepository::new();
        jobs.expect_enqueue()
            .withf(|job| {
                let parsed: TitleSyncPayload = serde_json::from_value(job.payload.clone()).unwrap();
                job.job_type == JobType::SyncTitle
                    && parsed.tvdb_id == 121361
                    && parsed.payload.is_some()
            })
            .times(1)
            .returning(|job| Ok(job_record(job)));

        let service = service(repository, provider, jobs);

        let payload = service
            .resolve_title(121361, ContentKind::Series)
            .await
            .unwrap()
            .unwrap();

        // Caller sees the live record, not the stale cached one
        assert_eq!(payload.name.as_deref(), Some("Live Series"));
    }

    #[tokio::test]
    async fn provider_miss_returns_none_without_enqueue() {
        let mut repository = MockCatalogRepository::new();
        repository
            .expect_find_title_details()
            .returning(|_, _| Ok(None));

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_title_details()
            .returning(|_, _| Ok(None));

        let service = service(repository, provider, MockJobRepository::new());

        let result = service
            .resolve_title(999999, ContentKind::Series)
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn provider_error_serves_stale_cache() {
        let mut repository = MockCatalogRepository::new();
        repository
            .expect_find_title_details()
            .returning(|id, _| Ok(Some(title_details(id, Some(30)))));

        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_title_details().returning(|_, _| {
            Err(AppError::ExternalServiceError("TVDB down".to_string()))
        });

        let mut jobs = MockJobRepository::new();
        jobs.expect_enqueue()
            .withf(|job| {
                let parsed: TitleSyncPayload = serde_json::from_value(job.payload.clone()).unwrap();
                parsed.payload.is_none()
            })
            .times(1)
            .returning(|job| Ok(job_record(job)));

        let service = service(repository, provider, jobs);

        let payload = service
            .resolve_title(121361, ContentKind::Series)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(payload.name.as_deref(), Some("Cached Series"));
    }

    #[tokio::test]
    async fn enqueue_failure_does_not_fail_the_read() {
        let mut repository = MockCatalogRepository::new();
        repository
            .expect_find_title_details()
            .returning(|_, _| Ok(None));

        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_title_details().returning(|id, _| {
            Ok(Some(TitlePayload {
                id: Some(id),
                name: Some("Live Series".to_string()),
                ..Default::default()
            }))
        });

        let mut jobs = MockJobRepository::new();
        jobs.expect_enqueue()
            .returning(|_| Err(AppError::DatabaseError("queue unavailable".to_string())));

        let service = service(repository, provider, jobs);

        let payload = service
            .resolve_title(121361, ContentKind::Series)
            .await
            .unwrap();

        assert!(payload.is_some());
    }

    #[tokio::test]
    async fn fresh_person_is_served_from_cache() {
        let mut repository = MockCatalogRepository::new();
        repository.expect_find_person_details().returning(|id| {
            Ok(Some(PersonDetails {
                person: Person {
                    id: 1,
                    tvdb_id: id,
                    full_name: "Kit Harington".to_string(),
                    biography: None,
                    image_url: None,
                    // 10 days: stale for titles, fresh for people
                    last_synced_at: Some(Utc::now() - Duration::days(10)),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    extra_metadata: None,
                },
                aliases: vec![],
                credits: vec![],
            }))
        });

        let service = service(repository, MockMetadataProvider::new(), MockJobRepository::new());

        let payload = service.resolve_person(367214).await.unwrap().unwrap();
        assert_eq!(payload.name.as_deref(), Some("Kit Harington"));
    }

    #[tokio::test]
    async fn ensure_title_minimal_inserts_and_enqueues_full_sync() {
        let mut repository = MockCatalogRepository::new();
        repository.expect_find_title().returning(|_, _| Ok(None));
        repository
            .expect_insert_title_minimal()
            .withf(|id, kind, payload| {
                *id == 121361
                    && *kind == ContentKind::Series
                    && payload.name.as_deref() == Some("Live Series")
            })
            .times(1)
            .returning(|id, kind, payload| {
                Ok(Title {
                    id: 7,
                    tvdb_id: id,
                    kind,
                    name: payload.name.clone().unwrap(),
                    slug: None,
                    overview: None,
                    year: None,
                    status: None,
                    image_url: None,
                    original_language: None,
                    original_country: None,
                    last_synced_at: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    extra_metadata: None,
                })
            });

        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_title_details().returning(|id, _| {
            Ok(Some(TitlePayload {
                id: Some(id),
                name: Some("Live Series".to_string()),
                ..Default::default()
            }))
        });

        let mut jobs = MockJobRepository::new();
        jobs.expect_enqueue()
            .times(1)
            .returning(|job| Ok(job_record(job)));

        let service = service(repository, provider, jobs);

        let title = service
            .ensure_title_minimal(121361, ContentKind::Series)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(title.tvdb_id, 121361);
        assert!(title.last_synced_at.is_none());
    }
}
