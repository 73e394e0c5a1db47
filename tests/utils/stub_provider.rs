/// Canned metadata provider for integration tests.
///
/// Responses are fixed maps; call counts are tracked so tests can assert
/// how often the provider was actually consulted.
use async_trait::async_trait;
use bingelog::modules::provider::{
    EpisodePayload, MetadataProvider, PersonPayload, SearchResult, TitlePayload,
};
use bingelog::shared::domain::ContentKind;
use bingelog::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct StubProvider {
    titles: Mutex<HashMap<(i32, ContentKind), TitlePayload>>,
    episodes: Mutex<HashMap<i32, Vec<EpisodePayload>>>,
    people: Mutex<HashMap<i32, PersonPayload>>,
    search_results: Mutex<Vec<SearchResult>>,
    pub title_fetches: AtomicUsize,
    pub fail_transiently: std::sync::atomic::AtomicBool,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(self, tvdb_id: i32, kind: ContentKind, payload: TitlePayload) -> Self {
        self.titles.lock().unwrap().insert((tvdb_id, kind), payload);
        self
    }

    pub fn with_episodes(self, series_tvdb_id: i32, episodes: Vec<EpisodePayload>) -> Self {
        self.episodes.lock().unwrap().insert(series_tvdb_id, episodes);
        self
    }

    pub fn with_person(self, tvdb_id: i32, payload: PersonPayload) -> Self {
        self.people.lock().unwrap().insert(tvdb_id, payload);
        self
    }

    pub fn with_search_results(self, results: Vec<SearchResult>) -> Self {
        *self.search_results.lock().unwrap() = results;
        self
    }

    fn check_transient_failure(&self) -> AppResult<()> {
        if self.fail_transiently.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError(
                "stubbed outage".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for StubProvider {
    async fn search(
        &self,
        _query: &str,
        limit: usize,
        offset: usize,
    ) -> AppResult<Vec<SearchResult>> {
        self.check_transient_failure()?;
        let results = self.search_results.lock().unwrap();
        Ok(results.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn fetch_title_details(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
    ) -> AppResult<Option<TitlePayload>> {
        self.check_transient_failure()?;
        self.title_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.titles.lock().unwrap().get(&(tvdb_id, kind)).cloned())
    }

    async fn fetch_episodes(&self, series_tvdb_id: i32) -> AppResult<Vec<EpisodePayload>> {
        self.check_transient_failure()?;
        Ok(self
            .episodes
            .lock()
            .unwrap()
            .get(&series_tvdb_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_person_details(&self, tvdb_id: i32) -> AppResult<Option<PersonPayload>> {
        self.check_transient_failure()?;
        Ok(self.people.lock().unwrap().get(&tvdb_id).cloned())
    }
}
