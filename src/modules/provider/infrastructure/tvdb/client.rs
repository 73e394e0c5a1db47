use crate::modules::provider::domain::client::MetadataProvider;
use crate::modules::provider::domain::payload::{
    EpisodePayload, PersonPayload, SearchResult, TitlePayload,
};
use crate::shared::domain::ContentKind;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_warn};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::RwLock;

const BASE_URL: &str = "https://api4.thetvdb.com/v4";
/// Episode pages are 500 entries each; no real series needs more than this.
const MAX_EPISODE_PAGES: u32 = 20;

#[derive(Deserialize)]
struct Envelope {
    data: Option<Value>,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
}

/// TVDB v4 API client.
///
/// Authenticates with api key + subscriber pin, caches the bearer token and
/// re-logs in once on 401. Every call passes through the rate limiter; TVDB
/// tolerates bursts but throttles sustained traffic.
pub struct TvdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    pin: Option<String>,
    token: RwLock<Option<String>>,
    rate_limiter: DefaultDirectRateLimiter,
}

impl TvdbClient {
    pub fn new(api_key: String, pin: Option<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("bingelog/1.0")
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;

        let quota = Quota::with_period(Duration::from_millis(250))
            .expect("non-zero period")
            .allow_burst(NonZeroU32::new(4).expect("non-zero burst"));

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key,
            pin,
            token: RwLock::new(None),
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    pub fn from_env() -> AppResult<Self> {
        let api_key = env::var("TVDB_API_KEY").map_err(|_| {
            AppError::ValidationError("TVDB_API_KEY environment variable not found".to_string())
        })?;
        let pin = env::var("TVDB_PIN").ok();
        Self::new(api_key, pin)
    }

    async fn login(&self) -> AppResult<String> {
        let mut body = serde_json::json!({ "apikey": self.api_key });
        if let Some(pin) = &self.pin {
            body["pin"] = Value::String(pin.clone());
        }

        let response = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("TVDB login failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "TVDB login rejected with status {}",
                response.status()
            )));
        }

        let envelope = response
            .json::<Envelope>()
            .await
            .map_err(|e| AppError::ApiError(format!("Failed to parse TVDB login response: {}", e)))?;

        let login: LoginData = envelope
            .data
            .ok_or_else(|| AppError::ApiError("TVDB login response missing data".to_string()))
            .and_then(|d| serde_json::from_value(d).map_err(AppError::from))?;

        let mut token = self.token.write().await;
        *token = Some(login.token.clone());
        Ok(login.token)
    }

    async fn bearer_token(&self) -> AppResult<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.login().await
    }

    /// GET a v4 endpoint and unwrap the `data` envelope.
    /// Returns Ok(None) on 404; the caller decides what absence means.
    async fn get_data(&self, path: &str, query: &[(&str, String)]) -> AppResult<Option<Value>> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(250)))
            .await;

        let url = format!("{}{}", self.base_url, path);
        let mut token = self.bearer_token().await?;

        for attempt in 0..2 {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(query)
                .send()
                .await
                .map_err(|e| AppError::ApiError(format!("TVDB request failed: {}", e)))?;

            match response.status() {
                StatusCode::OK => {
                    let envelope = response.json::<Envelope>().await.map_err(|e| {
                        AppError::ApiError(format!("Failed to parse TVDB response: {}", e))
                    })?;
                    return Ok(envelope.data);
                }
                StatusCode::NOT_FOUND => return Ok(None),
                // Token expired: refresh once and retry
                StatusCode::UNAUTHORIZED if attempt == 0 => {
                    log_debug!("TVDB token rejected, re-authenticating");
                    token = self.login().await?;
                }
                status => return Err(Self::status_error(status)),
            }
        }

        Err(AppError::Unauthorized(
            "TVDB rejected credentials after re-login".to_string(),
        ))
    }

    fn status_error(status: StatusCode) -> AppError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                AppError::RateLimitError("TVDB rate limit exceeded".to_string())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                AppError::Unauthorized("TVDB rejected credentials".to_string())
            }
            StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE => {
                AppError::ExternalServiceError("TVDB service unavailable".to_string())
            }
            _ => AppError::ApiError(format!("Unexpected status code: {}", status)),
        }
    }
}

#[async_trait]
impl MetadataProvider for TvdbClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> AppResult<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Search query cannot be empty".to_string(),
            ));
        }

        let params = [
            ("query", query.trim().to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];

        let data = self.get_data("/search", &params).await?;

        let Some(Value::Array(items)) = data else {
            return Ok(Vec::new());
        };

        let results = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<SearchResult>(item) {
                Ok(result) => Some(result),
                Err(e) => {
                    log_warn!("Skipping unparseable TVDB search result: {}", e);
                    None
                }
            })
            .collect();

        Ok(results)
    }

    async fn fetch_title_details(
        &self,
        tvdb_id: i32,
        kind: ContentKind,
    ) -> AppResult<Option<TitlePayload>> {
        let path = match kind {
            ContentKind::Series => format!("/series/{}/extended", tvdb_id),
            ContentKind::Movie => format!("/movies/{}/extended", tvdb_id),
        };

        let Some(data) = self.get_data(&path, &[]).await? else {
            return Ok(None);
        };

        let payload = TitlePayload::from_value(data)
            .map_err(|e| AppError::ApiError(format!("Failed to parse TVDB {} record: {}", kind, e)))?;

        Ok(Some(payload))
    }

    async fn fetch_episodes(&self, series_tvdb_id: i32) -> AppResult<Vec<EpisodePayload>> {
        let path = format!("/series/{}/episodes/default", series_tvdb_id);
        let mut episodes = Vec::new();

        for page in 0..MAX_EPISODE_PAGES {
            let data = self
                .get_data(&path, &[("page", page.to_string())])
                .await?;

            let page_episodes = data
                .as_ref()
                .and_then(|d| d.get("episodes"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            if page_episodes.is_empty() {
                break;
            }

            for item in page_episodes {
                match serde_json::from_value::<EpisodePayload>(item) {
                    Ok(episode) => episodes.push(episode),
                    Err(e) => log_warn!(
                        "Skipping unparseable episode for series {}: {}",
                        series_tvdb_id,
                        e
                    ),
                }
            }
        }

        log_debug!(
            "Fetched {} episodes for series {}",
            episodes.len(),
            series_tvdb_id
        );
        Ok(episodes)
    }

    async fn fetch_person_details(&self, tvdb_id: i32) -> AppResult<Option<PersonPayload>> {
        let path = format!("/people/{}/extended", tvdb_id);

        let Some(data) = self.get_data(&path, &[]).await? else {
            return Ok(None);
        };

        let payload = PersonPayload::from_value(data)
            .map_err(|e| AppError::ApiError(format!("Failed to parse TVDB person record: {}", e)))?;

        Ok(Some(payload))
    }
}
