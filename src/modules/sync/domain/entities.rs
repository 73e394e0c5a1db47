/// Domain entities for the background synchronization queue.
///
/// A job carries everything needed to refresh one title or person,
/// optionally including a pre-fetched provider payload so the worker can
/// skip a second round trip.
use crate::modules::provider::domain::payload::{PersonPayload, TitlePayload};
use crate::shared::domain::ContentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Jobs enqueued from the foreground read path.
pub const PRIORITY_INTERACTIVE: i32 = 5;
/// Jobs enqueued by the scheduled stale sweep.
pub const PRIORITY_SCHEDULED: i32 = 8;

/// Job type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    SyncTitle,
    SyncPerson,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::SyncTitle => write!(f, "sync_title"),
            JobType::SyncPerson => write!(f, "sync_person"),
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sync_title" => Ok(JobType::SyncTitle),
            "sync_person" => Ok(JobType::SyncPerson),
            _ => Err(format!("Invalid job type: {}", s)),
        }
    }
}

/// Payload for title synchronization jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleSyncPayload {
    pub tvdb_id: i32,
    pub kind: ContentKind,
    /// Pre-fetched provider record; None means the worker fetches one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<TitlePayload>,
}

/// Payload for person synchronization jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSyncPayload {
    pub tvdb_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PersonPayload>,
}

/// New job to be queued (before insertion to database)
#[derive(Debug, Clone)]
pub struct Job {
    pub job_type: JobType,
    pub payload: serde_json::Value,
    pub priority: i32,
}

impl Job {
    pub fn sync_title(
        tvdb_id: i32,
        kind: ContentKind,
        payload: Option<TitlePayload>,
        priority: i32,
    ) -> Self {
        let payload = TitleSyncPayload {
            tvdb_id,
            kind,
            payload,
        };
        Self {
            job_type: JobType::SyncTitle,
            payload: serde_json::to_value(payload).unwrap(),
            priority,
        }
    }

    pub fn sync_person(tvdb_id: i32, payload: Option<PersonPayload>, priority: i32) -> Self {
        let payload = PersonSyncPayload { tvdb_id, payload };
        Self {
            job_type: JobType::SyncPerson,
            payload: serde_json::to_value(payload).unwrap(),
            priority,
        }
    }
}

/// Job record from database (with metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub priority: i32,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl JobRecord {
    pub fn parse_job_type(&self) -> Result<JobType, String> {
        self.job_type.parse()
    }

    /// Check if job can be retried
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    pub fn parse_title_payload(&self) -> Result<TitleSyncPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    pub fn parse_person_payload(&self) -> Result<PersonSyncPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
