/// Repository trait for job persistence.
///
/// The implementation uses Diesel with PostgreSQL; dequeue relies on
/// SELECT FOR UPDATE SKIP LOCKED so multiple workers never grab the same
/// job.
use crate::modules::sync::domain::entities::{Job, JobRecord};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Enqueue a new job
    async fn enqueue(&self, job: Job) -> AppResult<JobRecord>;

    /// Atomically claim the next pending job; None when the queue is empty.
    async fn dequeue(&self) -> AppResult<Option<JobRecord>>;

    /// Mark job as completed
    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()>;

    /// Mark job as failed; resets to pending while attempts remain,
    /// otherwise the failure is final.
    async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()>;

    /// Fail the job permanently regardless of remaining attempts.
    /// Used for terminal outcomes such as a provider not-found.
    async fn mark_abandoned(&self, job_id: Uuid, error: &str) -> AppResult<()>;

    /// Get job by ID
    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>>;

    /// Get all pending jobs (for monitoring)
    async fn get_pending_jobs(&self) -> AppResult<Vec<JobRecord>>;

    /// Delete completed/failed jobs older than the given number of days.
    async fn delete_old_completed(&self, days: i32) -> AppResult<usize>;

    /// Get job statistics
    async fn get_statistics(&self) -> AppResult<JobStatistics>;
}

/// Job queue statistics
#[derive(Debug, Clone)]
pub struct JobStatistics {
    pub pending_count: i64,
    pub running_count: i64,
    pub completed_count: i64,
    pub failed_count: i64,
    pub total_count: i64,
}
