/// Diesel-based implementation of JobRepository
///
/// Uses PostgreSQL with SELECT FOR UPDATE SKIP LOCKED for atomic job
/// dequeuing, so any number of workers can share one queue.
use crate::modules::sync::domain::entities::{Job, JobRecord};
use crate::modules::sync::domain::repository::{JobRepository, JobStatistics};
use crate::modules::sync::domain::value_objects::JobStatusDb;
use crate::modules::sync::infrastructure::models::{BackgroundJobModel, NewJob};
use crate::schema::background_jobs;
use crate::shared::database::DbPool;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use diesel::prelude::*;
use tokio::task;
use uuid::Uuid;

/// Helper struct for COUNT queries
#[derive(QueryableByName)]
struct CountResult {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

pub struct JobRepositoryImpl {
    pool: DbPool,
}

impl JobRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn count_with_status(conn: &mut PgConnection, status: Option<&str>) -> AppResult<i64> {
        let result: CountResult = match status {
            Some(status) => diesel::sql_query(
                "SELECT COUNT(*) as count FROM background_jobs WHERE status = $1::job_status",
            )
            .bind::<diesel::sql_types::Text, _>(status)
            .get_result(conn),
            None => diesel::sql_query("SELECT COUNT(*) as count FROM background_jobs")
                .get_result(conn),
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to count jobs: {}", e)))?;

        Ok(result.count)
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn enqueue(&self, job: Job) -> AppResult<JobRecord> {
        let pool = self.pool.clone();
        let new_job = NewJob {
            job_type: job.job_type.to_string(),
            payload: job.payload,
            priority: job.priority,
        };

        task::spawn_blocking(move || -> AppResult<JobRecord> {
            let mut conn = pool.get()?;

            let inserted: BackgroundJobModel = diesel::insert_into(background_jobs::table)
                .values(&new_job)
                .get_result(&mut conn)
                .map_err(|e| AppError::DatabaseError(format!("Failed to enqueue job: {}", e)))?;

            Ok(inserted.to_job_record())
        })
        .await?
    }

    async fn dequeue(&self) -> AppResult<Option<JobRecord>> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<Option<JobRecord>> {
            let mut conn = pool.get()?;

            // Atomic dequeue: SKIP LOCKED keeps concurrent workers from
            // claiming the same row.
            let result: Option<BackgroundJobModel> = diesel::sql_query(
                r#"
                UPDATE background_jobs
                SET status = 'running',
                    started_at = NOW(),
                    attempts = attempts + 1
                WHERE id = (
                    SELECT id
                    FROM background_jobs
                    WHERE status = 'pending'
                      AND attempts < max_attempts
                    ORDER BY priority ASC, created_at ASC
                    LIMIT 1
                    FOR UPDATE SKIP LOCKED
                )
                RETURNING id, job_type, payload, priority, status,
                          attempts, max_attempts, created_at,
                          started_at, completed_at, error
                "#,
            )
            .get_result(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to dequeue job: {}", e)))?;

            Ok(result.map(|job| job.to_job_record()))
        })
        .await?
    }

    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = pool.get()?;

            diesel::sql_query(
                "UPDATE background_jobs
                 SET status = 'completed', completed_at = NOW()
                 WHERE id = $1",
            )
            .bind::<diesel::sql_types::Uuid, _>(job_id)
            .execute(&mut conn)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to mark job as completed: {}", e))
            })?;

            Ok(())
        })
        .await?
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        let pool = self.pool.clone();
        let error = error.to_string();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = pool.get()?;

            // Reset to pending while attempts remain; final failure otherwise
            diesel::sql_query(
                "UPDATE background_jobs
                 SET status = CASE
                     WHEN attempts < max_attempts THEN 'pending'::job_status
                     ELSE 'failed'::job_status
                 END,
                 completed_at = CASE
                     WHEN attempts >= max_attempts THEN NOW()
                     ELSE NULL
                 END,
                 started_at = NULL,
                 error = $2
                 WHERE id = $1",
            )
            .bind::<diesel::sql_types::Uuid, _>(job_id)
            .bind::<diesel::sql_types::Text, _>(&error)
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to mark job as failed: {}", e)))?;

            Ok(())
        })
        .await?
    }

    async fn mark_abandoned(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        let pool = self.pool.clone();
        let error = error.to_string();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = pool.get()?;

            diesel::sql_query(
                "UPDATE background_jobs
                 SET status = 'failed', completed_at = NOW(), error = $2
                 WHERE id = $1",
            )
            .bind::<diesel::sql_types::Uuid, _>(job_id)
            .bind::<diesel::sql_types::Text, _>(&error)
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to abandon job: {}", e)))?;

            Ok(())
        })
        .await?
    }

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<Option<JobRecord>> {
            let mut conn = pool.get()?;

            let job: Option<BackgroundJobModel> = background_jobs::table
                .find(job_id)
                .first(&mut conn)
                .optional()
                .map_err(|e| AppError::DatabaseError(format!("Failed to get job by id: {}", e)))?;

            Ok(job.map(|j| j.to_job_record()))
        })
        .await?
    }

    async fn get_pending_jobs(&self) -> AppResult<Vec<JobRecord>> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<Vec<JobRecord>> {
            let mut conn = pool.get()?;

            let jobs: Vec<BackgroundJobModel> = background_jobs::table
                .filter(background_jobs::status.eq(JobStatusDb::Pending))
                .order((
                    background_jobs::priority.asc(),
                    background_jobs::created_at.asc(),
                ))
                .load(&mut conn)
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to get pending jobs: {}", e))
                })?;

            Ok(jobs.into_iter().map(|j| j.to_job_record()).collect())
        })
        .await?
    }

    async fn delete_old_completed(&self, days: i32) -> AppResult<usize> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<usize> {
            let mut conn = pool.get()?;

            let deleted = diesel::sql_query(
                "DELETE FROM background_jobs
                 WHERE status IN ('completed', 'failed')
                 AND completed_at < NOW() - INTERVAL '1 day' * $1",
            )
            .bind::<diesel::sql_types::Integer, _>(days)
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete old jobs: {}", e)))?;

            Ok(deleted)
        })
        .await?
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<JobStatistics> {
            let mut conn = pool.get()?;

            Ok(JobStatistics {
                pending_count: Self::count_with_status(&mut conn, Some("pending"))?,
                running_count: Self::count_with_status(&mut conn, Some("running"))?,
                completed_count: Self::count_with_status(&mut conn, Some("completed"))?,
                failed_count: Self::count_with_status(&mut conn, Some("failed"))?,
                total_count: Self::count_with_status(&mut conn, None)?,
            })
        })
        .await?
    }
}
