//! Background workers for the synchronization pipeline.
//!
//! Each worker polls the queue, applies the courtesy jitter, fetches any
//! missing provider payloads and drives the merge engine, recording every
//! attempt in the audit log. A provider not-found is terminal: the job is
//! abandoned instead of retried, because "missing" is not transient.

use crate::modules::provider::domain::client::MetadataProvider;
use crate::modules::sync::audit::{SyncAuditLog, SyncEntityKind};
use crate::modules::sync::domain::entities::{JobRecord, JobType};
use crate::modules::sync::domain::repository::JobRepository;
use crate::modules::sync::merge::GraphMergeEngine;
use crate::shared::domain::ContentKind;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::SyncConfig;
use crate::{log_debug, log_error, log_info, log_warn};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How one job ended, beyond plain success/error.
enum JobOutcome {
    Success,
    /// Provider has no such entity; never retried.
    NotFound(String),
}

pub struct SyncWorker {
    jobs: Arc<dyn JobRepository>,
    provider: Arc<dyn MetadataProvider>,
    merge: Arc<GraphMergeEngine>,
    audit: Arc<SyncAuditLog>,
    config: SyncConfig,
    is_running: Arc<tokio::sync::RwLock<bool>>,
}

impl SyncWorker {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        provider: Arc<dyn MetadataProvider>,
        merge: Arc<GraphMergeEngine>,
        audit: Arc<SyncAuditLog>,
        config: SyncConfig,
    ) -> Self {
        Self {
            jobs,
            provider,
            merge,
            audit,
            config,
            is_running: Arc::new(tokio::sync::RwLock::new(false)),
        }
    }

    /// Worker loop. Run with tokio::spawn; call `stop` to end it.
    pub async fn run(self: Arc<Self>) {
        log_info!("Sync worker started");

        {
            let mut running = self.is_running.write().await;
            *running = true;
        }

        loop {
            {
                let running = self.is_running.read().await;
                if !*running {
                    log_info!("Sync worker stopped");
                    break;
                }
            }

            match self.process_next_job().await {
                Ok(processed) => {
                    if !processed {
                        tokio::time::sleep(self.config.poll_interval).await;
                    }
                    // A processed job means the queue may hold more; poll
                    // again immediately.
                }
                Err(e) => {
                    log_error!("Error in worker loop: {}", e);
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    pub async fn stop(&self) {
        let mut running = self.is_running.write().await;
        *running = false;
        log_info!("Sync worker stop requested");
    }

    /// Process the next job in the queue.
    ///
    /// Returns true if a job was processed, false if the queue was empty.
    async fn process_next_job(&self) -> AppResult<bool> {
        let job = match self.jobs.dequeue().await? {
            Some(job) => job,
            None => return Ok(false),
        };

        log_info!(
            "Processing job {} (type: {}, attempts: {}/{})",
            job.id,
            job.job_type,
            job.attempts,
            job.max_attempts
        );

        // Spread the work out instead of hammering the provider the moment
        // jobs land. Skippable so tests don't sit idle.
        if let Some(range) = &self.config.jitter_secs {
            let jitter = rand::thread_rng().gen_range(range.clone());
            log_debug!("Job {} sleeping {}s jitter", job.id, jitter);
            tokio::time::sleep(Duration::from_secs(jitter)).await;
        }

        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.config.hard_time_limit, self.execute_job(&job))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "Job {} exceeded hard time limit of {}s",
                job.id,
                self.config.hard_time_limit.as_secs()
            ))),
        };

        if started.elapsed() > self.config.soft_time_limit {
            log_warn!(
                "Job {} ran {}s, over the soft time limit",
                job.id,
                started.elapsed().as_secs()
            );
        }

        match outcome {
            Ok(JobOutcome::Success) => {
                self.jobs.mark_completed(job.id).await?;
                log_info!("Job {} completed successfully", job.id);
            }
            Ok(JobOutcome::NotFound(reason)) => {
                // Terminal: retrying a not-found would just re-ask the same
                // question.
                self.jobs.mark_abandoned(job.id, &reason).await?;
                log_info!("Job {} abandoned: {}", job.id, reason);
            }
            Err(e) => {
                let error_msg = format!("{}", e);
                log_warn!("Job {} failed: {}", job.id, error_msg);

                if job.can_retry() {
                    log_info!(
                        "Job {} will be retried (attempt {}/{})",
                        job.id,
                        job.attempts,
                        job.max_attempts
                    );
                } else {
                    log_error!(
                        "Job {} failed permanently after {} attempts",
                        job.id,
                        job.attempts
                    );
                }
                self.jobs.mark_failed(job.id, &error_msg).await?;
            }
        }

        Ok(true)
    }

    async fn execute_job(&self, job: &JobRecord) -> AppResult<JobOutcome> {
        match job.parse_job_type() {
            Ok(JobType::SyncTitle) => self.handle_title_sync(job).await,
            Ok(JobType::SyncPerson) => self.handle_person_sync(job).await,
            Err(e) => Err(AppError::ValidationError(format!(
                "Invalid job type: {}",
                e
            ))),
        }
    }

    async fn handle_title_sync(&self, job: &JobRecord) -> AppResult<JobOutcome> {
        let sync = job.parse_title_payload().map_err(|e| {
            AppError::ValidationError(format!("Invalid title sync payload: {}", e))
        })?;
        let started = Instant::now();

        // The resolver ships the payload it already fetched; a sweep job
        // arrives empty and the worker fetches its own.
        let payload = match sync.payload {
            Some(payload) => payload,
            None => match self
                .provider
                .fetch_title_details(sync.tvdb_id, sync.kind)
                .await?
            {
                Some(payload) => payload,
                None => {
                    let reason = format!("{} {} not found in provider", sync.kind, sync.tvdb_id);
                    self.record_failure(SyncEntityKind::Content, sync.tvdb_id, &reason)
                        .await;
                    return Ok(JobOutcome::NotFound(reason));
                }
            },
        };

        let episodes = match sync.kind {
            ContentKind::Series => self.provider.fetch_episodes(sync.tvdb_id).await?,
            ContentKind::Movie => Vec::new(),
        };

        match self
            .merge
            .save_title_full(sync.tvdb_id, sync.kind, payload, episodes)
            .await
        {
            Ok(content_id) => {
                let duration_ms = started.elapsed().as_millis() as i32;
                if let Err(e) = self
                    .audit
                    .record_success(SyncEntityKind::Content, content_id, sync.tvdb_id, duration_ms)
                    .await
                {
                    log_warn!("Failed to write success audit entry: {}", e);
                }
                Ok(JobOutcome::Success)
            }
            Err(e) => {
                self.record_failure(SyncEntityKind::Content, sync.tvdb_id, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    async fn handle_person_sync(&self, job: &JobRecord) -> AppResult<JobOutcome> {
        let sync = job.parse_person_payload().map_err(|e| {
            AppError::ValidationError(format!("Invalid person sync payload: {}", e))
        })?;
        let started = Instant::now();

        let payload = match sync.payload {
            Some(payload) => payload,
            None => match self.provider.fetch_person_details(sync.tvdb_id).await? {
                Some(payload) => payload,
                None => {
                    let reason = format!("Person {} not found in provider", sync.tvdb_id);
                    self.record_failure(SyncEntityKind::Person, sync.tvdb_id, &reason)
                        .await;
                    return Ok(JobOutcome::NotFound(reason));
                }
            },
        };

        match self.merge.save_person_full(sync.tvdb_id, payload).await {
            Ok(person_id) => {
                let duration_ms = started.elapsed().as_millis() as i32;
                if let Err(e) = self
                    .audit
                    .record_success(SyncEntityKind::Person, person_id, sync.tvdb_id, duration_ms)
                    .await
                {
                    log_warn!("Failed to write success audit entry: {}", e);
                }
                Ok(JobOutcome::Success)
            }
            Err(e) => {
                self.record_failure(SyncEntityKind::Person, sync.tvdb_id, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    /// Audit writes must never mask the original failure.
    async fn record_failure(&self, entity_type: SyncEntityKind, tvdb_id: i32, error: &str) {
        if let Err(e) = self.audit.record_failure(entity_type, tvdb_id, error).await {
            log_warn!("Failed to write failure audit entry: {}", e);
        }
    }
}

/// A fixed-size pool of worker loops sharing one queue. Sized independently
/// of request concurrency.
pub struct WorkerPool {
    workers: Vec<Arc<SyncWorker>>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(
        jobs: Arc<dyn JobRepository>,
        provider: Arc<dyn MetadataProvider>,
        merge: Arc<GraphMergeEngine>,
        audit: Arc<SyncAuditLog>,
        config: SyncConfig,
    ) -> Self {
        let mut workers = Vec::with_capacity(config.worker_count);
        let mut handles = Vec::with_capacity(config.worker_count);

        for _ in 0..config.worker_count {
            let worker = Arc::new(SyncWorker::new(
                Arc::clone(&jobs),
                Arc::clone(&provider),
                Arc::clone(&merge),
                Arc::clone(&audit),
                config.clone(),
            ));
            handles.push(tokio::spawn(Arc::clone(&worker).run()));
            workers.push(worker);
        }

        log_info!("Started {} sync workers", config.worker_count);
        Self { workers, handles }
    }

    /// Signal every worker to stop and wait for the loops to wind down.
    pub async fn shutdown(self) {
        for worker in &self.workers {
            worker.stop().await;
        }
        futures::future::join_all(self.handles).await;
        log_info!("Worker pool shut down");
    }
}
