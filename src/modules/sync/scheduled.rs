//! Scheduled maintenance entry points.
//!
//! Invoked by an external scheduler, not by user traffic. The stale sweep
//! is what turns "serve stale, refresh later" into eventually-fresh data
//! even for entities nobody is actively requesting.

use std::sync::Arc;

use chrono::{Duration, Utc};
use diesel::prelude::*;
use tokio::task;

use crate::modules::sync::audit::{SyncAuditLog, AUDIT_RETENTION_DAYS};
use crate::modules::sync::domain::entities::{Job, PRIORITY_SCHEDULED};
use crate::modules::sync::domain::repository::JobRepository;
use crate::modules::sync::freshness::{PERSON_SYNC_THRESHOLD_DAYS, TITLE_SYNC_THRESHOLD_DAYS};
use crate::schema::{content, people};
use crate::shared::domain::ContentKind;
use crate::shared::errors::AppResult;
use crate::shared::Database;
use crate::{log_info, log_warn};

/// Upper bound on how many refresh jobs one sweep run may queue.
pub const SWEEP_BATCH_LIMIT: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub scanned: usize,
    pub queued: usize,
}

pub struct MaintenanceService {
    db: Arc<Database>,
    jobs: Arc<dyn JobRepository>,
    audit: Arc<SyncAuditLog>,
}

impl MaintenanceService {
    pub fn new(db: Arc<Database>, jobs: Arc<dyn JobRepository>, audit: Arc<SyncAuditLog>) -> Self {
        Self { db, jobs, audit }
    }

    /// Queue refresh jobs for titles that were never synced or have aged
    /// past the threshold. Oldest first, at most one batch per run.
    pub async fn sweep_stale_titles(&self) -> AppResult<SweepReport> {
        let db = Arc::clone(&self.db);
        let threshold = Utc::now() - Duration::days(TITLE_SYNC_THRESHOLD_DAYS);

        let stale: Vec<(i32, ContentKind)> =
            task::spawn_blocking(move || -> AppResult<Vec<(i32, ContentKind)>> {
                let mut conn = db.get_connection()?;

                let rows = content::table
                    .filter(
                        content::last_synced_at
                            .is_null()
                            .or(content::last_synced_at.lt(threshold)),
                    )
                    .order(content::last_synced_at.asc().nulls_first())
                    .limit(SWEEP_BATCH_LIMIT)
                    .select((content::tvdb_id, content::content_type))
                    .load::<(i32, ContentKind)>(&mut conn)?;

                Ok(rows)
            })
            .await??;

        let mut report = SweepReport {
            scanned: stale.len(),
            ..Default::default()
        };

        for (tvdb_id, kind) in stale {
            // Sweep jobs carry no payload; the worker fetches its own.
            match self
                .jobs
                .enqueue(Job::sync_title(tvdb_id, kind, None, PRIORITY_SCHEDULED))
                .await
            {
                Ok(_) => report.queued += 1,
                Err(e) => log_warn!("Failed to queue refresh for {} {}: {}", kind, tvdb_id, e),
            }
        }

        log_info!(
            "Stale title sweep queued {}/{} refresh jobs",
            report.queued,
            report.scanned
        );
        Ok(report)
    }

    /// Same sweep for people, on their longer threshold. Also picks up the
    /// stubs credit merges leave behind with a NULL `last_synced_at`.
    pub async fn sweep_stale_people(&self) -> AppResult<SweepReport> {
        let db = Arc::clone(&self.db);
        let threshold = Utc::now() - Duration::days(PERSON_SYNC_THRESHOLD_DAYS);

        let stale: Vec<i32> = task::spawn_blocking(move || -> AppResult<Vec<i32>> {
            let mut conn = db.get_connection()?;

            let rows = people::table
                .filter(
                    people::last_synced_at
                        .is_null()
                        .or(people::last_synced_at.lt(threshold)),
                )
                .order(people::last_synced_at.asc().nulls_first())
                .limit(SWEEP_BATCH_LIMIT)
                .select(people::tvdb_id)
                .load::<i32>(&mut conn)?;

            Ok(rows)
        })
        .await??;

        let mut report = SweepReport {
            scanned: stale.len(),
            ..Default::default()
        };

        for tvdb_id in stale {
            match self
                .jobs
                .enqueue(Job::sync_person(tvdb_id, None, PRIORITY_SCHEDULED))
                .await
            {
                Ok(_) => report.queued += 1,
                Err(e) => log_warn!("Failed to queue refresh for person {}: {}", tvdb_id, e),
            }
        }

        log_info!(
            "Stale people sweep queued {}/{} refresh jobs",
            report.queued,
            report.scanned
        );
        Ok(report)
    }

    /// Drop audit entries and finished jobs past the retention window.
    pub async fn purge_old_records(&self) -> AppResult<usize> {
        let purged_logs = self.audit.purge_older_than(AUDIT_RETENTION_DAYS).await?;
        let purged_jobs = self.jobs.delete_old_completed(AUDIT_RETENTION_DAYS).await?;

        log_info!(
            "Purged {} sync log entries and {} finished jobs",
            purged_logs,
            purged_jobs
        );
        Ok(purged_logs + purged_jobs)
    }
}
