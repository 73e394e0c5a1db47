//! Append-only log of synchronization attempts.
//!
//! Every job writes exactly one entry: success with a duration, or failure
//! with the error text. Entries are never updated; a retention sweep purges
//! them after 30 days.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::schema::sync_logs;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

/// Retention window for audit entries.
pub const AUDIT_RETENTION_DAYS: i32 = 30;

#[derive(diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[ExistingTypePath = "crate::schema::sql_types::SyncEntityType"]
#[serde(rename_all = "lowercase")]
pub enum SyncEntityKind {
    Content,
    Person,
}

impl std::fmt::Display for SyncEntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncEntityKind::Content => write!(f, "content"),
            SyncEntityKind::Person => write!(f, "person"),
        }
    }
}

#[derive(diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[ExistingTypePath = "crate::schema::sql_types::SyncOutcome"]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcomeDb {
    Success,
    Failed,
    Partial,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = sync_logs)]
pub struct SyncLogModel {
    pub id: i32,
    pub entity_type: SyncEntityKind,
    pub entity_id: Option<i32>,
    pub tvdb_id: Option<i32>,
    pub outcome: SyncOutcomeDb,
    pub error_message: Option<String>,
    pub duration_ms: Option<i32>,
    pub synced_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = sync_logs)]
struct NewSyncLog {
    entity_type: SyncEntityKind,
    entity_id: Option<i32>,
    tvdb_id: Option<i32>,
    outcome: SyncOutcomeDb,
    error_message: Option<String>,
    duration_ms: Option<i32>,
}

pub struct SyncAuditLog {
    db: Arc<Database>,
}

impl SyncAuditLog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record a successful sync. `entity_id` is the local row the merge
    /// produced.
    pub async fn record_success(
        &self,
        entity_type: SyncEntityKind,
        entity_id: i32,
        tvdb_id: i32,
        duration_ms: i32,
    ) -> AppResult<()> {
        self.insert(NewSyncLog {
            entity_type,
            entity_id: Some(entity_id),
            tvdb_id: Some(tvdb_id),
            outcome: SyncOutcomeDb::Success,
            error_message: None,
            duration_ms: Some(duration_ms),
        })
        .await
    }

    /// Record a failed sync. No local row may exist yet, so only the
    /// external id is required.
    pub async fn record_failure(
        &self,
        entity_type: SyncEntityKind,
        tvdb_id: i32,
        error: &str,
    ) -> AppResult<()> {
        self.insert(NewSyncLog {
            entity_type,
            entity_id: None,
            tvdb_id: Some(tvdb_id),
            outcome: SyncOutcomeDb::Failed,
            error_message: Some(error.to_string()),
            duration_ms: None,
        })
        .await
    }

    /// Delete entries older than the given retention window.
    pub async fn purge_older_than(&self, days: i32) -> AppResult<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<usize> {
            let mut conn = db.get_connection()?;

            let deleted = diesel::sql_query(
                "DELETE FROM sync_logs WHERE synced_at < NOW() - INTERVAL '1 day' * $1",
            )
            .bind::<diesel::sql_types::Integer, _>(days)
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to purge sync logs: {}", e)))?;

            Ok(deleted)
        })
        .await?
    }

    /// Latest entries for one external id, newest first.
    pub async fn entries_for_tvdb(&self, tvdb_id: i32) -> AppResult<Vec<SyncLogModel>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<SyncLogModel>> {
            let mut conn = db.get_connection()?;

            let rows = sync_logs::table
                .filter(sync_logs::tvdb_id.eq(tvdb_id))
                .order(sync_logs::synced_at.desc())
                .load::<SyncLogModel>(&mut conn)?;

            Ok(rows)
        })
        .await?
    }

    async fn insert(&self, entry: NewSyncLog) -> AppResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;

            diesel::insert_into(sync_logs::table)
                .values(&entry)
                .execute(&mut conn)
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to write sync log: {}", e))
                })?;

            Ok(())
        })
        .await?
    }
}
