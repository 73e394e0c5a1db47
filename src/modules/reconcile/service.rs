//! Deduplication and reconciliation.
//!
//! Races between concurrent merges (and older bugs) can leave several
//! Episode rows sharing one external id, or several Season variants sharing
//! one (title, season_number). This maintenance pass collapses each group
//! onto a canonical survivor, re-points every reference held by the losers
//! and only then deletes them, one transaction per group, so a crash
//! mid-run loses nothing and a re-run finds only the remaining groups.

use std::sync::Arc;

use diesel::prelude::*;
use tokio::task;

use crate::modules::catalog::domain::value_objects::AIRED_ORDER_SEASON_TYPE_ID;
use crate::modules::catalog::infrastructure::models::{EpisodeModel, SeasonModel};
use crate::schema::{checkins, episodes, seasons};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;
use crate::{log_info, log_warn};

#[derive(QueryableByName)]
struct DuplicateEpisodeKey {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    tvdb_id: i32,
}

#[derive(QueryableByName)]
struct DuplicateSeasonKey {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    content_id: i32,
    #[diesel(sql_type = diesel::sql_types::Integer)]
    season_number: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub duplicate_episode_groups: usize,
    pub episodes_removed: usize,
    pub checkins_repointed: usize,
    pub duplicate_season_groups: usize,
    pub seasons_removed: usize,
    pub episodes_relinked: usize,
    pub failed_groups: usize,
}

impl ReconciliationReport {
    /// True when the run changed nothing, the expected result on clean data.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

pub struct ReconciliationService {
    db: Arc<Database>,
}

impl ReconciliationService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Repair both invariants. Safe to re-run and safe alongside live sync
    /// traffic; a group that fails is logged and skipped, never fatal.
    pub async fn run(&self) -> AppResult<ReconciliationReport> {
        let mut report = self.deduplicate_episodes().await?;
        let season_report = self.deduplicate_seasons().await?;

        report.duplicate_season_groups = season_report.duplicate_season_groups;
        report.seasons_removed = season_report.seasons_removed;
        report.episodes_relinked = season_report.episodes_relinked;
        report.failed_groups += season_report.failed_groups;

        log_info!(
            "Reconciliation removed {} episodes ({} check-ins re-pointed), {} seasons ({} episodes re-linked), {} groups failed",
            report.episodes_removed,
            report.checkins_repointed,
            report.seasons_removed,
            report.episodes_relinked,
            report.failed_groups
        );
        Ok(report)
    }

    /// Collapse Episode rows sharing a tvdb_id onto the oldest row,
    /// migrating check-in references first.
    async fn deduplicate_episodes(&self) -> AppResult<ReconciliationReport> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<ReconciliationReport> {
            let mut conn = db.get_connection()?;
            let mut report = ReconciliationReport::default();

            let duplicate_keys: Vec<DuplicateEpisodeKey> = diesel::sql_query(
                "SELECT tvdb_id FROM episodes GROUP BY tvdb_id HAVING COUNT(id) > 1",
            )
            .load(&mut conn)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to find duplicate episodes: {}", e))
            })?;

            report.duplicate_episode_groups = duplicate_keys.len();

            for key in duplicate_keys {
                let result = conn.transaction::<(usize, usize), AppError, _>(|conn| {
                    let rows: Vec<EpisodeModel> = episodes::table
                        .filter(episodes::tvdb_id.eq(key.tvdb_id))
                        .order(episodes::id.asc())
                        .load::<EpisodeModel>(conn)?;

                    let Some((survivor, losers)) = rows.split_first() else {
                        return Ok((0, 0));
                    };

                    let mut repointed = 0;
                    let mut removed = 0;

                    for loser in losers {
                        // Re-point strictly before delete
                        repointed += diesel::update(
                            checkins::table.filter(checkins::episode_id.eq(loser.id)),
                        )
                        .set(checkins::episode_id.eq(survivor.id))
                        .execute(conn)?;

                        removed += diesel::delete(episodes::table.find(loser.id)).execute(conn)?;
                    }

                    Ok((removed, repointed))
                });

                match result {
                    Ok((removed, repointed)) => {
                        report.episodes_removed += removed;
                        report.checkins_repointed += repointed;
                    }
                    Err(e) => {
                        log_warn!(
                            "Skipping duplicate episode group tvdb_id={}: {}",
                            key.tvdb_id,
                            e
                        );
                        report.failed_groups += 1;
                    }
                }
            }

            Ok(report)
        })
        .await?
    }

    /// Collapse Season variants sharing (content, season_number) onto the
    /// canonical row, re-linking episodes first.
    async fn deduplicate_seasons(&self) -> AppResult<ReconciliationReport> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<ReconciliationReport> {
            let mut conn = db.get_connection()?;
            let mut report = ReconciliationReport::default();

            let duplicate_keys: Vec<DuplicateSeasonKey> = diesel::sql_query(
                "SELECT content_id, season_number FROM seasons
                 GROUP BY content_id, season_number HAVING COUNT(id) > 1",
            )
            .load(&mut conn)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to find duplicate seasons: {}", e))
            })?;

            report.duplicate_season_groups = duplicate_keys.len();

            for key in duplicate_keys {
                let result = conn.transaction::<(usize, usize), AppError, _>(|conn| {
                    let rows: Vec<SeasonModel> = seasons::table
                        .filter(seasons::content_id.eq(key.content_id))
                        .filter(seasons::season_number.eq(key.season_number))
                        .order(seasons::id.asc())
                        .load::<SeasonModel>(conn)?;

                    if rows.len() <= 1 {
                        return Ok((0, 0));
                    }

                    let survivor_id = pick_season_survivor(
                        &rows
                            .iter()
                            .map(|s| (s.id, s.season_type_id))
                            .collect::<Vec<_>>(),
                    );

                    let mut relinked = 0;
                    let mut removed = 0;

                    for loser in rows.iter().filter(|s| s.id != survivor_id) {
                        relinked += diesel::update(
                            episodes::table.filter(episodes::season_id.eq(loser.id)),
                        )
                        .set(episodes::season_id.eq(survivor_id))
                        .execute(conn)?;

                        removed += diesel::delete(seasons::table.find(loser.id)).execute(conn)?;
                    }

                    Ok((removed, relinked))
                });

                match result {
                    Ok((removed, relinked)) => {
                        report.seasons_removed += removed;
                        report.episodes_relinked += relinked;
                    }
                    Err(e) => {
                        log_warn!(
                            "Skipping duplicate season group ({}, {}): {}",
                            key.content_id,
                            key.season_number,
                            e
                        );
                        report.failed_groups += 1;
                    }
                }
            }

            Ok(report)
        })
        .await?
    }
}

/// Survivor selection: the "Aired Order" variant when one exists in the
/// group, otherwise the oldest row. Candidates arrive ordered by id.
fn pick_season_survivor(candidates: &[(i32, Option<i32>)]) -> i32 {
    candidates
        .iter()
        .find(|(_, type_id)| *type_id == Some(AIRED_ORDER_SEASON_TYPE_ID))
        .or_else(|| candidates.first())
        .map(|(id, _)| *id)
        .unwrap_or_default()
}
