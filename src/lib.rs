//! bingelog: the backend engine of a watch-tracking application.
//!
//! The catalog is a read-through cache over a slow, rate-limited metadata
//! provider (TVDB): reads are served from Postgres when fresh, from the
//! provider when not, and a background pipeline merges full nested records
//! into normalized storage. A reconciliation pass repairs unique-key
//! violations left behind by races.

pub mod modules;
pub mod schema;
pub mod shared;

use std::sync::Arc;

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use modules::catalog::domain::repository::CatalogRepository;
use modules::catalog::{CatalogRepositoryImpl, CatalogService};
use modules::provider::{MetadataProvider, TvdbClient};
use modules::reconcile::{ReconciliationReport, ReconciliationService};
use modules::sync::domain::entities::{Job, JobRecord, PRIORITY_INTERACTIVE};
use modules::sync::domain::repository::JobRepository;
use modules::sync::{
    GraphMergeEngine, JobRepositoryImpl, MaintenanceService, SyncAuditLog, WorkerPool,
};
use shared::domain::ContentKind;
use shared::errors::{AppError, AppResult};
use shared::utils::init_logger;
use shared::{Database, SyncConfig};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The engine's dependency graph, built once at process start.
///
/// Every component receives its collaborators explicitly; nothing reaches
/// for ambient global state. The embedding application (HTTP layer,
/// check-in flow, admin scripts) talks to the engine through the handles
/// held here.
pub struct EngineContext {
    pub database: Arc<Database>,
    pub provider: Arc<dyn MetadataProvider>,
    pub jobs: Arc<dyn JobRepository>,
    pub catalog: Arc<CatalogService>,
    pub merge: Arc<GraphMergeEngine>,
    pub audit: Arc<SyncAuditLog>,
    pub maintenance: Arc<MaintenanceService>,
    pub reconciliation: Arc<ReconciliationService>,
    config: SyncConfig,
}

impl EngineContext {
    /// Production wiring: env config, TVDB client, migrations applied.
    pub fn initialize(config: SyncConfig) -> AppResult<Self> {
        dotenvy::dotenv().ok();
        init_logger();

        let database = Arc::new(Database::new()?);
        Self::run_migrations(&database)?;

        let provider: Arc<dyn MetadataProvider> = Arc::new(TvdbClient::from_env()?);
        Self::with_dependencies(database, provider, config)
    }

    /// Wire the engine around pre-built leaf dependencies. Tests inject a
    /// pooled test database and a stub provider here.
    pub fn with_dependencies(
        database: Arc<Database>,
        provider: Arc<dyn MetadataProvider>,
        config: SyncConfig,
    ) -> AppResult<Self> {
        let jobs: Arc<dyn JobRepository> =
            Arc::new(JobRepositoryImpl::new(database.pool().clone()));
        let repository: Arc<dyn CatalogRepository> =
            Arc::new(CatalogRepositoryImpl::new(Arc::clone(&database)));

        let merge = Arc::new(GraphMergeEngine::new(Arc::clone(&database)));
        let audit = Arc::new(SyncAuditLog::new(Arc::clone(&database)));

        let catalog = Arc::new(CatalogService::new(
            repository,
            Arc::clone(&provider),
            Arc::clone(&jobs),
        ));

        let maintenance = Arc::new(MaintenanceService::new(
            Arc::clone(&database),
            Arc::clone(&jobs),
            Arc::clone(&audit),
        ));

        let reconciliation = Arc::new(ReconciliationService::new(Arc::clone(&database)));

        Ok(Self {
            database,
            provider,
            jobs,
            catalog,
            merge,
            audit,
            maintenance,
            reconciliation,
            config,
        })
    }

    /// Spawn the background worker pool. The returned handle owns the
    /// worker tasks; call `shutdown` on it for a clean stop.
    pub fn start_workers(&self) -> WorkerPool {
        WorkerPool::start(
            Arc::clone(&self.jobs),
            Arc::clone(&self.provider),
            Arc::clone(&self.merge),
            Arc::clone(&self.audit),
            self.config.clone(),
        )
    }

    /// Fire-and-forget refresh of one title. The returned record is the
    /// queued job; the actual work happens in the worker pool.
    pub async fn enqueue_title_sync(&self, tvdb_id: i32, kind: ContentKind) -> AppResult<JobRecord> {
        self.jobs
            .enqueue(Job::sync_title(tvdb_id, kind, None, PRIORITY_INTERACTIVE))
            .await
    }

    /// Fire-and-forget refresh of one person.
    pub async fn enqueue_person_sync(&self, tvdb_id: i32) -> AppResult<JobRecord> {
        self.jobs
            .enqueue(Job::sync_person(tvdb_id, None, PRIORITY_INTERACTIVE))
            .await
    }

    /// Maintenance: collapse duplicate episodes and season variants.
    pub async fn run_reconciliation(&self) -> AppResult<ReconciliationReport> {
        self.reconciliation.run().await
    }

    pub fn run_migrations(database: &Database) -> AppResult<()> {
        let mut conn = database.get_connection()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        Ok(())
    }
}
