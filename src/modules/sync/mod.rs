//! Background synchronization pipeline: freshness policy, durable job
//! queue, worker pool, graph merge engine, audit log and scheduled sweeps.

pub mod audit;
pub mod domain;
pub mod freshness;
pub mod infrastructure;
pub mod merge;
pub mod scheduled;
pub mod worker;

pub use audit::{SyncAuditLog, SyncEntityKind, SyncOutcomeDb};
pub use domain::{Job, JobRecord, JobRepository, JobType};
pub use infrastructure::repository::JobRepositoryImpl;
pub use merge::GraphMergeEngine;
pub use scheduled::{MaintenanceService, SweepReport};
pub use worker::{SyncWorker, WorkerPool};
