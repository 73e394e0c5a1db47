// Shared kernel: cross-module concerns (config, database, errors, logging).

pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod utils;

// Re-exports for convenience
pub use config::SyncConfig;
pub use database::Database;
