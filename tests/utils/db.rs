/// Database test utilities
///
/// Provides a shared connection pool against TEST_DATABASE_URL with
/// migrations applied once, plus a global lock so tests that share tables
/// run serially.
use bingelog::shared::Database;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, Pool};
use diesel_migrations::MigrationHarness;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

type PgPool = Pool<ConnectionManager<PgConnection>>;

static DB_POOL: OnceLock<Arc<PgPool>> = OnceLock::new();

/// Get or create the singleton database pool for tests
pub fn get_test_db_pool() -> Arc<PgPool> {
    DB_POOL
        .get_or_init(|| {
            dotenvy::dotenv().ok();
            let test_db_url = std::env::var("TEST_DATABASE_URL")
                .expect("TEST_DATABASE_URL must be set in .env for tests");

            let manager = ConnectionManager::<PgConnection>::new(test_db_url);
            let pool = r2d2::Pool::builder()
                .max_size(10)
                .build(manager)
                .expect("Failed to create test database pool");

            let mut conn = pool.get().expect("Failed to get DB connection");
            conn.run_pending_migrations(bingelog::MIGRATIONS)
                .expect("Failed to run migrations on test database");

            Arc::new(pool)
        })
        .clone()
}

/// Database handle wired to the test pool
pub fn get_test_database() -> Arc<Database> {
    Arc::new(Database::from_pool((*get_test_db_pool()).clone()))
}

/// Clean all tables - use at the start of each test
pub fn clean_test_db() {
    let pool = get_test_db_pool();
    let mut conn = pool.get().expect("Failed to get DB connection");

    for table in [
        "background_jobs",
        "sync_logs",
        "checkins",
        "aliases",
        "content",
        "people",
        "genres",
    ] {
        diesel::sql_query(format!(
            "TRUNCATE TABLE {} RESTART IDENTITY CASCADE",
            table
        ))
        .execute(&mut conn)
        .unwrap_or_else(|e| panic!("Failed to clean {}: {}", table, e));
    }
}

/// Global test mutex for serialization
static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Acquire test lock to ensure tests that share tables run serially.
/// Returns a guard that releases the lock when dropped.
pub fn acquire_test_lock() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
