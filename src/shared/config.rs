use std::env;
use std::ops::Range;
use std::time::Duration;

/// Tuning knobs for the background synchronization pipeline.
///
/// Constructed once at process start and passed down explicitly; components
/// never read the environment themselves.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Number of concurrent worker loops consuming the job queue.
    pub worker_count: usize,
    /// How long an idle worker sleeps before polling the queue again.
    pub poll_interval: Duration,
    /// Pre-work jitter range in seconds, a courtesy to the upstream API.
    /// None disables the sleep entirely (tests).
    pub jitter_secs: Option<Range<u64>>,
    /// Soft time limit per job; exceeding it is logged, not fatal.
    pub soft_time_limit: Duration,
    /// Hard time limit per job; exceeding it fails the job.
    pub hard_time_limit: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            worker_count: 2,
            poll_interval: Duration::from_secs(5),
            jitter_secs: Some(5..15),
            // Generous limits: a series sync can touch hundreds of episodes.
            soft_time_limit: Duration::from_secs(25 * 60),
            hard_time_limit: Duration::from_secs(30 * 60),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(count) = env::var("SYNC_WORKER_COUNT") {
            if let Ok(count) = count.parse::<usize>() {
                config.worker_count = count.max(1);
            }
        }

        config
    }

    /// Configuration for tests: no jitter, fast polling.
    pub fn for_tests() -> Self {
        Self {
            worker_count: 1,
            poll_interval: Duration::from_millis(50),
            jitter_secs: None,
            ..Self::default()
        }
    }
}
