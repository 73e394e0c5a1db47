//! Staleness policy for cached entities.
//!
//! Titles refresh weekly; people change rarely and are allowed twice the
//! age. All comparisons use UTC so a timezone offset can never make a fresh
//! row look stale.

use chrono::{DateTime, Duration, Utc};

/// Maximum age of a title's `last_synced_at` before it is stale.
pub const TITLE_SYNC_THRESHOLD_DAYS: i64 = 7;

/// Maximum age of a person's `last_synced_at` before it is stale.
pub const PERSON_SYNC_THRESHOLD_DAYS: i64 = 14;

/// A record that has never been synced (None) is always stale.
pub fn is_fresh(last_synced_at: Option<DateTime<Utc>>, threshold_days: i64) -> bool {
    is_fresh_at(last_synced_at, threshold_days, Utc::now())
}

/// Clock-injected variant so tests can pin `now`.
pub fn is_fresh_at(
    last_synced_at: Option<DateTime<Utc>>,
    threshold_days: i64,
    now: DateTime<Utc>,
) -> bool {
    match last_synced_at {
        None => false,
        Some(synced_at) => now - synced_at < Duration::days(threshold_days),
    }
}
