//! Trash retention rule
//!
//! A trashed post expires once whole days since deletion reach the
//! retention window. Days are `floor(elapsed_ms / 86_400_000)`: a post
//! deleted 29 days and 23 hours ago has age 29 and is kept; one deleted
//! exactly 30 days ago has age 30 and is purged.

use chrono::{DateTime, Utc};

/// Default number of days a post stays in the trash
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Posts this close to expiry are flagged in the trash view
pub const URGENT_THRESHOLD_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// How long trashed posts are kept before auto-purge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_DAYS)
    }
}

impl RetentionPolicy {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Whole days elapsed between `deleted_at` and `now`
    ///
    /// Negative when `deleted_at` lies in the future.
    pub fn days_since(deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        (now - deleted_at)
            .num_milliseconds()
            .div_euclid(MILLIS_PER_DAY)
    }

    /// Check if a post deleted at `deleted_at` should be purged
    pub fn is_expired(&self, deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        Self::days_since(deleted_at, now) >= i64::from(self.days)
    }

    /// Days left before auto-purge, never below zero
    pub fn days_remaining(&self, deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        (i64::from(self.days) - Self::days_since(deleted_at, now)).max(0)
    }

    pub fn is_urgent(&self, deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.days_remaining(deleted_at, now) <= URGENT_THRESHOLD_DAYS
    }
}
