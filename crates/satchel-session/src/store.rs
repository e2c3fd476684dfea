//! Storage backend contract.
//!
//! A [`SessionStore`] persists opaque session blobs keyed by id. The
//! [`SessionManager`](crate::SessionManager) calls these operations at each
//! lifecycle event; it never looks inside the bytes.
//!
//! # Architecture
//!
//! ```text
//! SessionStore (trait)        - open/close/read/write/destroy/gc
//!     └── SqliteSessionStore  - single-table relational store
//!     └── MemorySessionStore  - HashMap-backed, same time semantics
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::to_chrono;
use crate::config::GcCutoff;
use crate::error::Result;
use crate::record::{earliest_expiry, latest_expiry};

/// Trait for session storage backends.
///
/// None of these operations treat a missing record as an error. All of them
/// may be called repeatedly.
pub trait SessionStore: Send + Sync {
    /// Prepare the backend. No persistent state changes.
    fn open(&self, save_path: &str, name: &str) -> Result<()>;

    /// Release per-request resources. Idempotent.
    fn close(&self) -> Result<()>;

    /// Return the stored bytes for `id` if the record exists and has not
    /// expired. Never extends expiry.
    fn read(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Upsert `data` for `id` with an explicit time-to-live.
    ///
    /// Must leave exactly one record for `id` when it returns `Ok`.
    fn write_with_ttl(&self, id: &str, data: &[u8], ttl: Duration) -> Result<()>;

    /// Delete the record for `id`. Deleting an absent record succeeds.
    fn destroy(&self, id: &str) -> Result<()>;

    /// Delete every record whose expiry is older than the cutoff derived
    /// from `max_age`. Returns the number of records removed.
    fn gc(&self, max_age: Duration) -> Result<usize>;

    /// Time-to-live used by [`write`](Self::write).
    fn ttl(&self) -> Duration;

    /// Upsert `data` for `id` using the configured time-to-live.
    fn write(&self, id: &str, data: &[u8]) -> Result<()> {
        self.write_with_ttl(id, data, self.ttl())
    }
}

/// Expiry for a write at `now` with the given time-to-live.
pub(crate) fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(to_chrono(ttl))
        .map_or_else(latest_expiry, |ts| ts.min(latest_expiry()))
}

/// Deletion cutoff for `gc(max_age)` at `now`.
pub(crate) fn gc_cutoff(policy: GcCutoff, now: DateTime<Utc>, max_age: Duration) -> DateTime<Utc> {
    match policy {
        GcCutoff::IdleWindow => now
            .checked_sub_signed(to_chrono(max_age))
            .map_or_else(earliest_expiry, |ts| ts.max(earliest_expiry())),
        GcCutoff::Expired => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_after_adds_ttl() {
        let expires = expiry_after(t0(), Duration::from_secs(1440));
        assert_eq!(expires, t0() + chrono::Duration::seconds(1440));
    }

    #[test]
    fn test_expiry_after_saturates() {
        assert_eq!(expiry_after(t0(), Duration::MAX), latest_expiry());
    }

    #[test]
    fn test_idle_window_cutoff_subtracts_max_age() {
        let cutoff = gc_cutoff(GcCutoff::IdleWindow, t0(), Duration::from_secs(100));
        assert_eq!(cutoff, t0() - chrono::Duration::seconds(100));
        assert!(cutoff < t0());
    }

    #[test]
    fn test_expired_cutoff_ignores_max_age() {
        let cutoff = gc_cutoff(GcCutoff::Expired, t0(), Duration::from_secs(100));
        assert_eq!(cutoff, t0());
    }

    #[test]
    fn test_idle_window_cutoff_saturates() {
        let cutoff = gc_cutoff(GcCutoff::IdleWindow, t0(), Duration::MAX);
        assert_eq!(cutoff, earliest_expiry());
    }
}
