//! The persisted unit of session state.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Storage format for expiry timestamps.
///
/// Fixed-width and most-significant-first, so lexicographic comparison in
/// SQL matches chronological order.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Latest expiry that still fits the four-digit year of [`EXPIRY_FORMAT`].
pub fn latest_expiry() -> DateTime<Utc> {
    // 9999-12-31 23:59:59 UTC
    DateTime::from_timestamp(253_402_300_799, 0).unwrap_or_default()
}

/// Earliest instant with a four-digit year.
pub fn earliest_expiry() -> DateTime<Utc> {
    // 0001-01-01 00:00:00 UTC
    DateTime::from_timestamp(-62_135_596_800, 0).unwrap_or_default()
}

/// One stored session: opaque bytes plus an absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Caller-supplied session identifier.
    pub id: String,

    /// Serialized session variables. Never interpreted by a store.
    pub value: Vec<u8>,

    /// Instant after which `read` must treat the record as absent.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(id: impl Into<String>, value: Vec<u8>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            value,
            expires_at,
        }
    }

    /// Whether `read` at `now` may return this record.
    ///
    /// The boundary is inclusive: a record is still live at exactly its
    /// expiry second.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at >= now
    }
}

/// Render a timestamp the way it is stored.
pub fn format_expiry(ts: DateTime<Utc>) -> String {
    ts.format(EXPIRY_FORMAT).to_string()
}

/// Parse a stored timestamp. Returns `None` for malformed text.
pub fn parse_expiry(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, EXPIRY_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_expiry_format_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 9, 7, 5, 1).unwrap();
        let text = format_expiry(ts);
        assert_eq!(text, "2026-03-09 07:05:01");
        assert_eq!(parse_expiry(&text), Some(ts));
    }

    #[test]
    fn test_expiry_format_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap();
        let late = early + Duration::seconds(1);
        assert!(format_expiry(early) < format_expiry(late));
    }

    #[test]
    fn test_storable_range_formats_with_four_digit_years() {
        assert_eq!(format_expiry(latest_expiry()), "9999-12-31 23:59:59");
        assert_eq!(format_expiry(earliest_expiry()), "0001-01-01 00:00:00");
    }

    #[test]
    fn test_parse_expiry_rejects_garbage() {
        assert!(parse_expiry("not a date").is_none());
        assert!(parse_expiry("2026-03-09T07:05:01Z").is_none());
    }

    #[test]
    fn test_liveness_boundary_is_inclusive() {
        let expires = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let record = SessionRecord::new("s1", b"A".to_vec(), expires);

        assert!(record.is_live_at(expires - Duration::seconds(1)));
        assert!(record.is_live_at(expires));
        assert!(!record.is_live_at(expires + Duration::seconds(1)));
    }
}
