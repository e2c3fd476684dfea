//! Configuration for session stores.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Default time-to-live applied at every write (24 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(1440);

/// Default table name.
pub const DEFAULT_TABLE: &str = "sessions";

/// Default id column name.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Default expiry column name.
pub const DEFAULT_EXPIRY_COLUMN: &str = "expire";

/// Default value column name.
pub const DEFAULT_VALUE_COLUMN: &str = "value";

/// How `gc(max_age)` turns `max_age` into a deletion cutoff.
///
/// Records are deleted when `expires_at < cutoff`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GcCutoff {
    /// `cutoff = now - max_age`. A record is removed one full window after
    /// it stopped being readable.
    #[default]
    IdleWindow,

    /// `cutoff = now`. Every record that `read` would already reject is
    /// removed; `max_age` is ignored.
    Expired,
}

/// Table and column names for the relational store.
///
/// These are interpolated into SQL text, so they must come from trusted
/// deployment configuration. [`TableLayout::validate`] rejects anything that
/// is not a bare identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    pub table: String,
    pub id_column: String,
    pub expiry_column: String,
    pub value_column: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            expiry_column: DEFAULT_EXPIRY_COLUMN.to_string(),
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
        }
    }
}

impl TableLayout {
    /// Set the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the three column names.
    pub fn with_columns(
        mut self,
        id: impl Into<String>,
        expiry: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.id_column = id.into();
        self.expiry_column = expiry.into();
        self.value_column = value.into();
        self
    }

    /// Check that every name is a plain SQL identifier.
    pub fn validate(&self) -> Result<()> {
        for name in [
            &self.table,
            &self.id_column,
            &self.expiry_column,
            &self.value_column,
        ] {
            if !is_identifier(name) {
                return Err(SessionError::InvalidIdentifier(name.clone()));
            }
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Options shared by every [`SessionStore`](crate::SessionStore) implementation.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Relational layout (ignored by the in-memory store).
    pub layout: TableLayout,

    /// Time-to-live used by `write`.
    pub ttl: Duration,

    /// Cutoff policy for `gc`.
    pub gc_cutoff: GcCutoff,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            layout: TableLayout::default(),
            ttl: DEFAULT_TTL,
            gc_cutoff: GcCutoff::default(),
        }
    }
}

impl StoreOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table layout.
    pub fn with_layout(mut self, layout: TableLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the write time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the gc cutoff policy.
    pub fn with_gc_cutoff(mut self, cutoff: GcCutoff) -> Self {
        self.gc_cutoff = cutoff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = TableLayout::default();
        assert_eq!(layout.table, "sessions");
        assert_eq!(layout.expiry_column, "expire");
        layout.validate().unwrap();
    }

    #[test]
    fn test_layout_rejects_injection() {
        let layout = TableLayout::default().with_table("sessions; DROP TABLE users");
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, SessionError::InvalidIdentifier(name) if name.contains("DROP")));

        let layout = TableLayout::default().with_columns("id", "1expire", "value");
        assert!(layout.validate().is_err());

        let layout = TableLayout::default().with_columns("id", "", "value");
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_layout_accepts_underscored_names() {
        TableLayout::default()
            .with_table("_app_sessions")
            .with_columns("sess_id", "expires_at", "payload_v2")
            .validate()
            .unwrap();
    }

    #[test]
    fn test_gc_cutoff_serde_names() {
        let json = serde_json::to_string(&GcCutoff::IdleWindow).unwrap();
        assert_eq!(json, "\"idle-window\"");
        let parsed: GcCutoff = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(parsed, GcCutoff::Expired);
    }
}
