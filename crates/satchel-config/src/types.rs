//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [database]               # where and how records are stored
//! [session]                # lifecycle defaults
//! [session.options]        # named engine options, forwarded verbatim
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use satchel_session::{EngineOptions, GcCutoff, StoreOptions, TableLayout};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Application name for platform directory resolution.
pub(crate) const APP_NAME: &str = "satchel";

/// Database filename inside the platform data directory.
const DEFAULT_DATABASE_FILE: &str = "sessions.db";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatchelConfig {
    /// Session database configuration.
    pub database: Option<DatabaseConfig>,

    /// Session lifecycle configuration.
    pub session: Option<SessionConfig>,
}

impl SatchelConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: SatchelConfig) {
        if other.database.is_some() {
            self.database = other.database;
        }

        if other.session.is_some() {
            self.session = other.session;
        }
    }

    /// Database file path: configured, or `<data dir>/satchel/sessions.db`.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = self.database.as_ref().and_then(|d| d.path.clone()) {
            return Ok(path);
        }
        dirs::data_dir()
            .map(|d| d.join(APP_NAME).join(DEFAULT_DATABASE_FILE))
            .ok_or(ConfigError::NoDatabasePath)
    }

    /// Engine options from `[session]` and `[session.options]`.
    ///
    /// `ttl_secs` and `name` are applied first; named options are applied on
    /// top, so `gc_maxlifetime` or `name` in `[session.options]` win.
    pub fn engine_options(&self) -> Result<EngineOptions> {
        let session = self.session.clone().unwrap_or_default();

        let mut options =
            EngineOptions::default().with_max_lifetime(Duration::from_secs(session.ttl_secs));
        options.name = session.name;

        for (key, value) in session.options {
            options.set(&key, option_string(value))?;
        }
        Ok(options)
    }

    /// Store options, using the engine's effective lifetime as the write ttl.
    pub fn store_options(&self) -> Result<StoreOptions> {
        let engine = self.engine_options()?;
        let layout = self
            .database
            .as_ref()
            .map(DatabaseConfig::layout)
            .unwrap_or_default();
        let gc_cutoff = self
            .session
            .as_ref()
            .map(|s| s.gc_cutoff)
            .unwrap_or_default();

        Ok(StoreOptions::new()
            .with_layout(layout)
            .with_ttl(engine.gc_max_lifetime)
            .with_gc_cutoff(gc_cutoff))
    }
}

/// Render a TOML option value as the string the engine expects.
fn option_string(value: toml::Value) -> String {
    match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Database Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Database location and table layout.
///
/// Table and column names are spliced into SQL and must come from trusted
/// deployment configuration.
///
/// ```toml
/// [database]
/// path = "/var/lib/satchel/sessions.db"
/// table = "sessions"
/// id_column = "id"
/// expiry_column = "expire"
/// value_column = "value"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub table: String,
    pub id_column: String,
    pub expiry_column: String,
    pub value_column: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let layout = TableLayout::default();
        Self {
            path: None,
            table: layout.table,
            id_column: layout.id_column,
            expiry_column: layout.expiry_column,
            value_column: layout.value_column,
        }
    }
}

impl DatabaseConfig {
    /// Table layout for the store.
    pub fn layout(&self) -> TableLayout {
        TableLayout::default()
            .with_table(&self.table)
            .with_columns(&self.id_column, &self.expiry_column, &self.value_column)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session lifecycle configuration.
///
/// ```toml
/// [session]
/// name = "SATCHELSESSID"
/// ttl_secs = 1440
/// gc_cutoff = "idle-window"
///
/// [session.options]
/// gc_probability = 1
/// gc_divisor = 100
/// cookie_path = "/"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session name. Defaults to the manager's built-in name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Time-to-live in seconds applied at each write.
    pub ttl_secs: u64,
    /// How gc derives its deletion cutoff.
    pub gc_cutoff: GcCutoff,
    /// Named engine options.
    pub options: BTreeMap<String, toml::Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: None,
            ttl_secs: satchel_session::DEFAULT_TTL.as_secs(),
            gc_cutoff: GcCutoff::default(),
            options: BTreeMap::new(),
        }
    }
}
