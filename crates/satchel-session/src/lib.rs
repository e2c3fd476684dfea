//! Session state persistence for Satchel.
//!
//! This crate provides:
//! - [`SessionStore`], the storage backend contract (open, close, read,
//!   write, destroy, gc)
//! - [`SqliteSessionStore`], a single-table relational backend with upsert
//!   and expiry semantics
//! - [`MemorySessionStore`], an in-memory backend with the same semantics
//! - [`SessionManager`], a lifecycle facade that loads and saves a map of
//!   session variables through an injected store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use satchel_session::{SessionManager, SqliteSessionStore, StoreOptions};
//!
//! let store = Arc::new(SqliteSessionStore::open("sessions.db", StoreOptions::default())?);
//!
//! let mut session = SessionManager::new(Arc::clone(&store));
//! session.start()?;
//! session.write("user", 42);
//! session.save()?;
//! ```

mod clock;
mod config;
mod engine;
mod error;
mod manager;
mod memory;
mod record;
mod sqlite;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    DEFAULT_EXPIRY_COLUMN, DEFAULT_ID_COLUMN, DEFAULT_TABLE, DEFAULT_TTL, DEFAULT_VALUE_COLUMN,
    GcCutoff, StoreOptions, TableLayout,
};
pub use engine::{EngineOptions, SUPPORTED_OPTIONS, SessionEngine, SessionVariables};
pub use error::{Result, SessionError};
pub use manager::{DEFAULT_SESSION_NAME, SessionManager, SessionState};
pub use memory::MemorySessionStore;
pub use record::{EXPIRY_FORMAT, SessionRecord, format_expiry, parse_expiry};
pub use sqlite::SqliteSessionStore;
pub use store::SessionStore;
