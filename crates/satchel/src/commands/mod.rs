//! CLI command handlers.

pub mod destroy;
pub mod gc;
pub mod get;
pub mod init;
pub mod inspect;
pub mod put;
pub mod set;
pub mod vars;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use satchel_config::SatchelConfig;
use satchel_session::{
    EngineOptions, SessionEngine, SessionManager, SessionVariables, SqliteSessionStore,
};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved configuration.
    pub config: SatchelConfig,
    /// Config files that were loaded, lowest precedence first.
    pub config_sources: Vec<PathBuf>,
    /// Session database file.
    pub database: PathBuf,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Open the configured store, creating the schema if needed.
    pub fn open_store(&self) -> Result<Arc<SqliteSessionStore>> {
        let options = self.config.store_options()?;
        let store = SqliteSessionStore::open(&self.database, options).with_context(|| {
            format!("Failed to open session database {}", self.database.display())
        })?;
        Ok(Arc::new(store))
    }

    /// Start a session manager bound to `id`.
    pub fn start_session(&self, id: &str) -> Result<SessionManager<SqliteSessionStore>> {
        self.start_with(id, self.config.engine_options()?)
    }

    /// Load the variables stored for `id` without writing anything back.
    ///
    /// Gc is disabled for the load so the store is left exactly as found.
    pub fn peek_session(&self, id: &str) -> Result<SessionVariables> {
        let options = self.config.engine_options()?.with_gc_chance(0, 0);
        let mut session = self.start_with(id, options)?;
        session.abort()?;
        Ok(std::mem::take(session.variables_mut()))
    }

    fn start_with(
        &self,
        id: &str,
        options: EngineOptions,
    ) -> Result<SessionManager<SqliteSessionStore>> {
        let engine = SessionEngine::new(options);
        let mut session = SessionManager::with_engine(self.open_store()?, engine);
        session.set_id(id)?;
        session.start()?;
        Ok(session)
    }
}
