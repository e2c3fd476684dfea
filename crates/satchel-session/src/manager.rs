//! Session lifecycle facade.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::engine::{SessionEngine, SessionVariables};
use crate::error::{Result, SessionError};
use crate::store::SessionStore;

/// Session name used when none is configured.
pub const DEFAULT_SESSION_NAME: &str = "SATCHELSESSID";

/// Lifecycle state of a [`SessionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Started,
}

/// Owns one session's lifecycle on top of an injected [`SessionStore`].
///
/// `start` loads the stored blob into an in-memory variable map, `save`
/// writes it back. Variables are plain JSON values; the store only ever sees
/// the encoded bytes. Many managers can share one store through the `Arc`.
///
/// A manager that is still started when dropped saves itself.
pub struct SessionManager<S: SessionStore + ?Sized> {
    store: Arc<S>,
    engine: SessionEngine,
    state: SessionState,
    id: Option<String>,
    name: String,
    variables: SessionVariables,
    lifetime_override: Option<Duration>,
}

impl<S: SessionStore + ?Sized> std::fmt::Debug for SessionManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("variables", &self.variables.len())
            .finish_non_exhaustive()
    }
}

impl<S: SessionStore + ?Sized> SessionManager<S> {
    /// Create a manager with a default engine.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_engine(store, SessionEngine::default())
    }

    /// Create a manager with an explicit engine.
    pub fn with_engine(store: Arc<S>, engine: SessionEngine) -> Self {
        let name = engine
            .options()
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string());

        Self {
            store,
            engine,
            state: SessionState::NotStarted,
            id: None,
            name,
            variables: SessionVariables::new(),
            lifetime_override: None,
        }
    }

    /// Start the session. A no-op if already started.
    ///
    /// Uses the id set through [`set_id`](Self::set_id) or generates a new
    /// one, then loads its variables. A missing or expired record is a new,
    /// empty session.
    pub fn start(&mut self) -> Result<()> {
        if self.has_started() {
            return Ok(());
        }

        self.store.open(&self.engine.options().save_path, &self.name)?;

        let id = match &self.id {
            Some(id) => id.clone(),
            None => self.engine.generate_id(),
        };

        self.variables = match self.store.read(&id)? {
            Some(data) => self.engine.decode(&data)?,
            None => {
                debug!(session_id = %id, "No stored session, starting empty");
                SessionVariables::new()
            }
        };

        if self.engine.should_collect() {
            let removed = self.store.gc(self.engine.gc_max_age())?;
            debug!(removed, "Session gc ran on start");
        }

        info!(session_id = %id, name = %self.name, "Session started");
        self.id = Some(id);
        self.state = SessionState::Started;
        Ok(())
    }

    /// Whether the session has started.
    pub fn has_started(&self) -> bool {
        self.state == SessionState::Started
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Write variables to the store and close the session.
    ///
    /// A no-op if not started. Variables stay readable afterwards.
    pub fn save(&mut self) -> Result<()> {
        if !self.has_started() {
            return Ok(());
        }
        let Some(id) = self.id.as_deref() else {
            return Ok(());
        };

        let data = self.engine.encode(&self.variables)?;
        let ttl = self.engine.ttl_for(self.lifetime_override);
        self.store.write_with_ttl(id, &data, ttl)?;
        self.lifetime_override = None;
        self.store.close()?;

        debug!(session_id = %id, bytes = data.len(), ?ttl, "Session saved");
        self.state = SessionState::NotStarted;
        Ok(())
    }

    /// Close the session without writing it back.
    ///
    /// A no-op if not started. In-memory variables are kept, the stored
    /// record is left exactly as it was.
    pub fn abort(&mut self) -> Result<()> {
        if !self.has_started() {
            return Ok(());
        }
        self.store.close()?;

        debug!(session_id = ?self.id, "Session closed without saving");
        self.state = SessionState::NotStarted;
        Ok(())
    }

    /// Move the session to a fresh id.
    ///
    /// Returns `Ok(false)` when not started. With `destroy`, the record under
    /// the old id is deleted first. `new_lifetime` replaces the time-to-live
    /// used by the next save only.
    pub fn regenerate(&mut self, destroy: bool, new_lifetime: Option<Duration>) -> Result<bool> {
        if !self.has_started() {
            return Ok(false);
        }

        if destroy && let Some(old) = self.id.as_deref() {
            self.store.destroy(old)?;
        }

        if new_lifetime.is_some() {
            self.lifetime_override = new_lifetime;
        }

        let new_id = self.engine.generate_id();
        info!(
            old_session_id = ?self.id,
            new_session_id = %new_id,
            destroyed = destroy,
            "Session id regenerated"
        );
        self.id = Some(new_id);
        Ok(true)
    }

    /// Current session id, if one has been set or generated.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Choose the id to resume. Only valid before start.
    pub fn set_id(&mut self, id: impl Into<String>) -> Result<()> {
        if self.has_started() {
            return Err(SessionError::AlreadyStarted { operation: "ID" });
        }
        self.id = Some(id.into());
        Ok(())
    }

    /// Session name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the session name. Only valid before start.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        if self.has_started() {
            return Err(SessionError::AlreadyStarted { operation: "name" });
        }
        self.name = name.into();
        Ok(())
    }

    /// Value of a session variable, or `None` if it is not set.
    pub fn read(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Set a session variable. Persisted on the next save.
    pub fn write(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Remove one variable, or every variable when `name` is `None`.
    pub fn clear(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.variables.remove(name);
            }
            None => self.variables.clear(),
        }
    }

    /// All session variables.
    pub fn variables(&self) -> &SessionVariables {
        &self.variables
    }

    /// Mutable access for request-scoped code.
    pub fn variables_mut(&mut self) -> &mut SessionVariables {
        &mut self.variables
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S: SessionStore + ?Sized> Drop for SessionManager<S> {
    fn drop(&mut self) {
        if let Err(e) = self.save() {
            warn!(session_id = ?self.id, error = %e, "Failed to save session on drop");
        }
    }
}
