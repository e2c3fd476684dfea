//! In-memory session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock, now_truncated};
use crate::config::StoreOptions;
use crate::error::Result;
use crate::record::SessionRecord;
use crate::store::{SessionStore, expiry_after, gc_cutoff};

/// [`SessionStore`] backed by a `HashMap`.
///
/// Applies the same expiry and gc arithmetic as the SQLite store, with the
/// same one-second precision, so it can stand in for it in tests. Contents
/// are lost when the store is dropped.
#[derive(Debug)]
pub struct MemorySessionStore {
    records: Mutex<HashMap<String, SessionRecord>>,
    options: StoreOptions,
    clock: Arc<dyn Clock>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl MemorySessionStore {
    /// Create an empty store using the system clock.
    pub fn new(options: StoreOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    /// Create an empty store with an explicit time source.
    pub fn with_clock(options: StoreOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            options,
            clock,
        }
    }

    /// Raw record for `id`, ignoring expiry.
    pub fn record(&self, id: &str) -> Option<SessionRecord> {
        self.records.lock().get(id).cloned()
    }

    /// Number of stored records, expired ones included.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn open(&self, save_path: &str, name: &str) -> Result<()> {
        trace!(save_path = %save_path, name = %name, "Memory session store opened");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        trace!("Memory session store closed");
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let now = now_truncated(self.clock.as_ref());
        let value = self
            .records
            .lock()
            .get(id)
            .filter(|record| record.is_live_at(now))
            .map(|record| record.value.clone());

        debug!(session_id = %id, hit = value.is_some(), "Session read");
        Ok(value)
    }

    fn write_with_ttl(&self, id: &str, data: &[u8], ttl: Duration) -> Result<()> {
        let expires_at = expiry_after(now_truncated(self.clock.as_ref()), ttl);
        self.records.lock().insert(
            id.to_string(),
            SessionRecord::new(id, data.to_vec(), expires_at),
        );

        debug!(session_id = %id, bytes = data.len(), %expires_at, "Session written");
        Ok(())
    }

    fn destroy(&self, id: &str) -> Result<()> {
        let removed = self.records.lock().remove(id).is_some();
        debug!(session_id = %id, removed, "Session destroyed");
        Ok(())
    }

    fn gc(&self, max_age: Duration) -> Result<usize> {
        let cutoff = gc_cutoff(
            self.options.gc_cutoff,
            now_truncated(self.clock.as_ref()),
            max_age,
        );

        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| record.expires_at >= cutoff);
        let removed = before - records.len();

        debug!(removed, %cutoff, "Session gc complete");
        Ok(removed)
    }

    fn ttl(&self) -> Duration {
        self.options.ttl
    }
}
