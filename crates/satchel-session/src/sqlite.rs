//! Relational session store on SQLite.
//!
//! One table, three columns. Names come from [`TableLayout`] and are spliced
//! into the SQL text once at construction; values are always bound.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::types::{FromSqlError, ValueRef};
use rusqlite::{Connection, ErrorCode, OpenFlags, OptionalExtension, Row, params};
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, SystemClock, now_truncated};
use crate::config::{StoreOptions, TableLayout};
use crate::error::{Result, SessionError};
use crate::record::{SessionRecord, format_expiry, parse_expiry};
use crate::store::{SessionStore, expiry_after, gc_cutoff};

/// How long a file-backed connection waits on a locked database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on update/insert rounds in a single write.
const MAX_UPSERT_ATTEMPTS: usize = 3;

/// Result of the insert half of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertOutcome {
    Inserted,
    /// Another writer created the row between our update and insert.
    Conflict,
}

/// SQL text for one layout, built once.
#[derive(Debug)]
struct Statements {
    create: String,
    read: String,
    update: String,
    insert: String,
    destroy: String,
    gc: String,
    record: String,
    count: String,
}

impl Statements {
    fn new(layout: &TableLayout) -> Self {
        let TableLayout {
            table: t,
            id_column: id,
            expiry_column: exp,
            value_column: val,
        } = layout;

        Self {
            create: format!(
                "CREATE TABLE IF NOT EXISTS {t} (
                    {id} TEXT PRIMARY KEY NOT NULL,
                    {val} BLOB NOT NULL,
                    {exp} TEXT NOT NULL
                );
                CREATE UNIQUE INDEX IF NOT EXISTS uq_{t}_{id} ON {t}({id});
                CREATE INDEX IF NOT EXISTS idx_{t}_{exp} ON {t}({exp});"
            ),
            read: format!("SELECT {val} FROM {t} WHERE {id} = ?1 AND {exp} >= ?2"),
            update: format!("UPDATE {t} SET {val} = ?1, {exp} = ?2 WHERE {id} = ?3"),
            insert: format!("INSERT INTO {t} ({id}, {val}, {exp}) VALUES (?1, ?2, ?3)"),
            destroy: format!("DELETE FROM {t} WHERE {id} = ?1"),
            gc: format!("DELETE FROM {t} WHERE {exp} < ?1"),
            record: format!("SELECT {id}, {val}, {exp} FROM {t} WHERE {id} = ?1"),
            count: format!("SELECT COUNT(*) FROM {t}"),
        }
    }
}

/// [`SessionStore`] persisting records in a single SQLite table.
///
/// Thread-safe via an internal `parking_lot::Mutex<Connection>`. Beyond the
/// connection the store only holds immutable configuration.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
    sql: Statements,
    options: StoreOptions,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SqliteSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSessionStore")
            .field("layout", &self.options.layout)
            .field("ttl", &self.options.ttl)
            .field("gc_cutoff", &self.options.gc_cutoff)
            .finish_non_exhaustive()
    }
}

impl SqliteSessionStore {
    /// Open (or create) the database at `path` and ensure the table exists.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = Self::from_connection(conn, options)?;
        info!(path = %path.display(), table = %store.options.layout.table, "Session store opened");
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory(options: StoreOptions) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, options)
    }

    /// Wrap an existing connection. Validates the layout and creates the
    /// table and expiry index if they are missing.
    pub fn from_connection(conn: Connection, options: StoreOptions) -> Result<Self> {
        options.layout.validate()?;
        let sql = Statements::new(&options.layout);
        conn.execute_batch(&sql.create)?;
        debug!(table = %options.layout.table, "Session table ready");

        Ok(Self {
            conn: Mutex::new(conn),
            sql,
            options,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Store configuration.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Raw record for `id`, ignoring expiry.
    pub fn record(&self, id: &str) -> Result<Option<SessionRecord>> {
        let record = self
            .conn
            .lock()
            .query_row(&self.sql.record, params![id], row_to_record)
            .optional()?;
        Ok(record)
    }

    /// Number of rows in the table, expired ones included.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row(&self.sql.count, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn try_insert(
        &self,
        conn: &Connection,
        id: &str,
        data: &[u8],
        expires: &str,
    ) -> Result<InsertOutcome> {
        match conn.execute(&self.sql.insert, params![id, data, expires]) {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(rusqlite::Error::SqliteFailure(err, _)) if is_id_conflict(&err) => {
                Ok(InsertOutcome::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionStore for SqliteSessionStore {
    fn open(&self, save_path: &str, name: &str) -> Result<()> {
        trace!(save_path = %save_path, name = %name, "Session store opened for request");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        trace!("Session store closed for request");
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let now = format_expiry(now_truncated(self.clock.as_ref()));
        let value = self
            .conn
            .lock()
            .query_row(&self.sql.read, params![id, now], |row| blob_column(row, 0))
            .optional()?;

        debug!(session_id = %id, hit = value.is_some(), "Session read");
        Ok(value)
    }

    fn write_with_ttl(&self, id: &str, data: &[u8], ttl: Duration) -> Result<()> {
        let expires_at = expiry_after(now_truncated(self.clock.as_ref()), ttl);
        let expires = format_expiry(expires_at);
        let conn = self.conn.lock();

        for attempt in 1..=MAX_UPSERT_ATTEMPTS {
            let updated = conn.execute(&self.sql.update, params![data, expires, id])?;
            if updated > 0 {
                debug!(session_id = %id, bytes = data.len(), %expires, "Session updated");
                return Ok(());
            }

            match self.try_insert(&conn, id, data, &expires)? {
                InsertOutcome::Inserted => {
                    debug!(session_id = %id, bytes = data.len(), %expires, "Session inserted");
                    return Ok(());
                }
                InsertOutcome::Conflict => {
                    warn!(session_id = %id, attempt, "Session insert conflicted, retrying as update");
                }
            }
        }

        Err(SessionError::WriteConflict(id.to_string()))
    }

    fn destroy(&self, id: &str) -> Result<()> {
        let removed = self.conn.lock().execute(&self.sql.destroy, params![id])?;
        debug!(session_id = %id, removed, "Session destroyed");
        Ok(())
    }

    fn gc(&self, max_age: Duration) -> Result<usize> {
        let cutoff = gc_cutoff(
            self.options.gc_cutoff,
            now_truncated(self.clock.as_ref()),
            max_age,
        );
        let removed = self
            .conn
            .lock()
            .execute(&self.sql.gc, params![format_expiry(cutoff)])?;

        if removed > 0 {
            info!(removed, %cutoff, "Expired sessions collected");
        } else {
            debug!(%cutoff, "Session gc found nothing to collect");
        }
        Ok(removed)
    }

    fn ttl(&self) -> Duration {
        self.options.ttl
    }
}

/// Whether an insert failed because the id is already taken.
///
/// Other constraint failures (CHECK, NOT NULL, triggers) are real errors.
fn is_id_conflict(err: &rusqlite::ffi::Error) -> bool {
    err.code == ErrorCode::ConstraintViolation
        && matches!(
            err.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
}

/// Read a value column as bytes, accepting tables that declared it TEXT.
fn blob_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<u8>> {
    match row.get_ref(idx)? {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Ok(bytes.to_vec()),
        ValueRef::Null => Ok(Vec::new()),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            other.data_type(),
            Box::new(FromSqlError::InvalidType),
        )),
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let expires: String = row.get(2)?;
    let expires_at = parse_expiry(&expires).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("malformed expiry timestamp: {expires}").into(),
        )
    })?;

    Ok(SessionRecord {
        id: row.get(0)?,
        value: blob_column(row, 1)?,
        expires_at,
    })
}
