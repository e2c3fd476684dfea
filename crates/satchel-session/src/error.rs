//! Error types for session storage and lifecycle operations.

/// Error type for session operations.
///
/// A missing or expired record is never an error: store reads return
/// `Ok(None)` and the manager treats that as a fresh session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Backend query or connection failure, passed through unmodified.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The engine could not encode or decode a session blob.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation is only valid before the session is started.
    #[error("Session already started, can not change {operation}")]
    AlreadyStarted { operation: &'static str },

    /// Concurrent writers kept racing on the same new id.
    #[error("Write for session {0} kept conflicting with concurrent writers")]
    WriteConflict(String),

    /// Table or column name is not a plain SQL identifier.
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A named engine option had a value that could not be interpreted.
    #[error("Invalid value {value:?} for session option '{key}'")]
    InvalidOption { key: String, value: String },

    /// Filesystem error while preparing the database location.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
