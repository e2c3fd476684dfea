//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A `[session.options]` entry was rejected by the session engine.
    #[error("invalid session option: {0}")]
    SessionOption(#[from] satchel_session::SessionError),

    /// No database path configured and no platform data directory available.
    #[error("no database path configured and no platform data directory found")]
    NoDatabasePath,
}
