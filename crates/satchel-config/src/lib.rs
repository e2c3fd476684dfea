//! Configuration system for Satchel.
//!
//! Provides TOML-based configuration with:
//! - Database location and table layout (`[database]`)
//! - Session lifecycle defaults and named engine options (`[session]`)
//! - Config file layering (user config dir + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    CONFIG_DIR_ENV, ConfigSource, LoadedConfig, load_config, load_config_file,
    load_config_with_options, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::{DatabaseConfig, SatchelConfig, SessionConfig};
