//! Session engine: id generation, blob encoding and gc scheduling.
//!
//! The manager owns lifecycle state; the engine owns the policy bits that a
//! host runtime would normally provide. It is configured from the named
//! options accepted by [`EngineOptions::from_named`].

use std::collections::BTreeMap;
use std::time::Duration;

use rand::Rng;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::DEFAULT_TTL;
use crate::error::{Result, SessionError};

/// Session variables: name to JSON value, in stable key order.
pub type SessionVariables = BTreeMap<String, Value>;

/// Named options the engine recognizes. Anything else is dropped.
pub const SUPPORTED_OPTIONS: &[&str] = &[
    "save_path",
    "name",
    "save_handler",
    "gc_probability",
    "gc_divisor",
    "gc_maxlifetime",
    "serialize_handler",
    "cookie_lifetime",
    "cookie_path",
    "cookie_domain",
    "cookie_secure",
    "cookie_httponly",
    "use_strict_mode",
    "use_cookies",
    "use_only_cookies",
    "referer_check",
    "entropy_file",
    "entropy_length",
    "cache_limiter",
    "cache_expire",
    "use_trans_sid",
    "hash_function",
    "hash_bits_per_character",
    "upload_progress.enabled",
    "upload_progress.cleanup",
    "upload_progress.prefix",
    "upload_progress.name",
    "upload_progress.freq",
    "upload_progress.min_freq",
    "lazy_write",
];

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Passed to `SessionStore::open`.
    pub save_path: String,

    /// Session name override, applied by the manager when set.
    pub name: Option<String>,

    /// Numerator of the per-start gc chance.
    pub gc_probability: u32,

    /// Denominator of the per-start gc chance. Zero disables gc.
    pub gc_divisor: u32,

    /// Default time-to-live for writes and `max_age` for gc.
    pub gc_max_lifetime: Duration,

    /// Supported options the engine carries but does not interpret.
    pub passthrough: BTreeMap<String, String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            save_path: String::new(),
            name: None,
            gc_probability: 1,
            gc_divisor: 100,
            gc_max_lifetime: DEFAULT_TTL,
            passthrough: BTreeMap::new(),
        }
    }
}

impl EngineOptions {
    /// Build options from named settings, starting from defaults.
    ///
    /// Interpreted keys must parse; other supported keys are kept verbatim
    /// in `passthrough`; unsupported keys are ignored.
    pub fn from_named<I, K, V>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut parsed = Self::default();
        for (key, value) in options {
            parsed.set(key.as_ref(), value.into())?;
        }
        Ok(parsed)
    }

    /// Apply a single named option.
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "save_path" => self.save_path = value,
            "name" => self.name = Some(value),
            "gc_probability" => self.gc_probability = parse_number(key, &value)?,
            "gc_divisor" => self.gc_divisor = parse_number(key, &value)?,
            "gc_maxlifetime" => {
                self.gc_max_lifetime = Duration::from_secs(parse_number(key, &value)?)
            }
            "cookie_lifetime" => {
                parse_number::<u64>(key, &value)?;
                self.passthrough.insert(key.to_string(), value);
            }
            _ if SUPPORTED_OPTIONS.contains(&key) => {
                self.passthrough.insert(key.to_string(), value);
            }
            _ => debug!(option = %key, "Ignoring unsupported session option"),
        }
        Ok(())
    }

    /// Set the gc chance as `probability / divisor`.
    pub fn with_gc_chance(mut self, probability: u32, divisor: u32) -> Self {
        self.gc_probability = probability;
        self.gc_divisor = divisor;
        self
    }

    /// Set the default lifetime.
    pub fn with_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.gc_max_lifetime = lifetime;
        self
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SessionError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Generates ids, encodes variables and decides when gc runs.
#[derive(Debug, Clone, Default)]
pub struct SessionEngine {
    options: EngineOptions,
}

impl SessionEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Fresh session id: 32 lowercase hex characters.
    pub fn generate_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Serialize variables into the blob handed to the store.
    pub fn encode(&self, vars: &SessionVariables) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(vars)?)
    }

    /// Deserialize a stored blob. An empty blob is an empty session.
    pub fn decode(&self, data: &[u8]) -> Result<SessionVariables> {
        if data.is_empty() {
            return Ok(SessionVariables::new());
        }
        Ok(serde_json::from_slice(data)?)
    }

    /// Roll the gc dice.
    pub fn should_collect(&self) -> bool {
        let EngineOptions {
            gc_probability,
            gc_divisor,
            ..
        } = self.options;

        if gc_probability == 0 || gc_divisor == 0 {
            return false;
        }
        if gc_probability >= gc_divisor {
            return true;
        }
        rand::rng().random_range(0..gc_divisor) < gc_probability
    }

    /// Time-to-live for the next write.
    pub fn ttl_for(&self, lifetime_override: Option<Duration>) -> Duration {
        lifetime_override.unwrap_or(self.options.gc_max_lifetime)
    }

    /// `max_age` handed to `SessionStore::gc`.
    pub fn gc_max_age(&self) -> Duration {
        self.options.gc_max_lifetime
    }
}
