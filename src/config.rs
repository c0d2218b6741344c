//! Configuration resolution for smartcert
//!
//! Two-tier resolution with ENV → TOML priority; every setting carries
//! a built-in default so the service starts with no configuration at
//! all. Environment variables use the `SMARTCERT_` prefix.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{VerifyError, VerifyResult};

/// Media types accepted for submission: JPEG, PNG, PDF, and the
/// word-processor document type.
pub const SUPPORTED_MIME_TYPES: [&str; 4] = [
    "image/jpeg",
    "image/png",
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Default maximum document size: 5 MiB
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Default per-stage analyzer timeout in seconds
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 30;

/// Optional TOML configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub bind_address: Option<String>,
    pub database_path: Option<PathBuf>,
    pub analyzer_base_url: Option<String>,
    pub max_document_bytes: Option<usize>,
    pub stage_timeout_secs: Option<u64>,
    pub event_capacity: Option<usize>,
}

impl TomlConfig {
    /// Load from a TOML file; a missing file is not an error.
    pub fn load(path: &Path) -> VerifyResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VerifyError::Internal(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: TomlConfig = toml::from_str(&contents)
            .map_err(|e| VerifyError::Internal(format!("Failed to parse {}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen address
    pub bind_address: String,

    /// SQLite database file path
    pub database_path: PathBuf,

    /// Base URL of the analyzer collaborator service
    pub analyzer_base_url: String,

    /// Maximum accepted document size in bytes
    pub max_document_bytes: usize,

    /// Per-stage analyzer timeout in seconds
    pub stage_timeout_secs: u64,

    /// Event bus channel capacity
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5731".to_string(),
            database_path: PathBuf::from("smartcert.db"),
            analyzer_base_url: "http://127.0.0.1:5732".to_string(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            stage_timeout_secs: DEFAULT_STAGE_TIMEOUT_SECS,
            event_capacity: 100,
        }
    }
}

impl AppConfig {
    /// Resolve configuration: ENV overrides TOML, TOML overrides defaults.
    ///
    /// The config file path itself comes from `SMARTCERT_CONFIG`
    /// (default `smartcert.toml` in the working directory).
    pub fn load() -> VerifyResult<Self> {
        let config_path = std::env::var("SMARTCERT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("smartcert.toml"));
        let toml_config = TomlConfig::load(&config_path)?;
        Ok(Self::resolve(toml_config))
    }

    /// Merge ENV and TOML values over the defaults
    pub fn resolve(toml_config: TomlConfig) -> Self {
        let defaults = Self::default();

        let bind_address = env_string("SMARTCERT_BIND_ADDRESS")
            .or(toml_config.bind_address)
            .unwrap_or(defaults.bind_address);

        let database_path = env_string("SMARTCERT_DATABASE_PATH")
            .map(PathBuf::from)
            .or(toml_config.database_path)
            .unwrap_or(defaults.database_path);

        let analyzer_base_url = env_string("SMARTCERT_ANALYZER_URL")
            .or(toml_config.analyzer_base_url)
            .unwrap_or(defaults.analyzer_base_url);

        let max_document_bytes = env_parsed("SMARTCERT_MAX_DOCUMENT_BYTES")
            .or(toml_config.max_document_bytes)
            .unwrap_or(defaults.max_document_bytes);

        let stage_timeout_secs = env_parsed("SMARTCERT_STAGE_TIMEOUT_SECS")
            .or(toml_config.stage_timeout_secs)
            .unwrap_or(defaults.stage_timeout_secs);

        let event_capacity = env_parsed("SMARTCERT_EVENT_CAPACITY")
            .or(toml_config.event_capacity)
            .unwrap_or(defaults.event_capacity);

        Self {
            bind_address,
            database_path,
            analyzer_base_url,
            max_document_bytes,
            stage_timeout_secs,
            event_capacity,
        }
    }

    /// Whether the given media type is in the supported set
    pub fn supports_mime_type(&self, mime_type: &str) -> bool {
        SUPPORTED_MIME_TYPES.contains(&mime_type)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}={}", key, raw);
            None
        }
    }
}
