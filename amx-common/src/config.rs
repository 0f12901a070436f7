//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from a single TOML file. Every field has a
//! built-in default, so a missing or partial file never prevents startup.
//!
//! # Config File Priority
//!
//! 1. Explicit path (command-line `--config` or `AMX_CONFIG`)
//! 2. `~/.config/amx/config.toml` (platform config dir)
//! 3. `/etc/amx/config.toml` (Linux only)
//! 4. Built-in defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "AMX_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface the HTTP server binds to
    pub bind_addr: String,

    /// HTTP server port
    pub port: u16,

    /// Parent directory for request-scoped staging directories
    ///
    /// Defaults to the OS temp dir when unset.
    pub temp_dir: Option<PathBuf>,

    pub storage: StorageConfig,
    pub fetch: FetchConfig,
    pub encoding: EncodingConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            temp_dir: None,
            storage: StorageConfig::default(),
            fetch: FetchConfig::default(),
            encoding: EncodingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where finished mixes are published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

/// Publisher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// S3 bucket name
    pub bucket: String,

    /// S3 region name
    pub region: String,

    /// Custom S3-compatible endpoint (MinIO, R2, ...)
    pub endpoint: Option<String>,

    /// Host used in returned public URLs
    ///
    /// Defaults to `<bucket>.s3.amazonaws.com`.
    pub public_host: Option<String>,

    /// Object key prefix
    pub key_prefix: String,

    /// Target directory for the local backend
    pub local_dir: PathBuf,

    /// URL prefix the local backend reports for published objects
    pub local_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            bucket: "affirmation.maker.media".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            public_host: None,
            key_prefix: "final_audio".to_string(),
            local_dir: PathBuf::from("./published"),
            local_base_url: "http://127.0.0.1:8080/published".to_string(),
        }
    }
}

impl StorageConfig {
    /// Host portion of public object URLs
    pub fn resolved_public_host(&self) -> String {
        self.public_host
            .clone()
            .unwrap_or_else(|| format!("{}.s3.amazonaws.com", self.bucket))
    }
}

/// Remote asset download limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_asset_bytes: u64,
    /// Voice URLs accepted per request
    pub max_voices: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_asset_bytes: 100 * 1024 * 1024,
            max_voices: 16,
        }
    }
}

/// Output encoding settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub bitrate_kbps: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { bitrate_kbps: 192 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve and load configuration, degrading to defaults
    ///
    /// An explicit path that fails to load is an error. A missing
    /// implicit config file only logs a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading configuration from {}", path.display());
            return Self::load_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            info!("Loading configuration from {} ({})", path.display(), CONFIG_ENV_VAR);
            return Self::load_file(&path);
        }

        match find_config_file() {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load_file(&path)
            }
            None => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate values that serde cannot check
    pub fn validate(&self) -> Result<()> {
        if self.storage.key_prefix.contains("..") {
            return Err(Error::Config("storage.key_prefix must not contain '..'".to_string()));
        }
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_empty() {
            return Err(Error::Config("storage.bucket is required for the s3 backend".to_string()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::Config("fetch.timeout_secs must be positive".to_string()));
        }
        if self.fetch.max_asset_bytes == 0 {
            return Err(Error::Config("fetch.max_asset_bytes must be positive".to_string()));
        }
        if self.encoding.bitrate_kbps == 0 {
            return Err(Error::Config("encoding.bitrate_kbps must be positive".to_string()));
        }
        Ok(())
    }
}

/// Locate the implicit config file for this platform
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("amx").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/amx/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
