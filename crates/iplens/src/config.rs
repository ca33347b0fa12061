//! Configuration management for iplens.
//!
//! Configuration is read from a YAML file. Every section and key is
//! optional; anything omitted falls back to the built-in defaults. The
//! cache directory can also be overridden with `IPLENS_CACHE_DIR`.
//!
//! ```yaml
//! cache:
//!   dir: .iplens
//!   expiration_days: 30   # null disables expiry
//! geo:
//!   base_url: https://freegeoip.app/json/
//! rdap:
//!   base_url: https://rdap.arin.net/bootstrap/ip/
//! http:
//!   timeout_secs: 30
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "iplens.yaml";

/// Environment variable overriding `cache.dir`
pub const CACHE_DIR_ENV: &str = "IPLENS_CACHE_DIR";

/// Default directory for cache files
pub const DEFAULT_CACHE_DIR: &str = ".iplens";

/// Default number of days a cached lookup stays valid
pub const DEFAULT_EXPIRATION_DAYS: u32 = 30;

/// Default geolocation service endpoint (the address is appended)
pub const DEFAULT_GEO_BASE_URL: &str = "https://freegeoip.app/json/";

/// Default RDAP bootstrap endpoint (the address is appended)
pub const DEFAULT_RDAP_BASE_URL: &str = "https://rdap.arin.net/bootstrap/ip/";

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Cache settings
    pub cache: CacheConfig,
    /// Geolocation service settings
    pub geo: GeoConfig,
    /// RDAP service settings
    pub rdap: RdapConfig,
    /// HTTP client settings
    pub http: HttpConfig,
}

/// Cache section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the cache files
    pub dir: PathBuf,
    /// Days before a cached lookup expires; `None` keeps entries forever
    pub expiration_days: Option<u32>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
            expiration_days: Some(DEFAULT_EXPIRATION_DAYS),
        }
    }
}

impl CacheConfig {
    /// Entry lifetime as a duration, if entries expire at all.
    #[must_use]
    pub fn ttl(&self) -> Option<chrono::Duration> {
        self.expiration_days
            .map(|days| chrono::Duration::days(i64::from(days)))
    }

    /// Path of a cache file inside the cache directory.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Geolocation section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeoConfig {
    /// Service endpoint; the address is appended to it
    pub base_url: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEO_BASE_URL.to_string(),
        }
    }
}

/// RDAP section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RdapConfig {
    /// Service endpoint; the address is appended to it
    pub base_url: String,
}

impl Default for RdapConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RDAP_BASE_URL.to_string(),
        }
    }
}

/// HTTP client section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    /// Per-request timeout as a duration.
    #[must_use]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve configuration for a run.
    ///
    /// An explicit `path` must exist. Without one, [`CONFIG_FILE_NAME`] in
    /// `working_dir` is used when present and defaults otherwise. Environment
    /// overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any file fails to
    /// parse.
    pub async fn resolve(path: Option<&Path>, working_dir: &Path) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path).await?,
            None => {
                let candidate = working_dir.join(CONFIG_FILE_NAME);
                if fs::try_exists(&candidate).await? {
                    Self::load(&candidate).await?
                } else {
                    tracing::debug!(path = %candidate.display(), "No config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(std::env::var_os(CACHE_DIR_ENV));
        Ok(config)
    }

    /// Apply environment overrides. Blank values are ignored; any other value,
    /// UTF-8 or not, is taken as a path.
    pub fn apply_env_overrides(&mut self, cache_dir: Option<OsString>) {
        match cache_dir {
            Some(dir) if dir.to_string_lossy().trim().is_empty() => {
                tracing::warn!(
                    env_var = CACHE_DIR_ENV,
                    "Empty value, keeping configured cache directory"
                );
            }
            Some(dir) => self.cache.dir = PathBuf::from(dir),
            None => {}
        }
    }
}
