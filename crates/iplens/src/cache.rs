//! Expiring key-value cache with JSON file persistence.
//!
//! Each lookup source keeps one [`ExpiringCache`] so repeated runs do not
//! hit the remote services for addresses seen recently. Entries carry an
//! absolute expiry timestamp computed when they are stored; expired entries
//! read as absent and are purged when the cache is saved.
//!
//! # Persistence
//!
//! [`ExpiringCache::save`] writes the whole cache as a single JSON object to
//! a temporary file alongside the target and then renames it into place, so
//! an interrupted save never leaves a truncated cache behind.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A cached value with its expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the entry stops being served; `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// The cached payload.
    pub data: Value,
}

impl CacheEntry {
    /// Returns `true` if the entry has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

/// In-memory cache of JSON values keyed by record key, optionally backed by
/// a file.
#[derive(Debug, Clone)]
pub struct ExpiringCache {
    path: Option<PathBuf>,
    ttl: Option<Duration>,
    entries: HashMap<String, CacheEntry>,
}

impl ExpiringCache {
    /// Creates an empty cache that is never persisted.
    #[must_use]
    pub fn in_memory(ttl: Option<Duration>) -> Self {
        Self {
            path: None,
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Opens a file-backed cache, loading any entries already saved at `path`.
    ///
    /// A missing file yields an empty cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// valid cache document.
    pub async fn open(path: impl Into<PathBuf>, ttl: Option<Duration>) -> Result<Self> {
        let path = path.into();

        let entries: HashMap<String, CacheEntry> = match fs::read_to_string(&path).await {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| Error::Cache {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened cache");

        Ok(Self {
            path: Some(path),
            ttl,
            entries,
        })
    }

    /// Returns the cached value for `key` unless it is absent or expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.get_at(key, Utc::now())
    }

    /// Like [`get`](Self::get), evaluated at `now`.
    #[must_use]
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<&Value> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| &entry.data)
    }

    /// Stores `data` under `key`, expiring one TTL from now.
    pub fn set(&mut self, key: impl Into<String>, data: Value) {
        self.set_at(key, data, Utc::now());
    }

    /// Like [`set`](Self::set), with the expiry computed from `now`.
    pub fn set_at(&mut self, key: impl Into<String>, data: Value, now: DateTime<Utc>) {
        // An expiry past the representable range means the entry never expires.
        let expires_at = self.ttl.and_then(|ttl| now.checked_add_signed(ttl));
        self.entries.insert(key.into(), CacheEntry { expires_at, data });
    }

    /// Drops entries expired at `now`, returning how many were removed.
    pub fn purge_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    /// Drops entries that have expired.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Purges expired entries, then persists the rest to the backing file.
    /// An in-memory cache is only purged.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written or renamed.
    pub async fn save(&mut self) -> Result<()> {
        let purged = self.purge_expired();
        let Some(path) = &self.path else {
            return Ok(());
        };

        let sorted: BTreeMap<&String, &CacheEntry> = self.entries.iter().collect();
        let content = serde_json::to_vec(&sorted)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = make_temp_path(path);
        if let Err(e) = fs::write(&temp_path, &content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        fs::rename(&temp_path, path).await?;

        debug!(
            path = %path.display(),
            entries = sorted.len(),
            purged,
            "Saved cache"
        );
        Ok(())
    }
}

/// `cache.json` becomes `cache.json.tmp`; `cache` becomes `cache.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}
