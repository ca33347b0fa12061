//! RDAP registration lookups.

use super::{FieldSource, flatten_json};
use crate::cache::ExpiringCache;
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use iplens_query::Record;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use tracing::debug;

/// Name of the RDAP cache file inside the cache directory
pub const RDAP_CACHE_FILE_NAME: &str = "rdap-cache.json";

/// Client for an RDAP bootstrap service: `GET {base_url}{ip}` is redirected
/// to the responsible registry, which answers with an IP network object
/// (`name`, `handle`, `startAddress`, `entities`, `events`, ...).
///
/// Addresses the registry does not know (404) are recorded as an empty
/// document so they are not requested again until the entry expires.
#[derive(Debug)]
pub struct RdapLookup {
    client: Client,
    base_url: String,
    cache: ExpiringCache,
}

impl RdapLookup {
    /// Source name used in logs and errors.
    pub const NAME: &'static str = "rdap";

    /// Creates a lookup against `base_url` using the given cache.
    pub fn new(client: Client, base_url: impl Into<String>, cache: ExpiringCache) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            cache,
        }
    }

    /// Creates a lookup from configuration, opening its cache file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache file exists but cannot be loaded.
    pub async fn from_config(config: &Config, client: Client) -> Result<Self> {
        let cache = ExpiringCache::open(
            config.cache.file(RDAP_CACHE_FILE_NAME),
            config.cache.ttl(),
        )
        .await?;
        Ok(Self::new(client, config.rdap.base_url.clone(), cache))
    }

    /// Returns the raw RDAP document for `ip`, from cache if fresh.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a status other than success
    /// or 404, or a body that is not JSON.
    pub async fn info(&mut self, ip: &str) -> Result<Value> {
        if let Some(cached) = self.cache.get(ip) {
            debug!(source = Self::NAME, ip, "Cache hit");
            return Ok(cached.clone());
        }

        let url = format!("{}{}", self.base_url, ip);
        debug!(source = Self::NAME, %url, "Requesting");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/rdap+json, application/json")
            .send()
            .await?;

        let info = match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(source = Self::NAME, ip, "Not registered");
                Value::Object(Map::new())
            }
            status if status.is_success() => response.json().await?,
            status => {
                return Err(Error::Lookup {
                    source_name: Self::NAME.to_string(),
                    key: ip.to_string(),
                    message: format!("unexpected status {status}"),
                });
            }
        };

        self.cache.set(ip, info.clone());
        Ok(info)
    }

    /// The cache backing this lookup.
    #[must_use]
    pub fn cache(&self) -> &ExpiringCache {
        &self.cache
    }
}

#[async_trait]
impl FieldSource for RdapLookup {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&mut self, key: &str) -> Result<Record> {
        Ok(flatten_json(self.info(key).await?))
    }

    async fn save_cache(&mut self) -> Result<()> {
        self.cache.save().await
    }
}
