//! Geolocation lookups.

use super::{FieldSource, flatten_json};
use crate::cache::ExpiringCache;
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use iplens_query::Record;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

/// Name of the geolocation cache file inside the cache directory
pub const GEO_CACHE_FILE_NAME: &str = "geo-cache.json";

/// Client for a freegeoip-style service: `GET {base_url}{ip}` returns a flat
/// JSON object (`country_code`, `region_code`, `city`, `latitude`, ...).
///
/// The service answers one address per request, so every cache miss is one
/// round trip.
#[derive(Debug)]
pub struct GeoLookup {
    client: Client,
    base_url: String,
    cache: ExpiringCache,
}

impl GeoLookup {
    /// Source name used in logs and errors.
    pub const NAME: &'static str = "geo";

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
            config.cache.file(GEO_CACHE_FILE_NAME),
            config.cache.ttl(),
        )
        .await?;
        Ok(Self::new(client, config.geo.base_url.clone(), cache))
    }

    /// Returns the raw geolocation document for `ip`, from cache if fresh.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// body that is not JSON.
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
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Lookup {
                source_name: Self::NAME.to_string(),
                key: ip.to_string(),
                message: format!("unexpected status {status}"),
            });
        }

        let info: Value = response.json().await?;
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
impl FieldSource for GeoLookup {
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
