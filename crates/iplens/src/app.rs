//! Application context for lookups and queries.
//!
//! The `App` owns every [`FieldSource`] for the lifetime of a run. Sources
//! and their caches are created once, passed in explicitly, and saved
//! explicitly; nothing is held in global state.
//!
//! # Example
//!
//! ```no_run
//! use iplens::app::App;
//! use iplens::config::Config;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut app = App::from_config(&Config::default()).await?;
//!     let keys = vec!["8.8.8.8".to_string()];
//!     let result = app.run(&keys, Some("GET city WHERE country_code = US")).await;
//!     app.save_caches().await?;
//!     println!("{:?}", result?);
//!     Ok(())
//! }
//! ```

use crate::config::Config;
use crate::error::Result;
use crate::lookup::{FieldSource, GeoLookup, RdapLookup};
use iplens_query::{Dataset, Record};
use reqwest::Client;
use tracing::{debug, warn};

/// User agent sent with every lookup request
pub const USER_AGENT: &str = concat!("iplens/", env!("CARGO_PKG_VERSION"));

/// Application context for lookup and query execution.
pub struct App {
    /// Sources in merge order; later sources win on field name collisions.
    sources: Vec<Box<dyn FieldSource>>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("sources", &self.source_names())
            .finish()
    }
}

impl App {
    /// Create an App with the geolocation and RDAP sources described by
    /// `config`, sharing one HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP client cannot be built
    /// - A cache file exists but cannot be loaded
    pub async fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        let geo = GeoLookup::from_config(config, client.clone()).await?;
        let rdap = RdapLookup::from_config(config, client).await?;

        Ok(Self::with_sources(vec![Box::new(geo), Box::new(rdap)]))
    }

    /// Create an App from explicit sources.
    #[must_use]
    pub fn with_sources(sources: Vec<Box<dyn FieldSource>>) -> Self {
        Self { sources }
    }

    /// Names of the configured sources, in merge order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Build a dataset with one merged record per distinct key.
    ///
    /// # Errors
    ///
    /// Returns the first source error encountered.
    pub async fn lookup(&mut self, keys: &[String]) -> Result<Dataset> {
        let mut dataset = Dataset::new();

        for key in keys {
            if dataset.contains_key(key) {
                continue;
            }

            let mut record = Record::new();
            for source in &mut self.sources {
                let fields = source.fetch(key).await?;
                debug!(source = source.name(), key = %key, fields = fields.len(), "Fetched");
                record.extend(fields);
            }
            dataset.insert(key.clone(), record);
        }

        Ok(dataset)
    }

    /// Look up `keys` and apply `query`, if any.
    ///
    /// The query is parsed before any lookup so that a malformed query
    /// fails without touching the network.
    ///
    /// # Errors
    ///
    /// Returns an error if the query does not parse or a lookup fails.
    pub async fn run(&mut self, keys: &[String], query: Option<&str>) -> Result<Dataset> {
        let query = query.map(iplens_query::parse).transpose()?;
        let dataset = self.lookup(keys).await?;

        Ok(match query {
            Some(query) => {
                let result = query.apply(&dataset);
                debug!(
                    looked_up = dataset.len(),
                    matched = result.len(),
                    "Applied query"
                );
                result
            }
            None => dataset,
        })
    }

    /// Save every source's cache.
    ///
    /// All sources are attempted even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first save error.
    pub async fn save_caches(&mut self) -> Result<()> {
        let mut first_error = None;

        for source in &mut self.sources {
            if let Err(e) = source.save_cache().await {
                warn!(source = source.name(), error = %e, "Failed to save cache");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
