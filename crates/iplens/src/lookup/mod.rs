//! Field-data providers.
//!
//! A [`FieldSource`] turns a record key (an IP address) into a [`Record`]
//! of string fields. The two HTTP sources, [`GeoLookup`] and
//! [`RdapLookup`], each own an [`ExpiringCache`](crate::cache::ExpiringCache)
//! of raw JSON responses and only go to the network on a cache miss.
//!
//! # Flattening
//!
//! Responses are JSON objects. [`flatten_json`] maps each top-level member
//! to one field: strings are used verbatim, numbers and booleans are
//! formatted, `null` becomes the empty string, and nested arrays or objects
//! are kept as compact JSON text. Querying therefore only ever sees strings.

use crate::error::Result;
use async_trait::async_trait;
use iplens_query::Record;
use serde_json::Value;

pub mod geo;
pub mod rdap;

pub use geo::GeoLookup;
pub use rdap::RdapLookup;

/// A source of per-key field data.
///
/// Sources are owned by the [`App`](crate::app::App) context and called
/// sequentially, so `fetch` takes `&mut self` to update the source's cache.
#[async_trait]
pub trait FieldSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns the fields this source knows about `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be retrieved.
    async fn fetch(&mut self, key: &str) -> Result<Record>;

    /// Persists any cached data.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written.
    async fn save_cache(&mut self) -> Result<()>;
}

/// Converts a JSON response into a flat [`Record`].
///
/// Non-object payloads carry no fields and yield an empty record.
#[must_use]
pub fn flatten_json(value: Value) -> Record {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(field, value)| (field, field_value(value)))
            .collect(),
        Value::Null => Record::new(),
        other => {
            tracing::warn!(payload = %other, "Ignoring non-object lookup payload");
            Record::new()
        }
    }
}

fn field_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested @ (Value::Array(_) | Value::Object(_)) => nested.to_string(),
    }
}
