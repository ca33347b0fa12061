//! Error types for iplens operations.

use std::io;
use thiserror::Error;

/// The error type for iplens operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache file could not be read back.
    #[error("Cache error in {path}: {message}")]
    Cache {
        /// Path of the cache file
        path: String,
        /// What went wrong
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A lookup service answered with an unexpected status.
    #[error("{source_name} lookup failed for {key}: {message}")]
    Lookup {
        /// Name of the lookup source
        source_name: String,
        /// Record key being looked up
        key: String,
        /// Description of the failure
        message: String,
    },

    /// The query string did not parse.
    #[error(transparent)]
    Query(#[from] iplens_query::QueryError),
}

/// A specialized Result type for iplens operations.
pub type Result<T> = std::result::Result<T, Error>;
