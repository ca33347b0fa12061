//! iplens - look up IP addresses and query the results.
//!
//! This crate provides both the `iplens` CLI and a library for extracting
//! IPv4 addresses from text, enriching them with geolocation and RDAP data
//! through cached HTTP lookups, and filtering the combined records with the
//! query language from [`iplens_query`].

#![forbid(unsafe_code)]

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod lookup;
pub mod output;

pub use error::{Error, Result};
