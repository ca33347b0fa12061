//! CLI argument parsing and execution.
//!
//! # Example
//!
//! ```bash
//! iplens -f access.log
//! iplens -f access.log -q "GET city, name WHERE country_code = US AND region_code < CO"
//! iplens -t "8.8.8.8 1.1.1.1" -q "GET *" --json
//! iplens --explain -q "GET * WHERE country_code = US, MX"
//! ```

use crate::app::App;
use crate::config::Config;
use crate::extract::{extract_keys, extract_keys_from_file};
use crate::output::{self, OutputMode};
use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Look up IP addresses found in text and query the combined results
///
/// Addresses are enriched with geolocation and RDAP registration data.
/// Responses are cached on disk so repeated runs avoid network requests.
#[derive(Parser, Debug)]
#[command(name = "iplens")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").args(["file", "text"]).multiple(false)))]
pub struct Cli {
    /// File to extract IP addresses from
    #[arg(short, long, value_name = "PATH", required_unless_present_any = ["text", "explain"])]
    pub file: Option<PathBuf>,

    /// Text to extract IP addresses from
    #[arg(short, long)]
    pub text: Option<String>,

    /// Query to filter and project the results
    ///
    /// Syntax: `GET <fields|*> [WHERE <field>(=|>|<)<value> [AND ...]]`.
    /// `=` accepts a comma-separated list of values. All comparisons are
    /// string comparisons.
    #[arg(short, long, value_parser = validate_query)]
    pub query: Option<String>,

    /// Print the parsed query instead of running it
    #[arg(long, requires = "query")]
    pub explain: bool,

    /// Output in JSON format for programmatic use
    #[arg(long)]
    pub json: bool,

    /// Path to a YAML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Validate query syntax at argument parse time.
pub fn validate_query(s: &str) -> std::result::Result<String, String> {
    iplens_query::parse(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns a clap error if the arguments are invalid.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// Caches are saved whether or not the lookups and query succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if input cannot be read, configuration is invalid,
    /// a lookup fails, or the query does not parse.
    pub async fn execute(&self) -> Result<()> {
        let mode = OutputMode::from_json_flag(self.json);

        if self.explain {
            let Some(query) = &self.query else {
                bail!("--explain requires --query");
            };
            let query = iplens_query::parse(query)?;
            output::print_query(&query, mode)?;
            return Ok(());
        }

        let keys = match (&self.file, &self.text) {
            (Some(path), _) => extract_keys_from_file(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, Some(text)) => extract_keys(text),
            (None, None) => bail!("Either --file or --text is required"),
        };
        debug!(count = keys.len(), "Extracted addresses");

        let working_dir = std::env::current_dir()?;
        let config = Config::resolve(self.config.as_deref(), &working_dir).await?;
        let mut app = App::from_config(&config).await?;

        let result = app.run(&keys, self.query.as_deref()).await;

        if let Err(e) = app.save_caches().await {
            warn!(error = %e, "Failed to save caches");
        }

        let dataset = result?;
        output::print_dataset(&dataset, mode)?;
        Ok(())
    }
}
