//! iplens CLI binary.

use anyhow::Result;
use iplens::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the iplens CLI.
///
/// Lookups run one after another, so a current-thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=iplens=debug,iplens_query=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("iplens=info,iplens_query=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting iplens CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("iplens CLI completed successfully");
    Ok(())
}
