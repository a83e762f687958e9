//! Structured logging to stderr.
//!
//! Stdout carries command reports only, so diagnostics go to stderr.
//! `RUST_LOG` takes precedence over the `--verbose` default.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "info,cpe_dictionary=debug,cpedict=debug"
    } else {
        "info,sqlx=warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    tracing::debug!("logging initialized");
    Ok(())
}
