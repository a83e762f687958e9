//! Title lookup.
//!
//! Read-only path over a [`Store`]. An empty result is a normal outcome;
//! only a store failure is an error. Used by the `cpedict lookup` command.

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::CategorizedCpe;
use crate::store::{close_after, open_store, Store};

/// Records whose title equals `title` byte for byte.
pub async fn get_by_exact_title(
    store: &dyn Store,
    title: &str,
) -> Result<Vec<CategorizedCpe>, StoreError> {
    let found = store.get_by_exact_title(title).await?;
    debug!(title, matches = found.len(), "exact title lookup");
    Ok(found)
}

/// Records whose title contains `title` as a literal substring.
pub async fn get_by_like_title(
    store: &dyn Store,
    title: &str,
) -> Result<Vec<CategorizedCpe>, StoreError> {
    let found = store.get_by_like_title(title).await?;
    debug!(title, matches = found.len(), "substring title lookup");
    Ok(found)
}

/// CLI entry point: look up `title` and print the matches to stdout.
pub async fn run_lookup(config: &Config, title: &str, like: bool, json: bool) -> Result<()> {
    let store = open_store(&config.db).await?;
    let result = if like {
        get_by_like_title(store.as_ref(), title).await
    } else {
        get_by_exact_title(store.as_ref(), title).await
    };
    let records = close_after(store.as_ref(), result.context("Lookup failed")).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    for (i, cpe) in records.iter().enumerate() {
        println!("{}. {}", i + 1, cpe.title);
        println!("    uri: {}", cpe.cpe_uri);
        println!("    fs:  {}", cpe.cpe_fs);
    }
    println!();
    println!("{} record(s)", records.len());

    Ok(())
}
