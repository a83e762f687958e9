//! Store statistics.
//!
//! A quick summary of what has been ingested, used by `cpedict stats` to
//! confirm that a fetch populated the store.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::store::{close_after, open_store};

/// Run the stats command: count live records and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = open_store(&config.db).await?;
    let count = store.count().await.context("Failed to count records");
    let count = close_after(store.as_ref(), count).await?;

    println!("CPE Dictionary — Store Stats");
    println!("============================");
    println!();
    println!("  Dialect:     {}", store.name());
    if store.name() == "sqlite3" {
        let db_size = std::fs::metadata(&config.db.path)
            .map(|m| m.len())
            .unwrap_or(0);
        println!("  Database:    {}", config.db.path.display());
        println!("  Size:        {}", format_bytes(db_size));
    }
    println!("  Records:     {}", count);
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
