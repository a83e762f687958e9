//! Ingestion pipeline orchestration.
//!
//! Coordinates the full run: download → gunzip → parse → normalize →
//! filter → chunked insert. The first failing stage aborts the run; chunks
//! already committed by the batch writer stay in the store.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::batch::write_batches;
use crate::config::{Config, FeedConfig, MalformedPolicy};
use crate::error::{ConversionError, Error};
use crate::feed::{parse_feed, FeedItem};
use crate::fetch::{decompress, fetch, read_feed_file};
use crate::filter::canonical_titles;
use crate::models::CategorizedCpe;
use crate::naming::{bind_to_fs, bind_to_uri, unbind_fs};
use crate::store::{close_after, open_store, Store};

/// Knobs for a single ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub chunk_size: usize,
    pub on_malformed: MalformedPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            on_malformed: MalformedPolicy::Abort,
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestSummary {
    /// Items in the feed.
    pub items: usize,
    /// Items dropped under [`MalformedPolicy::Skip`].
    pub skipped: usize,
    pub records: usize,
    pub chunks: usize,
}

/// CLI overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct FetchOverrides {
    pub proxy: Option<String>,
    pub chunk_size: Option<usize>,
    pub skip_malformed: bool,
}

/// Normalize feed items into storable records.
///
/// Each item is unbound once; every canonical-locale title yields one
/// record carrying the same URI and formatted-string bindings. Items with
/// no canonical title produce nothing. Returns the records and the number
/// of items skipped as malformed.
pub fn convert_items(
    items: &[FeedItem],
    policy: MalformedPolicy,
) -> Result<(Vec<CategorizedCpe>, usize), ConversionError> {
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for item in items {
        let wfn = match unbind_fs(&item.name) {
            Ok(wfn) => wfn,
            Err(e) if policy == MalformedPolicy::Skip => {
                warn!(name = %item.name, reason = %e.reason, "skipping malformed CPE name");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let titles = canonical_titles(item);
        if titles.is_empty() {
            continue;
        }

        let cpe_uri = bind_to_uri(&wfn);
        let cpe_fs = bind_to_fs(&wfn);
        records.extend(titles.into_iter().map(|title| CategorizedCpe {
            title: title.to_string(),
            cpe_uri: cpe_uri.clone(),
            cpe_fs: cpe_fs.clone(),
        }));
    }

    Ok((records, skipped))
}

/// Parse, normalize and store an uncompressed feed document.
pub async fn ingest_feed(
    store: &dyn Store,
    xml: &[u8],
    options: &IngestOptions,
) -> Result<IngestSummary, Error> {
    let items = parse_feed(xml)?;
    info!(items = items.len(), "feed parsed");

    let (records, skipped) = convert_items(&items, options.on_malformed)?;
    info!(records = records.len(), skipped, "feed normalized");

    let batch = write_batches(store, &records, options.chunk_size).await?;

    Ok(IngestSummary {
        items: items.len(),
        skipped,
        records: batch.records,
        chunks: batch.chunks,
    })
}

/// Download the configured feed and inflate it.
pub async fn download_feed(feed: &FeedConfig) -> Result<Vec<u8>, Error> {
    let compressed = fetch(&feed.url, &feed.fetch_options()).await?;
    Ok(decompress(&compressed)?)
}

/// `cpedict fetch`: ingest the remote feed, or a local file when given.
pub async fn run_fetch(
    config: &Config,
    file: Option<&Path>,
    overrides: &FetchOverrides,
) -> Result<()> {
    let mut feed = config.feed.clone();
    if let Some(proxy) = &overrides.proxy {
        feed.proxy = Some(proxy.clone());
    }

    let options = IngestOptions {
        chunk_size: overrides.chunk_size.unwrap_or(config.ingest.chunk_size),
        on_malformed: if overrides.skip_malformed {
            MalformedPolicy::Skip
        } else {
            config.ingest.on_malformed
        },
    };

    let (source, xml) = match file {
        Some(path) => (
            path.display().to_string(),
            read_feed_file(path)
                .await
                .with_context(|| format!("Failed to load feed from {}", path.display()))?,
        ),
        None => (
            feed.url.clone(),
            download_feed(&feed)
                .await
                .with_context(|| format!("Failed to download feed from {}", feed.url))?,
        ),
    };

    let store = open_store(&config.db).await?;
    let result = ingest_feed(store.as_ref(), &xml, &options).await;
    let summary = close_after(store.as_ref(), result.map_err(Into::into)).await?;

    println!("fetch {}", source);
    println!("  store: {}", store.name());
    println!("  items parsed: {}", summary.items);
    if summary.skipped > 0 {
        println!("  items skipped: {}", summary.skipped);
    }
    println!("  records written: {}", summary.records);
    println!("  chunks committed: {}", summary.chunks);
    println!("ok");

    Ok(())
}
