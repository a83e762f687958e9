//! Chunked batch writer.
//!
//! Records are written in order, `chunk_size` at a time, one store
//! transaction per chunk. Atomicity is per chunk: when chunk `k` fails,
//! chunks `0..k` stay committed and nothing after `k` is attempted.

use tracing::{debug, info};

use crate::error::{Error, StoreError};
use crate::models::CategorizedCpe;
use crate::store::Store;

/// Outcome of a successful [`write_batches`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub chunks: usize,
    pub records: usize,
}

/// Write `records` to `store` in successive chunks of at most `chunk_size`.
///
/// Every chunk but the last holds exactly `chunk_size` records. An empty
/// input writes nothing and succeeds.
pub async fn write_batches(
    store: &dyn Store,
    records: &[CategorizedCpe],
    chunk_size: usize,
) -> Result<BatchSummary, Error> {
    if chunk_size == 0 {
        return Err(Error::Store {
            chunk: 0,
            committed: 0,
            source: StoreError::InvalidChunkSize,
        });
    }

    let mut summary = BatchSummary::default();
    for (index, chunk) in records.chunks(chunk_size).enumerate() {
        store
            .insert_cpes(chunk)
            .await
            .map_err(|source| Error::Store {
                chunk: index,
                committed: summary.records,
                source,
            })?;
        summary.chunks += 1;
        summary.records += chunk.len();
        debug!(chunk = index, size = chunk.len(), total = summary.records, "chunk committed");
    }

    info!(
        store = store.name(),
        chunks = summary.chunks,
        records = summary.records,
        "batch write complete"
    );
    Ok(summary)
}
