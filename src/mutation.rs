//! Chunked batch deletion of marked records
// src/mutation.rs
use crate::constants;
use crate::error::{BrowseError, Result};
use crate::records::DeleteWrite;
use crate::session::Session;
use crate::store::RecordStore;
use log::{debug, info};

/// Outcome of one applyWrites chunk
#[derive(Debug)]
pub struct ChunkOutcome {
    pub index: usize,
    pub size: usize,
    pub error: Option<BrowseError>,
}

impl ChunkOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-chunk results of one batch delete run.
///
/// Chunks are submitted sequentially; the first failure ends the run with
/// the remaining chunks unattempted and the earlier chunks committed. The
/// report keeps that partial state explicit instead of collapsing it into a
/// single error.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub chunks: Vec<ChunkOutcome>,
}

impl BatchReport {
    /// Number of delete operations committed by successful chunks
    pub fn applied(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.is_ok())
            .map(|c| c.size)
            .sum()
    }

    /// Whether every chunk was applied
    pub fn is_complete(&self) -> bool {
        self.chunks.iter().all(ChunkOutcome::is_ok)
    }

    pub fn first_error(&self) -> Option<&BrowseError> {
        self.chunks.iter().find_map(|c| c.error.as_ref())
    }

    /// Collapse to the applied count, or the first chunk error for callers
    /// that want fail-fast semantics
    pub fn into_result(self) -> Result<usize> {
        let applied = self.applied();
        match self.chunks.into_iter().find_map(|c| c.error) {
            Some(err) => Err(err),
            None => Ok(applied),
        }
    }
}

/// Map every marked record to a delete operation, preserving store order
pub fn collect_deletes(store: &RecordStore, collection: &str) -> Vec<DeleteWrite> {
    store
        .records()
        .iter()
        .filter(|r| r.marked)
        .map(|r| DeleteWrite::new(collection, &r.rkey))
        .collect()
}

/// Delete every marked record in bounded sequential chunks.
///
/// The store is not touched: on success the caller is expected to discard
/// and reload the view rather than reconcile it record by record.
pub async fn delete_marked(
    session: &Session,
    store: &RecordStore,
    collection: &str,
) -> BatchReport {
    let writes = collect_deletes(store, collection);
    info!(
        "batch delete: {} marked records in {}",
        writes.len(),
        collection
    );
    submit_deletes(session, &writes).await
}

/// Submit delete writes in chunks of at most
/// [`constants::APPLY_WRITES_BATCH_SIZE`], awaiting each chunk before the
/// next. Never parallel; stops at the first failed chunk.
pub async fn submit_deletes(session: &Session, writes: &[DeleteWrite]) -> BatchReport {
    let mut report = BatchReport::default();
    for (index, chunk) in writes.chunks(constants::APPLY_WRITES_BATCH_SIZE).enumerate() {
        match session.apply_deletes(chunk).await {
            Ok(()) => {
                debug!("chunk {}: applied {} deletes", index, chunk.len());
                report.chunks.push(ChunkOutcome {
                    index,
                    size: chunk.len(),
                    error: None,
                });
            }
            Err(e) => {
                // Committed chunks stay committed; nothing is rolled back
                report.chunks.push(ChunkOutcome {
                    index,
                    size: chunk.len(),
                    error: Some(e),
                });
                break;
            }
        }
    }
    report
}
