//! Cursor-paginated record listing for one collection view
// src/listing.rs
use crate::constants;
use crate::enrich;
use crate::error::Result;
use crate::session::Session;
use crate::store::RecordStore;
use log::debug;
use tokio::sync::watch;

/// Tunables for a listing session
#[derive(Debug, Clone)]
pub struct ListerConfig {
    /// Records requested per page, clamped to the protocol limit
    pub page_limit: usize,
    /// Keep fetching while a cursor remains instead of stopping per page
    pub auto_continue: bool,
    /// Run profile enrichment on eligible collections
    pub enrich: bool,
    /// Cooperative cancellation for the auto-continue loop, checked between
    /// pages. An in-flight page is still awaited, never aborted mid-call.
    pub shutdown_rx: Option<watch::Receiver<bool>>,
}

impl Default for ListerConfig {
    fn default() -> Self {
        Self {
            page_limit: constants::LIST_PAGE_LIMIT,
            auto_continue: false,
            enrich: true,
            shutdown_rx: None,
        }
    }
}

impl ListerConfig {
    fn effective_limit(&self) -> usize {
        self.page_limit.clamp(1, constants::LIST_PAGE_LIMIT)
    }
}

/// Drives page fetches for one (repository, collection, direction) view.
///
/// Owns the record store for that view. All fetching is sequential: a
/// loading flag gates re-entry, and the auto-continue loop awaits each page
/// before requesting the next.
pub struct RecordLister {
    session: Session,
    collection: String,
    store: RecordStore,
    config: ListerConfig,
    loading: bool,
}

impl RecordLister {
    pub fn new(session: Session, collection: impl Into<String>, config: ListerConfig) -> Self {
        Self {
            session,
            collection: collection.into(),
            store: RecordStore::new(),
            config,
            loading: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Flip the sort direction; a change resets the store and cursor so the
    /// next fetch starts over
    pub fn set_reverse(&mut self, reverse: bool) {
        self.store.set_reverse(reverse);
    }

    /// Fetch one page, or every remaining page under auto-continue
    pub async fn fetch(&mut self) -> Result<usize> {
        if self.config.auto_continue {
            self.fetch_all().await
        } else {
            self.fetch_next_page().await
        }
    }

    /// Fetch the next page and append it to the store.
    ///
    /// Gated by the loading flag: a call while a fetch is outstanding is a
    /// no-op returning 0, mirroring a disabled load-more affordance. After a
    /// successful append, eligible collections get their page enriched.
    pub async fn fetch_next_page(&mut self) -> Result<usize> {
        if self.loading {
            debug!("fetch gated: a page request is already outstanding");
            return Ok(0);
        }
        self.loading = true;
        let result = self.fetch_page_inner().await;
        self.loading = false;
        result
    }

    async fn fetch_page_inner(&mut self) -> Result<usize> {
        let limit = self.config.effective_limit();
        let output = self
            .session
            .list_records(
                &self.collection,
                limit,
                self.store.cursor(),
                self.store.reverse(),
            )
            .await?;

        let (start, count) = self.store.apply_page(output.records, output.cursor, limit);
        debug!(
            "page fetched: {} records, store at {}",
            count,
            self.store.len()
        );

        if self.config.enrich && enrich::is_enrichable(&self.session, &self.collection) {
            enrich::enrich_page(&self.session, &mut self.store, start).await?;
        }

        Ok(count)
    }

    /// Fetch sequentially until the cursor clears, a shutdown signal fires,
    /// or an error propagates. Returns the number of records appended.
    pub async fn fetch_all(&mut self) -> Result<usize> {
        let mut total = 0;
        loop {
            total += self.fetch_next_page().await?;
            if !self.store.has_more() {
                break;
            }
            if let Some(rx) = &self.config.shutdown_rx
                && *rx.borrow()
            {
                debug!("listing stopped by shutdown signal with cursor pending");
                break;
            }
        }
        Ok(total)
    }
}
