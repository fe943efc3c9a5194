//! Append-only in-memory store for one collection view, with observer notifications
// src/store.rs
use crate::records::{ListedRecord, RecordEntry};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// Change notifications emitted by the store.
///
/// A rendering layer subscribes once and redraws from the events instead of
/// polling. All methods default to no-ops so observers implement only what
/// they consume.
pub trait StoreObserver: Send + Sync {
    fn on_appended(&self, _start: usize, _count: usize) {}
    fn on_notes_applied(&self, _start: usize, _count: usize) {}
    fn on_selection_changed(&self) {}
    fn on_reset(&self) {}
}

/// Ordered record store for one (repository, collection, direction) view.
///
/// Records only ever grow by append while the view lives; flipping the sort
/// direction resets the store and cursor so the next fetch starts from the
/// beginning. Pages are stored in arrival order and never de-duplicated.
pub struct RecordStore {
    records: Vec<RecordEntry>,
    cursor: Option<String>,
    reverse: bool,
    observers: Vec<Arc<dyn StoreObserver>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            cursor: None,
            reverse: false,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RecordEntry] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&RecordEntry> {
        self.records.get(index)
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Whether another page is known to exist
    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Change the sort direction. A change discards all fetched state: the
    /// next fetch starts over from an empty store with no cursor.
    pub fn set_reverse(&mut self, reverse: bool) {
        if self.reverse != reverse {
            self.reverse = reverse;
            self.reset();
        }
    }

    /// Drop all records, the cursor, and any selection state
    pub fn reset(&mut self) {
        let prev = self.records.len();
        self.records.clear();
        self.cursor = None;
        debug!("store reset: dropped {} records", prev);
        for obs in &self.observers {
            obs.on_reset();
        }
    }

    /// Append one fetched page and apply the cursor rule: a page shorter than
    /// the requested limit clears the cursor (no more pages); a full page
    /// stores the server's next token. Returns the appended range.
    pub fn apply_page(
        &mut self,
        page: Vec<ListedRecord>,
        next_cursor: Option<String>,
        limit: usize,
    ) -> (usize, usize) {
        self.cursor = if page.len() < limit { None } else { next_cursor };

        let start = self.records.len();
        let count = page.len();
        self.records
            .extend(page.into_iter().map(RecordEntry::from_listed));
        debug!(
            "store append: +{} records, total {}, cursor {}",
            count,
            self.records.len(),
            if self.cursor.is_some() { "set" } else { "cleared" }
        );
        for obs in &self.observers {
            obs.on_appended(start, count);
        }
        (start, count)
    }

    /// Attach notes to the records appended at `start..`, looked up by each
    /// record's subject. Earlier pages are left untouched.
    pub fn apply_notes(&mut self, start: usize, notes: &HashMap<String, String>) {
        let mut applied = 0usize;
        for record in &mut self.records[start..] {
            let note = record.subject().and_then(|s| notes.get(s));
            if let Some(note) = note {
                record.note = Some(note.clone());
                applied += 1;
            }
        }
        let count = self.records.len() - start;
        debug!("store notes: {} of {} records annotated", applied, count);
        for obs in &self.observers {
            obs.on_notes_applied(start, count);
        }
    }

    /// Indices of records matching the active filter, in store order
    pub fn visible_indices(&self, filter: &str) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches(filter))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn marked_count(&self) -> usize {
        self.records.iter().filter(|r| r.marked).count()
    }

    // ------------------------------------------------------------------
    // Selection primitives. These are driven by SelectionModel; nothing
    // else flips the marked flag.
    // ------------------------------------------------------------------

    pub(crate) fn toggle_marked(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            record.marked = !record.marked;
            self.notify_selection();
        }
    }

    pub(crate) fn mark_range(&mut self, lo: usize, hi: usize, marked: bool) {
        let hi = hi.min(self.records.len().saturating_sub(1));
        if lo > hi || self.records.is_empty() {
            return;
        }
        for record in &mut self.records[lo..=hi] {
            record.marked = marked;
        }
        self.notify_selection();
    }

    pub(crate) fn mark_indices(&mut self, indices: &[usize], marked: bool) {
        for &index in indices {
            if let Some(record) = self.records.get_mut(index) {
                record.marked = marked;
            }
        }
        self.notify_selection();
    }

    pub(crate) fn clear_marks(&mut self) {
        for record in &mut self.records {
            record.marked = false;
        }
        self.notify_selection();
    }

    fn notify_selection(&self) {
        for obs in &self.observers {
            obs.on_selection_changed();
        }
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
