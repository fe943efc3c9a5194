//! Shift-click selection over the record store
// src/selection.rs
//
// Indices here address the full store, not the filtered view. When a filter
// is active the rendered list may hide rows inside an anchor..index range;
// shift-extend still marks them. Re-basing ranges onto the filtered view
// would change which rows a range covers, so the behavior is kept and
// documented instead.
use crate::store::RecordStore;

/// Anchor plus batch-mode state for range selection.
///
/// The per-record marked flags live on the store; this model decides which
/// indices they are applied to.
#[derive(Debug, Default)]
pub struct SelectionModel {
    anchor: Option<usize>,
    batch_mode: bool,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn batch_mode(&self) -> bool {
        self.batch_mode
    }

    /// Flip one record's mark. A plain click re-anchors the range here; a
    /// shift-click leaves the anchor where it was.
    pub fn toggle(&mut self, store: &mut RecordStore, index: usize, shift: bool) {
        if index >= store.len() {
            return;
        }
        store.toggle_marked(index);
        if !shift {
            self.anchor = Some(index);
        }
    }

    /// Mark the inclusive range between the anchor and `index`, whichever
    /// side of the anchor it falls on. No-op without an anchor; the anchor
    /// stays put.
    pub fn shift_extend(&mut self, store: &mut RecordStore, index: usize) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let (lo, hi) = if anchor <= index {
            (anchor, index)
        } else {
            (index, anchor)
        };
        store.mark_range(lo, hi, true);
    }

    /// Mark every record matching the active filter; everything the filter
    /// hides is left unchanged
    pub fn select_all_visible(&mut self, store: &mut RecordStore, filter: &str) {
        let indices = store.visible_indices(filter);
        store.mark_indices(&indices, true);
    }

    /// Clear every mark, filtered or not, and drop the anchor
    pub fn unselect_all(&mut self, store: &mut RecordStore) {
        store.clear_marks();
        self.anchor = None;
    }

    /// Enter or leave batch mode. Both directions drop all marks and the
    /// anchor so no stale selection survives the switch.
    pub fn set_batch_mode(&mut self, store: &mut RecordStore, on: bool) {
        store.clear_marks();
        self.anchor = None;
        self.batch_mode = on;
    }
}
