//! In-memory stream catalog and playback selection.
//!
//! The catalog is an ordered list of [`StreamEntry`] values (arrival order,
//! unique ids) plus a selection pointer that is either empty or a valid
//! index into that list.
//!
//! ## Selection lifecycle
//!
//! ```text
//! replace_all(non-empty)  -> Selected(0)
//! replace_all(empty)      -> Unselected
//! append   (Unselected)   -> Selected(last)
//! append   (Selected(i))  -> Selected(i)
//! select(j), j < len      -> Selected(j)
//! select(j), j >= len     -> unchanged, OutOfRange
//! ```
//!
//! Entries are never removed or reordered after being added, so the only
//! places the range invariant is checked are `append` and `select`.

use crate::error::{CatalogError, Result};
use crate::model::{RenderTarget, StreamEntry};

/// Selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing to play.
    Unselected,
    /// Entry at this index is the playback target.
    Selected(usize),
}

impl SelectionState {
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Unselected => None,
            Self::Selected(i) => Some(i),
        }
    }
}

/// Ordered collection of streams plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    entries: Vec<StreamEntry>,
    selection: Option<usize>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a full listing.
    ///
    /// Later duplicates of an id are dropped. Selection moves to the first
    /// entry, or is cleared when the listing is empty.
    pub fn replace_all(&mut self, entries: Vec<StreamEntry>) {
        let mut unique: Vec<StreamEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if unique.iter().any(|e| e.id == entry.id) {
                tracing::warn!(id = %entry.id, "dropping duplicate stream in listing");
                continue;
            }
            unique.push(entry);
        }

        self.selection = if unique.is_empty() { None } else { Some(0) };
        self.entries = unique;

        tracing::info!(
            streams = self.entries.len(),
            selection = ?self.selection,
            "catalog replaced"
        );
    }

    /// Add an entry at the end and return its index.
    ///
    /// An entry whose id is already present is not added again; the
    /// existing index is returned instead. Either way the selection only
    /// moves if nothing was selected.
    pub fn append(&mut self, entry: StreamEntry) -> usize {
        let index = match self.position(&entry.id) {
            Some(existing) => {
                tracing::debug!(id = %entry.id, index = existing, "stream already in catalog");
                existing
            }
            None => {
                self.entries.push(entry);
                let index = self.entries.len() - 1;
                tracing::info!(id = %self.entries[index].id, index, "stream appended");
                index
            }
        };

        if self.selection.is_none() {
            self.selection = Some(index);
            tracing::debug!(index, "auto-selected appended stream");
        }
        index
    }

    /// Select the entry at `index`.
    ///
    /// Out-of-range indices leave the selection untouched.
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(CatalogError::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        if self.selection != Some(index) {
            tracing::debug!(old = ?self.selection, new = index, "selection changed");
            self.selection = Some(index);
        }
        Ok(())
    }

    /// The selected entry, if any.
    pub fn current_entry(&self) -> Option<&StreamEntry> {
        self.selection.and_then(|i| self.entries.get(i))
    }

    pub fn render_target(&self) -> RenderTarget {
        RenderTarget::from(self.current_entry())
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn state(&self) -> SelectionState {
        match self.selection {
            Some(i) => SelectionState::Selected(i),
            None => SelectionState::Unselected,
        }
    }

    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}
