//! # History
//!
//! Bounded, linear undo and redo over snapshots of the document's vector state.
//!
//! A snapshot is pushed after every structural change, so the entry under the cursor always describes the
//! present. Undoing moves the cursor back and restores that entry, rebuilding every layer from its strokes.
//! Pushing after an undo discards the redo branch, there is no history tree.

mod snapshot;

pub use snapshot::{LayerSnapshot, Snapshot};

use crate::{state::Document, surface::Surface};

/// Number of snapshots kept when not otherwise configured.
pub const DEFAULT_LIMIT: usize = 30;

#[derive(Debug)]
pub struct History {
    entries: std::collections::VecDeque<Snapshot>,
    /// Index of the present state. Meaningless while `entries` is empty.
    cursor: usize,
    limit: std::num::NonZeroUsize,
}
impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}
impl History {
    /// A history holding at most `limit` snapshots. A limit of zero is treated as one.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = std::num::NonZeroUsize::new(limit).unwrap_or(std::num::NonZeroUsize::MIN);
        Self {
            entries: std::collections::VecDeque::with_capacity(limit.get()),
            cursor: 0,
            limit,
        }
    }
    /// Record a new present state, discarding anything that could have been redone.
    pub fn push(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        self.cursor = self.entries.len() - 1;
        if self.entries.len() > self.limit.get() {
            self.entries.pop_front();
            self.cursor -= 1;
        }
    }
    /// Step back one entry and restore it into `document`. Returns whether anything changed.
    ///
    /// The display is not recomposited.
    pub fn undo<S: Surface>(&mut self, document: &mut Document<S>) -> bool {
        if self.entries.is_empty() || self.cursor == 0 {
            return false;
        }
        self.restore(self.cursor - 1, document)
    }
    /// Step forward one entry and restore it into `document`. Returns whether anything changed.
    ///
    /// The display is not recomposited.
    pub fn redo<S: Surface>(&mut self, document: &mut Document<S>) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.restore(self.cursor + 1, document)
    }
    fn restore<S: Surface>(&mut self, target: usize, document: &mut Document<S>) -> bool {
        let Some(snapshot) = self.entries.get(target) else {
            return false;
        };
        match snapshot.restore(document) {
            Ok(()) => {
                log::debug!("history {} -> {target} of {}", self.cursor, self.len());
                self.cursor = target;
                true
            }
            Err(err) => {
                log::warn!("failed to restore history entry {target}: {err}");
                false
            }
        }
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Index of the present entry, or `None` before the first push.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit.get()
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
    /// The snapshot describing the present state.
    #[must_use]
    pub fn present(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }
}
