use std::sync::Arc;

use parking_lot::RwLock;

use super::index::HistoryIndex;

/// A swappable handle to the current index.
///
/// Readers take an `Arc` snapshot and query it without holding the lock, so a
/// rebuild running at the same time never exposes a half-built index: the
/// new index is built off to the side and swapped in whole.
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Arc<HistoryIndex>>,
}

impl SharedIndex {
    pub fn new(index: HistoryIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn snapshot(&self) -> Arc<HistoryIndex> {
        Arc::clone(&self.current.read())
    }

    /// Install a new index, returning the one it replaced
    pub fn replace(&self, index: HistoryIndex) -> Arc<HistoryIndex> {
        std::mem::replace(&mut *self.current.write(), Arc::new(index))
    }

    /// Build a new index from the current snapshot and swap it in.
    ///
    /// `rebuild` runs without the lock held. Concurrent `update` calls are not
    /// serialized against each other; the last swap wins.
    pub fn update<F>(&self, rebuild: F) -> Arc<HistoryIndex>
    where
        F: FnOnce(&HistoryIndex) -> HistoryIndex,
    {
        let base = self.snapshot();
        let next = rebuild(&base);
        self.replace(next);
        self.snapshot()
    }
}
