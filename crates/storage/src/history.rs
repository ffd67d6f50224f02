//! History iteration over a key's version chain
//!
//! A [`HistoryIterator`] walks one key's versions oldest to newest. It holds an
//! [`IteratorGuard`] that keeps the store's open-iterator count accurate: the
//! count is released exactly once, whether the iterator is exhausted, fails,
//! is closed explicitly, or is simply dropped.

use crate::error::{Result, StorageError};
use crate::versioned::{KeyModification, VersionedStore};
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// IteratorGuard
// ============================================================================

/// RAII registration of an open iterator
pub(crate) struct IteratorGuard<'a> {
    counter: Option<&'a AtomicUsize>,
}

impl<'a> IteratorGuard<'a> {
    pub(crate) fn acquire(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self {
            counter: Some(counter),
        }
    }

    fn release(&mut self) {
        if let Some(counter) = self.counter.take() {
            counter.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl Drop for IteratorGuard<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

// ============================================================================
// HistoryIterator
// ============================================================================

/// Front-to-back iterator over the versions of one key
///
/// The end position is fixed when the iterator is opened, so versions
/// appended later are not observed. After the first error the iterator is
/// fused and yields `None`.
pub struct HistoryIterator<'a> {
    store: &'a VersionedStore,
    key: String,
    position: usize,
    end: usize,
    guard: IteratorGuard<'a>,
    done: bool,
}

impl<'a> HistoryIterator<'a> {
    pub(crate) fn new(
        store: &'a VersionedStore,
        key: String,
        end: usize,
        guard: IteratorGuard<'a>,
    ) -> Self {
        Self {
            store,
            key,
            position: 0,
            end,
            guard,
            done: false,
        }
    }

    /// Versions not yet yielded
    pub fn remaining(&self) -> usize {
        if self.done {
            0
        } else {
            self.end - self.position
        }
    }

    /// Release the iterator early
    pub fn close(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.done = true;
        self.guard.release();
    }
}

impl Iterator for HistoryIterator<'_> {
    type Item = Result<KeyModification>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Err(e) = self.store.check_open() {
            self.finish();
            return Some(Err(e));
        }
        if self.position >= self.end {
            self.finish();
            return None;
        }

        match self.store.entry_at(&self.key, self.position) {
            Some(modification) => {
                self.position += 1;
                Some(Ok(modification))
            }
            None => {
                // Chains are append-only; a missing slot below `end` means
                // the store was torn down underneath us.
                self.finish();
                Some(Err(StorageError::Closed))
            }
        }
    }
}

impl std::fmt::Debug for HistoryIterator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryIterator")
            .field("key", &self.key)
            .field("position", &self.position)
            .field("end", &self.end)
            .field("done", &self.done)
            .finish()
    }
}
