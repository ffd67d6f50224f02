//! Multi-version key store
//!
//! Every key owns an append-only chain of [`KeyModification`]s. A write never
//! replaces an entry; it appends one. The current value of a key is the last
//! entry of its chain unless that entry is a tombstone.
//!
//! # Design
//!
//! - DashMap: sharded by key, lock-free reads
//! - FxHasher: fast non-crypto hash for string keys
//! - Chains are append-only; readers address entries by position, so an
//!   iterator that fixed its end position at open time sees a stable prefix
//!
//! # Thread Safety
//!
//! All operations are thread-safe. Ordering of writes *across* transactions
//! is the caller's job: the ledger applies one transaction at a time.

use crate::error::{Result, StorageError};
use crate::history::{HistoryIterator, IteratorGuard};
use dashmap::DashMap;
use idledger_core::{CommitTime, TxId};
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// One write to a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    /// Transaction that wrote this version
    pub tx_id: TxId,
    /// Value written; `None` is a tombstone
    pub value: Option<Vec<u8>>,
    /// Commit time of the transaction
    pub timestamp: CommitTime,
    /// Block (commit ordinal) of the transaction
    pub block: u64,
}

impl KeyModification {
    /// Whether this version deletes the key
    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}

/// A buffered write produced by a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Write `value` under `key`
    Put {
        /// Target key
        key: String,
        /// New value
        value: Vec<u8>,
    },
    /// Tombstone `key`
    Delete {
        /// Target key
        key: String,
    },
}

impl Mutation {
    /// Key this mutation targets
    pub fn key(&self) -> &str {
        match self {
            Mutation::Put { key, .. } | Mutation::Delete { key } => key,
        }
    }
}

/// Version chain of a single key
#[derive(Debug, Default)]
pub(crate) struct VersionChain {
    pub(crate) versions: Vec<KeyModification>,
}

type Chains = DashMap<String, VersionChain, BuildHasherDefault<FxHasher>>;

/// Multi-version store: DashMap by key, append-only chain within
pub struct VersionedStore {
    chains: Chains,
    /// Block of the last applied transaction
    version: AtomicU64,
    /// History iterators currently open
    open_iterators: AtomicUsize,
    closed: AtomicBool,
}

impl VersionedStore {
    /// Create new empty store
    pub fn new() -> Self {
        Self {
            chains: DashMap::with_hasher(Default::default()),
            version: AtomicU64::new(0),
            open_iterators: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Block of the last applied transaction
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Number of keys that have ever been written
    pub fn key_count(&self) -> usize {
        self.chains.len()
    }

    /// Number of history iterators not yet released
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::Acquire)
    }

    /// Whether [`VersionedStore::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the store. Subsequent reads and writes fail with `Closed`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    /// Current value of a key; `None` if never written or deleted
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.check_open()?;
        Ok(self
            .chains
            .get(key)
            .and_then(|chain| chain.versions.last().and_then(|m| m.value.clone())))
    }

    /// Whether a key currently holds a live value
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.check_open()?;
        Ok(self
            .chains
            .get(key)
            .map(|chain| chain.versions.last().is_some_and(|m| !m.is_delete()))
            .unwrap_or(false))
    }

    /// Number of versions recorded for a key
    pub fn version_count(&self, key: &str) -> usize {
        self.chains
            .get(key)
            .map(|chain| chain.versions.len())
            .unwrap_or(0)
    }

    /// Apply a transaction's mutations as one batch.
    ///
    /// Every key is validated before anything is written, so a rejected batch
    /// leaves the store untouched.
    pub fn apply(
        &self,
        mutations: &[Mutation],
        tx_id: TxId,
        timestamp: CommitTime,
        block: u64,
    ) -> Result<()> {
        self.check_open()?;
        if mutations.iter().any(|m| m.key().is_empty()) {
            return Err(StorageError::EmptyKey);
        }

        for mutation in mutations {
            let (key, value) = match mutation {
                Mutation::Put { key, value } => (key, Some(value.clone())),
                Mutation::Delete { key } => (key, None),
            };
            self.chains
                .entry(key.clone())
                .or_default()
                .versions
                .push(KeyModification {
                    tx_id,
                    value,
                    timestamp,
                    block,
                });
        }

        self.version.fetch_max(block, Ordering::AcqRel);
        tracing::trace!(%tx_id, block, writes = mutations.len(), "applied mutations");
        Ok(())
    }

    /// Open a front-to-back iterator over a key's versions.
    ///
    /// The iterator covers the versions present at open time. It must be
    /// dropped (or closed) to release it; [`VersionedStore::open_iterators`]
    /// counts the ones still held.
    pub fn history(&self, key: &str) -> Result<HistoryIterator<'_>> {
        self.check_open()?;
        let end = self.version_count(key);
        let guard = IteratorGuard::acquire(&self.open_iterators);
        Ok(HistoryIterator::new(self, key.to_string(), end, guard))
    }

    /// Entry at `index` of a key's chain
    pub(crate) fn entry_at(&self, key: &str, index: usize) -> Option<KeyModification> {
        self.chains
            .get(key)
            .and_then(|chain| chain.versions.get(index).cloned())
    }
}

impl Default for VersionedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VersionedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedStore")
            .field("key_count", &self.key_count())
            .field("version", &self.version())
            .field("open_iterators", &self.open_iterators())
            .field("closed", &self.is_closed())
            .finish()
    }
}
