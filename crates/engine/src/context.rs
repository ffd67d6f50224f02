//! Transaction context handed to contracts
//!
//! A [`TxContext`] is the contract's only view of the ledger while it runs.
//! Reads go to committed state; writes are buffered in the context and only
//! reach the store if the ledger commits the transaction.
//!
//! ## Semantics
//!
//! - `get_state` sees committed state only. A key written earlier in the
//!   same transaction still reads its committed value.
//! - `del_state` records a tombstone; history keeps the delete.
//! - `set_event` keeps one event per transaction. The last call wins.

use idledger_core::{CommitTime, Error, Result, TxId};
use idledger_storage::{HistoryIterator, Mutation, StorageError, VersionedStore};

/// Event a contract asks the ledger to publish on commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvent {
    /// Event name
    pub name: String,
    /// Opaque payload
    pub payload: Vec<u8>,
}

/// Per-invocation view of the ledger
pub struct TxContext<'a> {
    tx_id: TxId,
    function: String,
    args: Vec<String>,
    timestamp: CommitTime,
    store: &'a VersionedStore,
    writes: Vec<Mutation>,
    event: Option<PendingEvent>,
}

impl<'a> TxContext<'a> {
    pub(crate) fn new(
        store: &'a VersionedStore,
        tx_id: TxId,
        function: String,
        args: Vec<String>,
        timestamp: CommitTime,
    ) -> Self {
        Self {
            tx_id,
            function,
            args,
            timestamp,
            store,
            writes: Vec::new(),
            event: None,
        }
    }

    /// Transaction id carried by the proposal
    pub fn tx_id(&self) -> TxId {
        self.tx_id
    }

    /// Invoked function name
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Positional arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Timestamp the transaction will commit with
    pub fn tx_timestamp(&self) -> CommitTime {
        self.timestamp
    }

    /// Committed value under `key`
    pub fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key).map_err(Error::from)
    }

    /// Buffer a write of `value` under `key`
    pub fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey.into());
        }
        self.writes.push(Mutation::Put {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    /// Buffer a delete of `key`
    pub fn del_state(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey.into());
        }
        self.writes.push(Mutation::Delete {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Set the event published when this transaction commits
    pub fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::Validation("event name must not be empty".into()));
        }
        self.event = Some(PendingEvent {
            name: name.to_string(),
            payload,
        });
        Ok(())
    }

    /// Open an iterator over the committed versions of `key`
    pub fn history_for_key(&self, key: &str) -> Result<HistoryIterator<'a>> {
        self.store
            .history(key)
            .map_err(|e| Error::Query(e.to_string()))
    }

    /// Buffered writes so far
    pub fn writes(&self) -> &[Mutation] {
        &self.writes
    }

    /// Event set so far
    pub fn event(&self) -> Option<&PendingEvent> {
        self.event.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Vec<Mutation>, Option<PendingEvent>) {
        (self.writes, self.event)
    }
}

impl std::fmt::Debug for TxContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxContext")
            .field("tx_id", &self.tx_id)
            .field("function", &self.function)
            .field("args", &self.args)
            .field("writes", &self.writes.len())
            .field("event", &self.event.as_ref().map(|e| &e.name))
            .finish()
    }
}
