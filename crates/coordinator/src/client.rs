//! Ledger client seam
//!
//! The coordinator never touches a [`Ledger`] directly. It goes through
//! [`LedgerClient`], so the transport can be swapped (in-process today) without
//! changing the write protocol.

use async_trait::async_trait;
use idledger_core::{Error, Result, TxId};
use idledger_engine::{EventFilter, Ledger, Proposal, Subscription, TxReceipt};
use std::sync::Arc;

/// Connection to a ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Allocate a fresh transaction id for a proposal
    fn new_tx_id(&self) -> TxId;

    /// Register a private queue of commit events matching `filter`
    fn subscribe(&self, filter: EventFilter) -> Result<Subscription>;

    /// Submit a proposal and return once it is ordered
    async fn submit(&self, proposal: Proposal) -> Result<TxReceipt>;

    /// Evaluate a function against committed state
    async fn query(&self, contract_id: &str, function: &str, args: Vec<String>) -> Result<Vec<u8>>;
}

/// [`LedgerClient`] over an in-process [`Ledger`]
#[derive(Debug, Clone)]
pub struct LocalClient {
    ledger: Arc<Ledger>,
}

impl LocalClient {
    /// Wrap a shared ledger
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// The underlying ledger
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }
}

#[async_trait]
impl LedgerClient for LocalClient {
    fn new_tx_id(&self) -> TxId {
        TxId::new()
    }

    fn subscribe(&self, filter: EventFilter) -> Result<Subscription> {
        self.ledger.events().subscribe(filter)
    }

    async fn submit(&self, proposal: Proposal) -> Result<TxReceipt> {
        let ledger = Arc::clone(&self.ledger);
        // Submission takes the commit lock; keep it off the async workers.
        tokio::task::spawn_blocking(move || ledger.submit(proposal))
            .await
            .map_err(|e| Error::Submission(format!("submission task failed: {}", e)))?
    }

    async fn query(&self, contract_id: &str, function: &str, args: Vec<String>) -> Result<Vec<u8>> {
        self.ledger.query(contract_id, function, args)
    }
}
