//! Transaction coordinator
//!
//! Turns the asynchronous submit-then-commit flow of the ledger into
//! synchronous-looking calls for the HTTP layer.
//!
//! ## Write Protocol
//!
//! ```text
//! 1. Allocate TxId, subscribe to (contract, event, TxId)
//! 2. Submit the proposal; any failure returns at once
//! 3. Wait for the first of:
//!      commit event for TxId  -> Ok(TxId)
//!      effective deadline     -> CommitTimeout (outcome ambiguous)
//!        (the configured timeout counts from the end of step 2)
//!      cancellation           -> Cancelled (outcome ambiguous)
//!      event hub shut down    -> Closed
//! 4. Drop the subscription
//! ```
//!
//! The subscription is a local value, so it is released on every exit path.
//! Reads are plain queries with no subscription and no timeout.

use crate::client::{LedgerClient, LocalClient};
use crate::config::CoordinatorConfig;
use crate::options::CallOptions;
use idledger_core::history::decode_compat;
use idledger_core::{Error, Record, Result, TxId, VersionEntry};
use idledger_engine::{EventFilter, Ledger, Proposal};
use std::sync::Arc;
use tokio::time::Instant;

/// Client-side write coordinator and read proxy for the record contract
#[derive(Clone)]
pub struct TransactionCoordinator {
    client: Arc<dyn LedgerClient>,
    contract_id: Arc<str>,
    config: Arc<CoordinatorConfig>,
}

impl TransactionCoordinator {
    /// Coordinator over an arbitrary client
    pub fn new(
        client: Arc<dyn LedgerClient>,
        contract_id: impl Into<String>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            client,
            contract_id: Arc::from(contract_id.into()),
            config: Arc::new(config),
        }
    }

    /// Coordinator over an in-process ledger
    pub fn local(
        ledger: Arc<Ledger>,
        contract_id: impl Into<String>,
        config: CoordinatorConfig,
    ) -> Self {
        Self::new(Arc::new(LocalClient::new(ledger)), contract_id, config)
    }

    /// Contract this coordinator targets
    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Active configuration
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Register a new record and wait for it to commit
    pub async fn create(&self, record: &Record, opts: CallOptions) -> Result<TxId> {
        self.submit_and_wait("create", record.to_args(), &opts).await
    }

    /// Change one attribute of a record and wait for it to commit
    pub async fn update(
        &self,
        passport: &str,
        field: &str,
        value: &str,
        opts: CallOptions,
    ) -> Result<TxId> {
        let args = vec![passport.to_string(), field.to_string(), value.to_string()];
        self.submit_and_wait("update", args, &opts).await
    }

    /// Submit `function(args)` and wait for its commit notification
    pub async fn submit_and_wait(
        &self,
        function: &str,
        args: Vec<String>,
        opts: &CallOptions,
    ) -> Result<TxId> {
        let tx_id = self.client.new_tx_id();
        if opts.is_cancelled() {
            return Err(Error::Cancelled(tx_id));
        }

        let filter = EventFilter::new(&*self.contract_id, self.config.event_name.as_str())
            .for_tx(tx_id);
        let mut subscription = self.client.subscribe(filter)?;

        let proposal = Proposal::new(tx_id, &*self.contract_id, function, args);
        if let Err(e) = self.client.submit(proposal).await {
            tracing::debug!(%tx_id, function, error = %e, "submission failed");
            return Err(e);
        }

        // The commit window opens once the proposal is ordered.
        let started = Instant::now();
        let deadline = opts.effective_deadline(started + self.config.commit_timeout());

        tokio::select! {
            biased;

            event = subscription.recv() => match event {
                Some(event) => {
                    tracing::debug!(%tx_id, function, block = event.block, "commit observed");
                    Ok(tx_id)
                }
                None => Err(Error::Closed),
            },
            _ = tokio::time::sleep_until(deadline) => {
                let waited_ms = started.elapsed().as_millis() as u64;
                tracing::warn!(%tx_id, function, waited_ms, "no commit notification before deadline");
                Err(Error::CommitTimeout { tx_id, waited_ms })
            }
            _ = opts.cancelled() => {
                tracing::debug!(%tx_id, function, "wait cancelled");
                Err(Error::Cancelled(tx_id))
            }
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current record for `passport`
    pub async fn read(&self, passport: &str) -> Result<Record> {
        let bytes = self.read_raw(passport).await?;
        Record::from_json(&bytes)
    }

    /// Current record JSON as stored
    pub async fn read_raw(&self, passport: &str) -> Result<Vec<u8>> {
        self.client
            .query(&self.contract_id, "read", vec![passport.to_string()])
            .await
    }

    /// Every version of `passport`, oldest first
    pub async fn history(&self, passport: &str) -> Result<Vec<VersionEntry>> {
        let bytes = self
            .client
            .query(&self.contract_id, "history", vec![passport.to_string()])
            .await?;
        decode_compat(&bytes)
    }
}

impl std::fmt::Debug for TransactionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionCoordinator")
            .field("contract_id", &self.contract_id)
            .field("config", &self.config)
            .finish()
    }
}
