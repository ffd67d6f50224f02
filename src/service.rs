//! Service context.
//!
//! [`IdLedger`] owns the ledger and the coordinator in front of it. Opening
//! one bootstraps the ledger (channel, install, instantiate); dropping or
//! closing it shuts the ledger down.

use crate::config::Config;
use idledger_contract::RecordContract;
use idledger_coordinator::TransactionCoordinator;
use idledger_core::{Error, Result};
use idledger_engine::Ledger;
use std::sync::Arc;

/// A running identity ledger.
///
/// # Example
///
/// ```ignore
/// use idledger::prelude::*;
///
/// let service = IdLedger::open(Config::default())?;
/// let coordinator = service.coordinator();
///
/// let tx_id = coordinator.create(&record, CallOptions::new()).await?;
/// let current = coordinator.read(&record.passport).await?;
///
/// service.close();
/// ```
pub struct IdLedger {
    ledger: Arc<Ledger>,
    coordinator: TransactionCoordinator,
    config: Config,
}

impl IdLedger {
    /// Validate `config`, bootstrap a ledger and build the coordinator.
    ///
    /// Any bootstrap failure is returned as [`Error::Bootstrap`]; the caller
    /// is expected to treat it as fatal.
    pub fn open(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::Bootstrap(e.to_string()))?;

        let ledger = Arc::new(Ledger::new());
        let channel_id = config.ledger.channel_id.as_str();
        let contract_id = config.ledger.contract_id.as_str();
        let contract_version = config.ledger.contract_version.as_str();

        ledger.create_channel(channel_id)?;
        ledger.install(contract_id, contract_version, Arc::new(RecordContract::new()))?;
        ledger.instantiate(channel_id, contract_id, Vec::new())?;

        let coordinator = TransactionCoordinator::local(
            Arc::clone(&ledger),
            contract_id,
            config.coordinator.clone(),
        );
        tracing::info!(
            channel = channel_id,
            contract = contract_id,
            version = contract_version,
            commit_timeout_ms = config.coordinator.commit_timeout_ms,
            "idledger ready"
        );

        Ok(Self {
            ledger,
            coordinator,
            config,
        })
    }

    /// Open with default configuration.
    pub fn ephemeral() -> Result<Self> {
        Self::open(Config::default())
    }

    /// Coordinator for reads and writes. Cheap to clone.
    pub fn coordinator(&self) -> &TransactionCoordinator {
        &self.coordinator
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the ledger has been closed.
    pub fn is_closed(&self) -> bool {
        self.ledger.is_closed()
    }

    /// Point-in-time counters.
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            height: self.ledger.height(),
            keys: self.ledger.store().key_count(),
            subscribers: self.ledger.events().subscriber_count(),
            open_iterators: self.ledger.store().open_iterators(),
        }
    }

    /// Shut the ledger down. Pending waits observe `Closed`; further calls
    /// fail with `Closed`. Idempotent.
    pub fn close(&self) {
        self.ledger.close();
    }
}

impl Drop for IdLedger {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for IdLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdLedger")
            .field("ledger", &self.ledger)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

/// Ledger counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStats {
    /// Committed transactions
    pub height: u64,
    /// Keys ever written
    pub keys: usize,
    /// Live commit subscriptions
    pub subscribers: usize,
    /// History iterators not yet released
    pub open_iterators: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_bootstraps_ledger() {
        let service = IdLedger::ephemeral().unwrap();
        assert_eq!(service.ledger().channel_id().as_deref(), Some("hlfexample"));
        assert!(service.ledger().is_instantiated("example-service"));
        assert_eq!(service.coordinator().contract_id(), "example-service");
        assert!(!service.is_closed());
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let mut config = Config::default();
        config.coordinator.commit_timeout_ms = 0;
        assert!(matches!(IdLedger::open(config), Err(Error::Bootstrap(_))));
    }

    #[test]
    fn test_close_is_idempotent() {
        let service = IdLedger::ephemeral().unwrap();
        let ledger = Arc::clone(service.ledger());
        service.close();
        service.close();
        assert!(ledger.is_closed());
        drop(service);
        assert!(ledger.is_closed());
    }

    #[test]
    fn test_drop_closes_ledger() {
        let service = IdLedger::ephemeral().unwrap();
        let ledger = Arc::clone(service.ledger());
        drop(service);
        assert!(ledger.is_closed());
    }

    #[test]
    fn test_stats_start_empty() {
        let service = IdLedger::ephemeral().unwrap();
        let stats = service.stats();
        assert_eq!(stats.keys, 0);
        assert_eq!(stats.subscribers, 0);
        assert_eq!(stats.open_iterators, 0);
    }
}
