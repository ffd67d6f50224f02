//! In-process ledger
//!
//! The ledger owns all persisted state. It executes contracts against a
//! [`TxContext`], orders commits, applies write sets to the versioned store
//! and publishes commit events.
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. Reject if closed, contract not instantiated
//! 2. Acquire commit lock
//! 3. Reject a reused transaction id
//! 4. Assign block = height + 1, timestamp = max(now, last timestamp)
//! 5. Execute the contract; a failed Response aborts with its typed error
//! 6. Apply the write set to the store as one batch
//! 7. Advance the chain head, release the commit lock
//! 8. Publish the commit event, if the contract set one
//! ```
//!
//! Execution and apply happen under the same lock, so two proposals touching
//! the same key are linearised: exactly one of N concurrent creates of a key
//! sees the key absent.
//!
//! Queries run the contract against committed state without the lock. Their
//! writes and events are discarded.

use crate::context::TxContext;
use crate::contract::Contract;
use crate::events::{CommitEvent, EventHub};
use idledger_core::{CommitTime, Error, Response, Result, TxId};
use idledger_storage::{StorageError, VersionedStore};
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A transaction proposal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Client-allocated transaction id
    pub tx_id: TxId,
    /// Target contract
    pub contract_id: String,
    /// Function to invoke
    pub function: String,
    /// Positional arguments
    pub args: Vec<String>,
}

impl Proposal {
    /// Build a proposal
    pub fn new(
        tx_id: TxId,
        contract_id: impl Into<String>,
        function: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            tx_id,
            contract_id: contract_id.into(),
            function: function.into(),
            args,
        }
    }
}

/// Outcome of a committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction id
    pub tx_id: TxId,
    /// Block the transaction committed in
    pub block: u64,
    /// Commit timestamp
    pub timestamp: CommitTime,
    /// Contract response payload
    pub payload: Vec<u8>,
}

struct Installed {
    version: String,
    contract: Arc<dyn Contract>,
    instantiated: bool,
}

/// Position of the last commit
struct ChainHead {
    height: u64,
    last_timestamp: Option<CommitTime>,
    /// Every committed transaction id. Never pruned: a tx id stays unique for
    /// the life of the ledger, which already retains every version of every
    /// key, so this grows with the same order as the store.
    committed: FxHashSet<TxId>,
}

/// In-process ledger: one channel, any number of installed contracts
pub struct Ledger {
    channel: RwLock<Option<String>>,
    contracts: RwLock<FxHashMap<String, Installed>>,
    store: VersionedStore,
    events: EventHub,
    /// Commit serialization lock; guards execution and apply
    commit_lock: Mutex<ChainHead>,
    closed: AtomicBool,
}

impl Ledger {
    /// Create an empty ledger with no channel
    pub fn new() -> Self {
        Self {
            channel: RwLock::new(None),
            contracts: RwLock::new(FxHashMap::default()),
            store: VersionedStore::new(),
            events: EventHub::new(),
            commit_lock: Mutex::new(ChainHead {
                height: 0,
                last_timestamp: None,
                committed: FxHashSet::default(),
            }),
            closed: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Bootstrap
    // ========================================================================

    /// Create the ledger's channel. Fails if a channel already exists.
    pub fn create_channel(&self, channel_id: &str) -> Result<()> {
        self.check_open()?;
        if channel_id.is_empty() {
            return Err(Error::Bootstrap("channel id must not be empty".into()));
        }
        let mut channel = self.channel.write();
        if let Some(existing) = channel.as_ref() {
            return Err(Error::Bootstrap(format!(
                "channel '{}' already created",
                existing
            )));
        }
        *channel = Some(channel_id.to_string());
        tracing::info!(channel = channel_id, "channel created");
        Ok(())
    }

    /// Install a contract under `contract_id`. Fails if the id is taken.
    pub fn install(
        &self,
        contract_id: &str,
        version: &str,
        contract: Arc<dyn Contract>,
    ) -> Result<()> {
        self.check_open()?;
        if contract_id.is_empty() {
            return Err(Error::Bootstrap("contract id must not be empty".into()));
        }
        let mut contracts = self.contracts.write();
        if let Some(existing) = contracts.get(contract_id) {
            return Err(Error::Bootstrap(format!(
                "contract '{}' already installed at version {}",
                contract_id, existing.version
            )));
        }
        contracts.insert(
            contract_id.to_string(),
            Installed {
                version: version.to_string(),
                contract,
                instantiated: false,
            },
        );
        tracing::info!(contract = contract_id, version, "contract installed");
        Ok(())
    }

    /// Instantiate an installed contract on the channel, running its `init`.
    ///
    /// Fails if the channel does not match, the contract is not installed,
    /// it is already instantiated, or `init` fails.
    pub fn instantiate(&self, channel_id: &str, contract_id: &str, args: Vec<String>) -> Result<()> {
        self.check_open()?;
        match self.channel.read().as_deref() {
            Some(current) if current == channel_id => {}
            Some(current) => {
                return Err(Error::Bootstrap(format!(
                    "unknown channel '{}' (ledger channel is '{}')",
                    channel_id, current
                )))
            }
            None => return Err(Error::Bootstrap("no channel created".into())),
        }

        let contract = {
            let contracts = self.contracts.read();
            match contracts.get(contract_id) {
                None => {
                    return Err(Error::Bootstrap(format!(
                        "contract '{}' is not installed",
                        contract_id
                    )))
                }
                Some(installed) if installed.instantiated => {
                    return Err(Error::Bootstrap(format!(
                        "contract '{}' already instantiated",
                        contract_id
                    )))
                }
                Some(installed) => Arc::clone(&installed.contract),
            }
        };

        let proposal = Proposal::new(TxId::new(), contract_id, "init", args);
        self.commit(&proposal, contract.as_ref(), true)
            .map_err(|e| Error::Bootstrap(format!("init of '{}' failed: {}", contract_id, e)))?;

        let mut contracts = self.contracts.write();
        match contracts.get_mut(contract_id) {
            Some(installed) if !installed.instantiated => installed.instantiated = true,
            _ => {
                return Err(Error::Bootstrap(format!(
                    "contract '{}' instantiated concurrently",
                    contract_id
                )))
            }
        }
        tracing::info!(channel = channel_id, contract = contract_id, "contract instantiated");
        Ok(())
    }

    // ========================================================================
    // Submission / Query
    // ========================================================================

    /// Execute and commit a proposal
    pub fn submit(&self, proposal: Proposal) -> Result<TxReceipt> {
        self.check_open()?;
        let contract = self
            .instantiated(&proposal.contract_id)
            .ok_or_else(|| {
                Error::Submission(format!(
                    "contract '{}' is not instantiated",
                    proposal.contract_id
                ))
            })?;
        self.commit(&proposal, contract.as_ref(), false)
    }

    /// Execute a function against committed state. Writes and events are
    /// discarded.
    pub fn query(&self, contract_id: &str, function: &str, args: Vec<String>) -> Result<Vec<u8>> {
        self.check_open()?;
        let contract = self.instantiated(contract_id).ok_or_else(|| {
            Error::Query(format!("contract '{}' is not instantiated", contract_id))
        })?;

        let tx_id = TxId::new();
        let mut ctx = TxContext::new(
            &self.store,
            tx_id,
            function.to_string(),
            args,
            CommitTime::now(),
        );
        let response = contract.invoke(&mut ctx);
        tracing::debug!(
            %tx_id,
            contract = contract_id,
            function,
            ok = response.is_ok(),
            "query executed"
        );
        response.into_result(Error::Query)
    }

    fn commit(&self, proposal: &Proposal, contract: &dyn Contract, init: bool) -> Result<TxReceipt> {
        let tx_id = proposal.tx_id;

        let (receipt, event) = {
            let mut head = self.commit_lock.lock();
            if head.committed.contains(&tx_id) {
                return Err(Error::Submission(format!(
                    "duplicate transaction id {}",
                    tx_id
                )));
            }

            let now = CommitTime::now();
            let timestamp = head.last_timestamp.map_or(now, |last| now.max(last));
            let block = head.height + 1;

            let mut ctx = TxContext::new(
                &self.store,
                tx_id,
                proposal.function.clone(),
                proposal.args.clone(),
                timestamp,
            );
            let response: Response = if init {
                contract.init(&mut ctx)
            } else {
                contract.invoke(&mut ctx)
            };
            if !response.is_ok() {
                tracing::debug!(
                    %tx_id,
                    contract = %proposal.contract_id,
                    function = %proposal.function,
                    message = %response.message,
                    "proposal rejected"
                );
                return Err(Error::from_wire(
                    &response.message,
                    &response.payload,
                    Error::Submission,
                ));
            }

            let (writes, event) = ctx.into_parts();
            self.store
                .apply(&writes, tx_id, timestamp, block)
                .map_err(|e| match e {
                    // close() raced this commit
                    StorageError::Closed => Error::Closed,
                    other => Error::from(other),
                })?;

            head.height = block;
            head.last_timestamp = Some(timestamp);
            head.committed.insert(tx_id);

            tracing::debug!(
                %tx_id,
                contract = %proposal.contract_id,
                function = %proposal.function,
                block,
                writes = writes.len(),
                "transaction committed"
            );

            let receipt = TxReceipt {
                tx_id,
                block,
                timestamp,
                payload: response.payload,
            };
            let event = event.map(|e| CommitEvent {
                tx_id,
                contract_id: proposal.contract_id.clone(),
                event_name: e.name,
                block,
                payload: e.payload,
            });
            (receipt, event)
        };

        if let Some(event) = event {
            self.events.publish(&event);
        }
        Ok(receipt)
    }

    fn instantiated(&self, contract_id: &str) -> Option<Arc<dyn Contract>> {
        self.contracts
            .read()
            .get(contract_id)
            .filter(|installed| installed.instantiated)
            .map(|installed| Arc::clone(&installed.contract))
    }

    // ========================================================================
    // Accessors / Lifecycle
    // ========================================================================

    /// Commit event hub
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Versioned state
    pub fn store(&self) -> &VersionedStore {
        &self.store
    }

    /// Channel id, once created
    pub fn channel_id(&self) -> Option<String> {
        self.channel.read().clone()
    }

    /// Number of committed transactions
    pub fn height(&self) -> u64 {
        self.commit_lock.lock().height
    }

    /// Whether `contract_id` is instantiated
    pub fn is_instantiated(&self, contract_id: &str) -> bool {
        self.instantiated(contract_id).is_some()
    }

    /// Whether [`Ledger::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Shut down: further submissions and queries fail with `Closed`, every
    /// subscription observes end-of-stream and the store is closed.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.events.close();
        self.store.close();
        tracing::info!(height = self.height(), "ledger closed");
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("channel", &self.channel_id())
            .field("contracts", &self.contracts.read().len())
            .field("store", &self.store)
            .field("closed", &self.is_closed())
            .finish()
    }
}
