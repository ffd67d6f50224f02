//! Transaction coordinator for idledger
//!
//! - [`TransactionCoordinator`]: submit, correlate the commit event, wait
//!   with deadline and cancellation; plain queries for reads
//! - [`LedgerClient`]: the seam to the ledger, with [`LocalClient`] for an
//!   in-process ledger
//! - [`CallOptions`] / [`CancelToken`]: per-call deadline and cancellation
//! - [`CoordinatorConfig`]: `[coordinator]` settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod coordinator;
pub mod options;

pub use client::{LedgerClient, LocalClient};
pub use config::{CoordinatorConfig, DEFAULT_COMMIT_TIMEOUT_MS, DEFAULT_EVENT_NAME};
pub use coordinator::TransactionCoordinator;
pub use options::{CallOptions, CancelToken};
