//! # idledger
//!
//! Identity-record ledger service.
//!
//! Person records keyed by passport number live on an append-only ledger.
//! Every change is a versioned transaction, so the full history of a record
//! can be read back alongside its current value.
//!
//! ## Quick Start
//!
//! ```ignore
//! use idledger::prelude::*;
//!
//! let service = IdLedger::open(Config::default())?;
//! let coordinator = service.coordinator().clone();
//!
//! // Writes wait for their own commit notification
//! let tx_id = coordinator.create(&record, CallOptions::new()).await?;
//! coordinator
//!     .update("P1", "city", "Shelbyville", CallOptions::new().with_timeout(Duration::from_secs(5)))
//!     .await?;
//!
//! // Reads are plain queries
//! let current = coordinator.read("P1").await?;
//! let versions = coordinator.history("P1").await?;
//!
//! service.close();
//! ```
//!
//! ## Layers
//!
//! - `idledger-core`: records, errors, history wire formats
//! - `idledger-storage`: versioned key store
//! - `idledger-engine`: ledger, transaction context, commit events
//! - `idledger-contract`: the record state machine
//! - `idledger-coordinator`: submit and wait for commit
//! - this crate: [`IdLedger`] service context and [`Config`]

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod service;

pub mod prelude;

pub use config::{Config, ConfigError, GatewayConfig, LedgerConfig};
pub use service::{IdLedger, LedgerStats};

pub use idledger_coordinator::{
    CallOptions, CancelToken, CoordinatorConfig, LedgerClient, LocalClient, TransactionCoordinator,
};
pub use idledger_core::history;
pub use idledger_core::{
    Error, ErrorKind, HistoryFormat, Record, RecordField, Response, Result, TxId, VersionEntry,
};
