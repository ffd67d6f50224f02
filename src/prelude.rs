//! Convenient imports for idledger.
//!
//! ```ignore
//! use idledger::prelude::*;
//!
//! let service = IdLedger::open(Config::default())?;
//! ```

// Service
pub use crate::config::Config;
pub use crate::service::IdLedger;

// Coordination
pub use idledger_coordinator::{CallOptions, CancelToken, TransactionCoordinator};

// Error handling
pub use idledger_core::{Error, ErrorKind, Result};

// Core types
pub use idledger_core::{HistoryFormat, Record, RecordField, TxId, VersionEntry};
