//! Unified error types for idledger
//!
//! Every layer (contract, ledger, coordinator, gateway) reports failures with
//! [`Error`]. The enum is serializable so that a contract can ship the typed
//! error across the state-machine wire next to its human-readable message,
//! and the client can rebuild it on the other side.
//!
//! ## Taxonomy
//!
//! | Kind | Variants | Retried |
//! |------|----------|---------|
//! | Validation | ArgumentCount, UnknownFunction, InvalidField, Validation | never |
//! | AlreadyExists | AlreadyExists | never |
//! | NotFound | NotFound | never |
//! | Query | Query | not by the core |
//! | Submission | Submission | not by the core |
//! | CommitTimeout | CommitTimeout | outcome is ambiguous |
//! | Cancelled | Cancelled | caller decides |
//! | Closed | Closed | never |
//! | Internal | Serialization, Bootstrap, Internal | never |

use crate::types::TxId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All idledger errors
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail")]
pub enum Error {
    /// Wrong number of positional arguments for an operation
    #[error("incorrect number of arguments for {operation}: expecting {expected}, got {actual}")]
    ArgumentCount {
        /// Operation that was invoked
        operation: String,
        /// Required argument count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Function name outside the contract's operation set
    #[error("received unknown function invocation: {0}")]
    UnknownFunction(String),

    /// Update targets the key attribute or an unknown attribute
    #[error("incorrect field to change '{field}': {reason}")]
    InvalidField {
        /// Field identifier as supplied
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// Any other malformed input (empty key, bad event name)
    #[error("validation error: {0}")]
    Validation(String),

    /// A live record already exists under the key
    #[error("person already exists, passport number: {0}")]
    AlreadyExists(String),

    /// No live record exists under the key
    #[error("person does not exist, passport number: {0}")]
    NotFound(String),

    /// Storage or iterator failure while reading
    #[error("query error: {0}")]
    Query(String),

    /// Proposal rejected or transport failure before commit
    #[error("submission error: {0}")]
    Submission(String),

    /// No commit notification observed within the wait window.
    ///
    /// The write may still have committed.
    #[error("did not receive commit notification for transaction {tx_id} within {waited_ms}ms")]
    CommitTimeout {
        /// Transaction that was being waited on
        tx_id: TxId,
        /// How long the wait lasted
        waited_ms: u64,
    },

    /// The caller cancelled the wait
    #[error("wait for transaction {0} was cancelled")]
    Cancelled(TxId),

    /// The ledger has been shut down
    #[error("ledger is closed")]
    Closed,

    /// Encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Channel creation or contract installation failure at startup
    #[error("bootstrap error: {0}")]
    Bootstrap(String),

    /// Bug or invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for idledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input rejected by the record store
    Validation,
    /// Key-existence violation on create
    AlreadyExists,
    /// Key-existence violation on read or update
    NotFound,
    /// Read path failure
    Query,
    /// Write rejected before commit
    Submission,
    /// Ambiguous write outcome
    CommitTimeout,
    /// Caller cancellation
    Cancelled,
    /// Ledger shut down
    Closed,
    /// Everything else
    Internal,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ArgumentCount { .. }
            | Error::UnknownFunction(_)
            | Error::InvalidField { .. }
            | Error::Validation(_) => ErrorKind::Validation,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Query(_) => ErrorKind::Query,
            Error::Submission(_) => ErrorKind::Submission,
            Error::CommitTimeout { .. } => ErrorKind::CommitTimeout,
            Error::Cancelled(_) => ErrorKind::Cancelled,
            Error::Closed => ErrorKind::Closed,
            Error::Serialization(_) | Error::Bootstrap(_) | Error::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Check if the write this error reports may nevertheless have committed.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Error::CommitTimeout { .. } | Error::Cancelled(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is an internal failure rather than a rejected request.
    pub fn is_serious(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Encode as the JSON payload of an error response
    pub fn to_wire(&self) -> Vec<u8> {
        // Serializing a plain enum of strings and integers cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Rebuild a typed error from an error response.
    ///
    /// Falls back to `fallback(message)` when the payload does not carry a
    /// typed error (e.g. a contract that only reports text).
    pub fn from_wire(message: &str, payload: &[u8], fallback: fn(String) -> Error) -> Error {
        serde_json::from_slice(payload).unwrap_or_else(|_| fallback(message.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
