//! Core types for idledger
//!
//! This crate defines the vocabulary shared by every other crate:
//! - [`Record`] and [`RecordField`]: the identity document and its closed set
//!   of mutable attributes
//! - [`TxId`] and [`CommitTime`]: transaction identity and commit time
//! - [`VersionEntry`] and the [`history`] wire formats
//! - [`Response`]: the state-machine response envelope
//! - [`Error`]: the error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod history;
pub mod record;
pub mod response;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use history::{HistoryFormat, VersionEntry};
pub use record::{Record, RecordField, KEY_FIELD, RECORD_ARITY};
pub use response::Response;
pub use types::{CommitTime, TxId};
