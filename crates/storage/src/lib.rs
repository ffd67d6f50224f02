//! Storage layer for idledger
//!
//! This crate implements the versioned key-value state behind the ledger:
//! - VersionedStore: DashMap of append-only version chains
//! - HistoryIterator: front-to-back walk of a key's chain
//! - Open-iterator accounting so leaked iterators are observable
//!
//! Nothing here knows about records or contracts; values are opaque bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod history;
pub mod versioned;

pub use error::{Result, StorageError};
pub use history::HistoryIterator;
pub use versioned::{KeyModification, Mutation, VersionedStore};
