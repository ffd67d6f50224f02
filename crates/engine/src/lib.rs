//! Ledger substrate for idledger
//!
//! This crate provides the in-process ledger the record contract runs on:
//! - TxContext: per-invocation state access, buffered writes, commit event
//! - Contract: the state-machine trait executed for every proposal
//! - Ledger: ordered commits under a commit lock, queries, bootstrap
//! - EventHub: filtered commit-event pub/sub with drop-based unsubscribe
//!
//! The ledger is synchronous; async callers run submissions on a blocking
//! pool and wait for commit events through a [`Subscription`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod contract;
pub mod events;
pub mod ledger;

pub use context::{PendingEvent, TxContext};
pub use contract::Contract;
pub use events::{CommitEvent, EventFilter, EventHub, Subscription};
pub use ledger::{Ledger, Proposal, TxReceipt};
