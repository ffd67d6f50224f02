//! Contract trait
//!
//! A contract is the deterministic state machine the ledger executes for each
//! proposal. It is dispatched by function name and positional string args
//! (available on the [`TxContext`]) and answers with a [`Response`].

use crate::context::TxContext;
use idledger_core::Response;

/// State machine executed by the ledger
pub trait Contract: Send + Sync {
    /// Called once when the contract is instantiated on a channel
    fn init(&self, ctx: &mut TxContext<'_>) -> Response;

    /// Called for every proposal and query
    fn invoke(&self, ctx: &mut TxContext<'_>) -> Response;
}
