//! Record store contract for idledger
//!
//! - [`RecordContract`]: the identity-record state machine
//! - [`Operation`]: its closed set of functions and their arities
//! - [`read_history`]: the history reader behind the `history` function

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod history;
pub mod operation;
pub mod record_store;

pub use history::read_history;
pub use operation::Operation;
pub use record_store::{RecordContract, COMMIT_EVENT};
