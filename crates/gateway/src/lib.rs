//! HTTP gateway for idledger
//!
//! Exposes the coordinator over axum. Every handler maps its outcome to a
//! status code exactly once: domain errors are 400 with the error text,
//! internal errors are 500.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{router, AppState, HealthResponse, UpdateRequest};
