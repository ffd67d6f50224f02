//! State-machine response envelope
//!
//! A contract invocation answers with either a success payload or an error.
//! On the wire both travel in the same envelope: `status`, a human-readable
//! `message`, and opaque `payload` bytes. Error responses carry the typed
//! [`Error`] as JSON in `payload` so clients can rebuild it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Status code of a successful response
pub const OK: u16 = 200;

/// Status code of an error response
pub const ERROR: u16 = 500;

/// Response of a contract invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// [`OK`] or [`ERROR`]
    pub status: u16,
    /// Error text, empty on success
    pub message: String,
    /// Success payload, or the encoded typed error
    pub payload: Vec<u8>,
}

impl Response {
    /// Successful response carrying `payload`
    pub fn success(payload: Vec<u8>) -> Self {
        Response {
            status: OK,
            message: String::new(),
            payload,
        }
    }

    /// Error response carrying only text
    pub fn error(message: impl Into<String>) -> Self {
        Response {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    /// Error response carrying the typed error
    pub fn from_error(err: &Error) -> Self {
        Response {
            status: ERROR,
            message: err.to_string(),
            payload: err.to_wire(),
        }
    }

    /// Whether this is a success response
    pub fn is_ok(&self) -> bool {
        self.status == OK
    }

    /// Convert into a result, rebuilding typed errors.
    ///
    /// Untyped error text is wrapped with `fallback`.
    pub fn into_result(self, fallback: fn(String) -> Error) -> Result<Vec<u8>> {
        if self.is_ok() {
            Ok(self.payload)
        } else {
            Err(Error::from_wire(&self.message, &self.payload, fallback))
        }
    }
}

impl From<Result<Vec<u8>>> for Response {
    fn from(result: Result<Vec<u8>>) -> Self {
        match result {
            Ok(payload) => Response::success(payload),
            Err(err) => Response::from_error(&err),
        }
    }
}
