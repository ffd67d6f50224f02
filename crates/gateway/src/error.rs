//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idledger::Error;

/// Error returned by a handler
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// Malformed request body
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(Error::Validation(message.into()))
    }

    /// Status code for the wrapped error
    pub fn status(&self) -> StatusCode {
        if self.0.is_serious() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, kind = ?self.0.kind(), "request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}
