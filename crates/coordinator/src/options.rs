//! Per-call options: caller deadline and cancellation

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cooperative cancellation signal shared between a caller and a pending call
///
/// Cloning yields a handle to the same signal. Once cancelled it stays
/// cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// New, not yet cancelled token
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Fire the token
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    /// Whether the token has fired
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolve once the token fires
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for one coordinator call
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Latest instant the caller is willing to wait until
    pub deadline: Option<Instant>,
    /// Cancellation signal
    pub cancel: Option<CancelToken>,
}

impl CallOptions {
    /// No deadline beyond the configured commit timeout, no cancellation
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait at most until `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Wait at most `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Abort the wait when `token` fires
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The earlier of `default_deadline` and the caller's deadline
    pub fn effective_deadline(&self, default_deadline: Instant) -> Instant {
        match self.deadline {
            Some(deadline) => deadline.min(default_deadline),
            None => default_deadline,
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    pub(crate) async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }
}
