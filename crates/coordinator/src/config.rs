//! Coordinator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait for a commit notification
pub const DEFAULT_COMMIT_TIMEOUT_MS: u64 = 20_000;

/// Default commit event name
pub const DEFAULT_EVENT_NAME: &str = "eventInvoke";

/// `[coordinator]` settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// How long a write waits for its commit notification
    pub commit_timeout_ms: u64,
    /// Event name the contract sets on a successful write
    pub event_name: String,
}

impl CoordinatorConfig {
    /// Commit timeout as a `Duration`
    pub fn commit_timeout(&self) -> Duration {
        Duration::from_millis(self.commit_timeout_ms)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            commit_timeout_ms: DEFAULT_COMMIT_TIMEOUT_MS,
            event_name: DEFAULT_EVENT_NAME.to_string(),
        }
    }
}
