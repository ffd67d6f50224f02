//! Core identifier and time types
//!
//! This module defines the fundamental types used throughout the system:
//! - [`TxId`]: Opaque identifier of a ledger transaction
//! - [`CommitTime`]: Commit timestamp assigned by the ledger, with the
//!   human-readable rendering used on the history wire

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a ledger transaction
///
/// Transaction ids are allocated by the submitting client *before* the
/// proposal is sent, so a commit subscription can be keyed on the id the
/// proposal will carry. The textual form is 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(Uuid);

impl TxId {
    /// Create a new random TxId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use idledger_core::TxId;
    ///
    /// let a = TxId::new();
    /// let b = TxId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        TxId(Uuid::new_v4())
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for TxId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(TxId)
    }
}

/// Rendering of a commit timestamp on the history wire.
///
/// Always UTC with nanosecond precision, e.g.
/// `2024-03-01 10:00:00.123456789 +0000 UTC`. This intentionally differs
/// from the legacy rendering, which trimmed trailing zeros and used the
/// server's local zone; the fixed width makes the string parseable.
const COMMIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";
const COMMIT_TIME_SUFFIX: &str = " +0000 UTC";

/// Commit timestamp assigned by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitTime(DateTime<Utc>);

impl CommitTime {
    /// Current wall-clock time
    pub fn now() -> Self {
        CommitTime(Utc::now())
    }

    /// Build from seconds + nanoseconds since the Unix epoch
    pub fn from_unix(secs: i64, nanos: u32) -> Option<Self> {
        Utc.timestamp_opt(secs, nanos).single().map(CommitTime)
    }

    /// Human-readable rendering used by the history wire format
    pub fn render(&self) -> String {
        format!("{}{}", self.0.format(COMMIT_TIME_FORMAT), COMMIT_TIME_SUFFIX)
    }

    /// Parse the output of [`CommitTime::render`]
    pub fn parse_rendered(s: &str) -> Option<Self> {
        let head = s.strip_suffix(COMMIT_TIME_SUFFIX)?;
        NaiveDateTime::parse_from_str(head, COMMIT_TIME_FORMAT)
            .ok()
            .map(|naive| CommitTime(Utc.from_utc_datetime(&naive)))
    }

    /// RFC 3339 rendering used by the typed history format
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl fmt::Display for CommitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
