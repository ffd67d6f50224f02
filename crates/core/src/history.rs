//! Version entries and the history wire formats
//!
//! ## Formats
//!
//! | Format | Shape |
//! |--------|-------|
//! | `compat` | `{"TxId":"..","Value":{..}\|null,"Timestamp":"<rendered>","IsDelete":"true\|false"}` |
//! | `typed` | `{"tx_id":"..","value":{..}\|null,"timestamp":"<rfc3339>","is_delete":bool}` |
//!
//! `compat` is what the record contract emits and what existing consumers
//! read; `IsDelete` is a *string* there. `typed` is offered by the gateway
//! when configured.

use crate::error::{Error, Result};
use crate::record::Record;
use crate::types::{CommitTime, TxId};
use serde::{Deserialize, Serialize};

/// One historical snapshot of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Transaction that produced this version
    pub tx_id: TxId,
    /// Record as of this write; `None` for a delete
    pub value: Option<Record>,
    /// Commit time assigned by the ledger
    pub timestamp: CommitTime,
    /// Whether this version is a tombstone
    pub is_delete: bool,
}

/// Wire format of a history sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFormat {
    /// Field names and string-typed `IsDelete` of the legacy consumers
    #[default]
    Compat,
    /// snake_case fields, RFC 3339 timestamps, boolean `is_delete`
    Typed,
}

#[derive(Serialize, Deserialize)]
struct CompatEntry {
    #[serde(rename = "TxId")]
    tx_id: String,
    #[serde(rename = "Value")]
    value: Option<Record>,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "IsDelete")]
    is_delete: String,
}

#[derive(Serialize)]
struct TypedEntry<'a> {
    tx_id: String,
    value: Option<&'a Record>,
    timestamp: String,
    is_delete: bool,
}

/// Encode a history sequence
pub fn encode(entries: &[VersionEntry], format: HistoryFormat) -> Result<Vec<u8>> {
    match format {
        HistoryFormat::Compat => {
            let wire: Vec<CompatEntry> = entries
                .iter()
                .map(|e| CompatEntry {
                    tx_id: e.tx_id.to_string(),
                    value: if e.is_delete { None } else { e.value.clone() },
                    timestamp: e.timestamp.render(),
                    is_delete: e.is_delete.to_string(),
                })
                .collect();
            serde_json::to_vec(&wire).map_err(Error::from)
        }
        HistoryFormat::Typed => {
            let wire: Vec<TypedEntry<'_>> = entries
                .iter()
                .map(|e| TypedEntry {
                    tx_id: e.tx_id.to_string(),
                    value: if e.is_delete { None } else { e.value.as_ref() },
                    timestamp: e.timestamp.to_rfc3339(),
                    is_delete: e.is_delete,
                })
                .collect();
            serde_json::to_vec(&wire).map_err(Error::from)
        }
    }
}

/// Decode a history sequence in the compat format
pub fn decode_compat(bytes: &[u8]) -> Result<Vec<VersionEntry>> {
    let wire: Vec<CompatEntry> = serde_json::from_slice(bytes)?;
    wire.into_iter()
        .map(|e| {
            let tx_id = e
                .tx_id
                .parse()
                .map_err(|_| Error::Serialization(format!("invalid TxId '{}'", e.tx_id)))?;
            let timestamp = CommitTime::parse_rendered(&e.timestamp).ok_or_else(|| {
                Error::Serialization(format!("invalid Timestamp '{}'", e.timestamp))
            })?;
            let is_delete = match e.is_delete.as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(Error::Serialization(format!("invalid IsDelete '{}'", other)))
                }
            };
            Ok(VersionEntry {
                tx_id,
                value: e.value,
                timestamp,
                is_delete,
            })
        })
        .collect()
}
