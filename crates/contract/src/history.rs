//! History reader
//!
//! Materialises the version log of one key as [`VersionEntry`]s, oldest
//! first. The store iterator is held only for the duration of the walk and is
//! released on every exit path, including a failure halfway through.

use idledger_core::{Error, Record, Result, VersionEntry};
use idledger_engine::TxContext;
use idledger_storage::KeyModification;

/// Read every version of `key`, oldest first
pub fn read_history(ctx: &TxContext<'_>, key: &str) -> Result<Vec<VersionEntry>> {
    let iter = ctx.history_for_key(key)?;
    let mut entries = Vec::with_capacity(iter.remaining());
    for modification in iter {
        let modification = modification.map_err(|e| Error::Query(e.to_string()))?;
        entries.push(to_entry(modification)?);
    }
    Ok(entries)
}

fn to_entry(modification: KeyModification) -> Result<VersionEntry> {
    let is_delete = modification.is_delete();
    let value = match modification.value {
        Some(bytes) => Some(Record::from_json(&bytes).map_err(|e| {
            Error::Query(format!(
                "undecodable version written by {}: {}",
                modification.tx_id, e
            ))
        })?),
        None => None,
    };
    Ok(VersionEntry {
        tx_id: modification.tx_id,
        value,
        timestamp: modification.timestamp,
        is_delete,
    })
}
