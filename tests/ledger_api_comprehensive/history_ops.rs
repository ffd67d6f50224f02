//! History Tests

use crate::*;
use idledger::history::{self, decode_compat};

#[tokio::test]
async fn test_history_of_unwritten_key_is_empty() {
    let service = open_service();
    assert!(service.coordinator().history("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_history_follows_commit_order() {
    let service = open_service();
    let coordinator = service.coordinator();
    let mut tx_ids = vec![coordinator.create(&jane(), CallOptions::new()).await.unwrap()];
    for i in 0..5 {
        tx_ids.push(
            coordinator
                .update("P1", "address", &format!("{} Main St", i + 2), CallOptions::new())
                .await
                .unwrap(),
        );
    }

    let entries = coordinator.history("P1").await.unwrap();
    assert_eq!(entries.iter().map(|e| e.tx_id).collect::<Vec<_>>(), tx_ids);
    for (i, entry) in entries.iter().enumerate().skip(1) {
        assert_eq!(entry.value.as_ref().unwrap().address, format!("{} Main St", i + 1));
    }
    assert!(entries.iter().all(|e| !e.is_delete));
    assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_history_is_restartable_and_releases_iterators() {
    let service = open_service();
    let coordinator = service.coordinator();
    coordinator.create(&jane(), CallOptions::new()).await.unwrap();

    let first = coordinator.history("P1").await.unwrap();
    let second = coordinator.history("P1").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(service.stats().open_iterators, 0);
}

#[tokio::test]
async fn test_history_wire_shape() {
    let service = open_service();
    service
        .coordinator()
        .create(&jane(), CallOptions::new())
        .await
        .unwrap();

    let raw = service
        .ledger()
        .query("example-service", "history", vec!["P1".to_string()])
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    let entry = &json[0];
    assert_eq!(entry["IsDelete"], serde_json::json!("false"));
    assert_eq!(entry["Value"]["passport"], serde_json::json!("P1"));
    let timestamp = entry["Timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with(" +0000 UTC"), "{}", timestamp);
    assert_eq!(entry["TxId"].as_str().unwrap().len(), 32);

    // Compat output re-encodes byte for byte
    let entries = decode_compat(&raw).unwrap();
    assert_eq!(history::encode(&entries, HistoryFormat::Compat).unwrap(), raw);
}

#[tokio::test]
async fn test_history_on_closed_service_fails() {
    let service = open_service();
    service.close();
    assert_eq!(
        service.coordinator().history("P1").await.unwrap_err(),
        Error::Closed
    );
}
