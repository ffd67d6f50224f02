//! Concurrency Tests
//!
//! Concurrent callers share one coordinator; writes to the same key are
//! linearised by the ledger.

use crate::*;
use std::collections::HashSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_same_key_one_winner() {
    const N: usize = 32;
    let service = open_service();

    let tasks: Vec<_> = (0..N)
        .map(|i| {
            let coordinator = service.coordinator().clone();
            tokio::spawn(async move {
                let mut record = person("SAME");
                record.name = format!("caller-{}", i);
                coordinator.create(&record, CallOptions::new()).await
            })
        })
        .collect();

    let mut successes = 0;
    let mut already_exists = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(Error::AlreadyExists(passport)) => {
                assert_eq!(passport, "SAME");
                already_exists += 1;
            }
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(already_exists, N - 1);
    assert_eq!(service.coordinator().history("SAME").await.unwrap().len(), 1);
    assert_eq!(service.stats().subscribers, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_distinct_keys_all_succeed() {
    const N: usize = 24;
    let service = open_service();

    let tasks: Vec<_> = (0..N)
        .map(|i| {
            let coordinator = service.coordinator().clone();
            tokio::spawn(async move {
                coordinator
                    .create(&person(&format!("P{}", i)), CallOptions::new())
                    .await
            })
        })
        .collect();

    let mut tx_ids = HashSet::new();
    for task in tasks {
        tx_ids.insert(task.await.unwrap().unwrap());
    }
    assert_eq!(tx_ids.len(), N);
    assert_eq!(service.stats().keys, N);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_each_return_own_tx_id() {
    const N: usize = 16;
    let service = open_service();
    service
        .coordinator()
        .create(&jane(), CallOptions::new())
        .await
        .unwrap();

    let tasks: Vec<_> = (0..N)
        .map(|i| {
            let coordinator = service.coordinator().clone();
            tokio::spawn(async move {
                coordinator
                    .update("P1", "city", &format!("city-{}", i), CallOptions::new())
                    .await
            })
        })
        .collect();

    let mut returned = HashSet::new();
    for task in tasks {
        returned.insert(task.await.unwrap().unwrap());
    }

    // Every returned id is a distinct committed version of the key.
    let history = service.coordinator().history("P1").await.unwrap();
    assert_eq!(history.len(), N + 1);
    let committed: HashSet<TxId> = history.iter().skip(1).map(|e| e.tx_id).collect();
    assert_eq!(returned, committed);
    assert_eq!(service.stats().subscribers, 0);
}
