//! Coordinator Protocol Tests
//!
//! Timeouts, deadlines, cancellation and shutdown as seen from the service.

use crate::*;
use std::time::Duration;

#[tokio::test]
async fn test_successful_writes_leave_no_subscriptions() {
    let service = open_service();
    let coordinator = service.coordinator();
    for i in 0..10 {
        coordinator
            .create(&person(&format!("P{}", i)), CallOptions::new())
            .await
            .unwrap();
    }
    assert_eq!(service.stats().subscribers, 0);
}

#[tokio::test]
async fn test_failed_submissions_leave_no_subscriptions() {
    let service = open_service();
    let coordinator = service.coordinator();
    coordinator.create(&jane(), CallOptions::new()).await.unwrap();

    for _ in 0..10 {
        assert!(coordinator.create(&jane(), CallOptions::new()).await.is_err());
        assert!(coordinator
            .update("P1", "passport", "x", CallOptions::new())
            .await
            .is_err());
        assert!(coordinator
            .update("P9", "name", "x", CallOptions::new())
            .await
            .is_err());
    }
    assert_eq!(service.stats().subscribers, 0);
}

#[tokio::test]
async fn test_event_name_mismatch_times_out_without_leak() {
    // The contract sets `eventInvoke`; waiting on another name never matches.
    let mut config = Config::default();
    config.coordinator.commit_timeout_ms = 40;
    config.coordinator.event_name = "somethingElse".to_string();
    let service = IdLedger::open(config).unwrap();
    let coordinator = service.coordinator();

    for i in 0..5 {
        let err = coordinator
            .create(&person(&format!("P{}", i)), CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommitTimeout { .. }), "{:?}", err);
        assert_eq!(err.kind(), ErrorKind::CommitTimeout);
        assert!(err.is_ambiguous());
    }
    assert_eq!(service.stats().subscribers, 0);
    // Ambiguous outcome: the writes themselves committed.
    assert!(coordinator.read("P0").await.is_ok());
}

#[tokio::test]
async fn test_short_caller_deadline_is_honoured() {
    let mut config = Config::default();
    config.coordinator.event_name = "somethingElse".to_string();
    let service = IdLedger::open(config).unwrap();

    let started = std::time::Instant::now();
    let err = service
        .coordinator()
        .create(
            &jane(),
            CallOptions::new().with_timeout(Duration::from_millis(30)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CommitTimeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_caller_deadline_longer_than_timeout_succeeds() {
    let service = open_service_with_timeout(30);
    let coordinator = service.coordinator();

    // Matching event: completes well within either bound.
    coordinator
        .create(
            &jane(),
            CallOptions::new().with_timeout(Duration::from_secs(60)),
        )
        .await
        .unwrap();
    assert_eq!(coordinator.config().commit_timeout_ms, 30);
}

#[tokio::test]
async fn test_pre_cancelled_call_is_not_submitted() {
    let service = open_service();
    let token = CancelToken::new();
    token.cancel();

    let err = service
        .coordinator()
        .create(&jane(), CallOptions::new().with_cancel(token))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(service.coordinator().read("P1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_cancel_during_wait() {
    let mut config = Config::default();
    config.coordinator.event_name = "somethingElse".to_string();
    let service = IdLedger::open(config).unwrap();
    let token = CancelToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = service
        .coordinator()
        .create(&jane(), CallOptions::new().with_cancel(token))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(err.is_ambiguous());
    assert_eq!(service.stats().subscribers, 0);
}

#[tokio::test]
async fn test_close_wakes_pending_waiters() {
    let mut config = Config::default();
    config.coordinator.event_name = "somethingElse".to_string();
    let service = std::sync::Arc::new(IdLedger::open(config).unwrap());

    let closer = std::sync::Arc::clone(&service);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        closer.close();
    });

    let err = service
        .coordinator()
        .create(&jane(), CallOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err, Error::Closed);
}

#[tokio::test]
async fn test_closed_service_rejects_calls() {
    let service = open_service();
    service.close();
    let coordinator = service.coordinator();
    assert_eq!(
        coordinator.create(&jane(), CallOptions::new()).await.unwrap_err(),
        Error::Closed
    );
    assert_eq!(coordinator.read("P1").await.unwrap_err(), Error::Closed);
}
