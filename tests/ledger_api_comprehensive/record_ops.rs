//! Record Operation Tests
//!
//! create / read / update through the coordinator.

use crate::*;
use proptest::prelude::*;

// =============================================================================
// CREATE / READ
// =============================================================================

#[tokio::test]
async fn test_create_then_read_returns_record() {
    let service = open_service();
    let coordinator = service.coordinator();

    coordinator.create(&jane(), CallOptions::new()).await.unwrap();
    assert_eq!(coordinator.read("P1").await.unwrap(), jane());
}

#[tokio::test]
async fn test_create_existing_fails_without_write() {
    let service = open_service();
    let coordinator = service.coordinator();

    coordinator.create(&jane(), CallOptions::new()).await.unwrap();
    let mut other = jane();
    other.name = "Someone Else".to_string();
    let err = coordinator.create(&other, CallOptions::new()).await.unwrap_err();

    assert_eq!(err, Error::AlreadyExists("P1".to_string()));
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(coordinator.read("P1").await.unwrap().name, "Jane");
    assert_eq!(coordinator.history("P1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_read_missing_is_not_found() {
    let service = open_service();
    let err = service.coordinator().read("nobody").await.unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// UPDATE
// =============================================================================

#[tokio::test]
async fn test_update_every_mutable_field() {
    let service = open_service();
    let coordinator = service.coordinator();
    coordinator.create(&jane(), CallOptions::new()).await.unwrap();

    for field in RecordField::ALL {
        let value = format!("new-{}", field);
        coordinator
            .update("P1", field.as_str(), &value, CallOptions::new())
            .await
            .unwrap();
        let record = coordinator.read("P1").await.unwrap();
        assert_eq!(record.get(field), value);
        assert_eq!(record.passport, "P1");
    }
}

#[tokio::test]
async fn test_update_key_field_rejected_regardless_of_state() {
    let service = open_service();
    let coordinator = service.coordinator();

    // Absent record
    let err = coordinator
        .update("P1", "passport", "P2", CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidField { .. }));

    // Present record
    coordinator.create(&jane(), CallOptions::new()).await.unwrap();
    let err = coordinator
        .update("P1", "passport", "P2", CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidField { .. }));
    assert_eq!(coordinator.read("P1").await.unwrap(), jane());
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let service = open_service();
    let err = service
        .coordinator()
        .update("nobody", "city", "x", CallOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err, Error::NotFound("nobody".to_string()));
}

#[tokio::test]
async fn test_update_unknown_field_is_invalid() {
    let service = open_service();
    let coordinator = service.coordinator();
    coordinator.create(&jane(), CallOptions::new()).await.unwrap();

    let err = coordinator
        .update("P1", "Name", "x", CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidField { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// =============================================================================
// REFERENCE SCENARIO
// =============================================================================

#[tokio::test]
async fn test_reference_scenario() {
    let service = open_service();
    let coordinator = service.coordinator();

    let created = coordinator.create(&jane(), CallOptions::new()).await.unwrap();
    assert_eq!(coordinator.read("P1").await.unwrap(), jane());

    let updated = coordinator
        .update("P1", "phone", "555-0199", CallOptions::new())
        .await
        .unwrap();
    let record = coordinator.read("P1").await.unwrap();
    assert_eq!(record.phone, "555-0199");
    assert_eq!(
        Record {
            phone: "555-0100".to_string(),
            ..record
        },
        jane()
    );

    let history = coordinator.history("P1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].tx_id, created);
    assert_eq!(history[0].value.as_ref(), Some(&jane()));
    assert_eq!(history[1].tx_id, updated);
    assert_eq!(history[1].value.as_ref().unwrap().phone, "555-0199");
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .,'-]{0,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_create_then_read_round_trips(
        passport in "[A-Z0-9]{1,12}",
        name in field(),
        family_name in field(),
        city in field(),
        address in field(),
        phone in field(),
        family_status in field(),
    ) {
        let record = Record { passport, name, family_name, city, address, phone, family_status };
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let read = runtime.block_on(async {
            let service = open_service();
            service.coordinator().create(&record, CallOptions::new()).await.unwrap();
            service.coordinator().read(&record.passport).await.unwrap()
        });
        prop_assert_eq!(read, record);
    }
}
