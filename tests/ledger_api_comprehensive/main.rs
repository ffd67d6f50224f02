//! Ledger API Comprehensive Test Suite
//!
//! Drives the service end to end: configuration, bootstrap, the record
//! contract through the coordinator, history, and the concurrency and
//! resource-release guarantees of the write protocol.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test ledger_api_comprehensive
//!
//! # Run history tests only
//! cargo test --test ledger_api_comprehensive history_ops::
//! ```

use idledger::prelude::*;
use idledger::CoordinatorConfig;

// Test modules
pub mod concurrency;
pub mod coordinator;
pub mod history_ops;
pub mod record_ops;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Open a service with default configuration
pub fn open_service() -> IdLedger {
    IdLedger::open(Config::default()).expect("Failed to open service")
}

/// Open a service whose writes wait at most `timeout_ms`
pub fn open_service_with_timeout(timeout_ms: u64) -> IdLedger {
    let config = Config {
        coordinator: CoordinatorConfig {
            commit_timeout_ms: timeout_ms,
            ..CoordinatorConfig::default()
        },
        ..Config::default()
    };
    IdLedger::open(config).expect("Failed to open service")
}

/// The reference record used throughout the suite
pub fn jane() -> Record {
    Record {
        passport: "P1".to_string(),
        name: "Jane".to_string(),
        family_name: "Doe".to_string(),
        city: "Springfield".to_string(),
        address: "1 Main St".to_string(),
        phone: "555-0100".to_string(),
        family_status: "single".to_string(),
    }
}

/// A record with the given passport and otherwise reference fields
pub fn person(passport: &str) -> Record {
    Record {
        passport: passport.to_string(),
        ..jane()
    }
}
