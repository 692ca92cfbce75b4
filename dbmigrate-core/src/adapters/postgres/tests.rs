//! Unit tests for the PostgreSQL adapter: identifier quoting, failure
//! classification, and environment assembly.

use super::{CREATE_FAILED_ADVISORY, PostgresAdapter, quote_identifier};
use crate::adapters::classify::Operation;
use crate::adapters::config::ConnectionConfig;
use crate::error::MigrateError;

fn adapter(database: &str) -> PostgresAdapter {
    PostgresAdapter::new(ConnectionConfig::new(database)).expect("valid config")
}

#[test]
fn quote_identifier_wraps_bare_names_once() {
    assert_eq!(quote_identifier("app_dev"), "\"app_dev\"");
    assert_eq!(quote_identifier("a"), "\"a\"");
}

#[test]
fn quote_identifier_passes_prequoted_names_through() {
    assert_eq!(quote_identifier("\"app_dev\""), "\"app_dev\"");
    assert_eq!(quote_identifier("'app_dev'"), "'app_dev'");
}

#[test]
fn create_on_existing_database_yields_fixed_advisory() {
    let adapter = adapter("app_dev");

    let err = adapter.classify(
        "error returned from database: database \"app_dev\" already exists",
        Operation::Create,
    );

    assert!(matches!(err, MigrateError::DatabaseAlreadyExists { .. }));
    assert_eq!(err.to_string(), CREATE_FAILED_ADVISORY);
}

#[test]
fn create_advisory_applies_to_both_wordings() {
    let adapter = adapter("app_dev");

    for raw in ["createdb: database exists", "ERROR: already exists"] {
        let err = adapter.classify(raw, Operation::Create);
        assert_eq!(err.to_string(), CREATE_FAILED_ADVISORY, "for {:?}", raw);
    }
}

#[test]
fn drop_on_missing_database_names_the_configured_database() {
    let adapter = adapter("app_dev");

    // The name inside the raw text is deliberately different; the message
    // must carry the configured one.
    let err = adapter.classify(
        "ERROR: database \"something_else\" does not exist",
        Operation::Drop,
    );

    assert_eq!(err.to_string(), "Cannot find database: app_dev");
}

#[test]
fn drop_matches_contracted_wording() {
    let adapter = adapter("app_dev");
    let err = adapter.classify("database doesn't exist", Operation::Drop);
    assert!(matches!(err, MigrateError::DatabaseNotFound { .. }));
}

#[test]
fn create_does_not_map_missing_role_to_database_not_found() {
    let adapter = adapter("app_dev");

    let err = adapter.classify("FATAL: role \"deploy\" does not exist", Operation::Create);

    assert!(matches!(err, MigrateError::Unclassified { .. }));
    assert!(err.to_string().contains("role \"deploy\""));
}

#[test]
fn missing_executable_reports_trailing_token() {
    let adapter = adapter("app_dev");

    let err = adapter.classify(
        "No such file or directory (os error 2) - pg_dump",
        Operation::Dump,
    );

    assert_eq!(
        err.to_string(),
        "Could not find executable in your PATH: `pg_dump`"
    );
}

#[test]
fn unmatched_text_passes_through() {
    let adapter = adapter("app_dev");
    let raw = "FATAL: password authentication failed for user \"deploy\"";

    let err = adapter.classify(raw, Operation::Create);

    assert!(matches!(err, MigrateError::Unclassified { .. }));
    assert_eq!(err.to_string(), raw);
}

#[test]
fn environment_map_is_empty_when_only_database_is_configured() {
    let adapter = adapter("app_test");
    assert!(adapter.environment_variables().is_empty());
}

#[test]
fn environment_map_omits_unset_fields() {
    let config = ConnectionConfig::new("app_dev")
        .with_host("localhost")
        .with_username("deploy");
    let adapter = PostgresAdapter::new(config).expect("valid config");

    let env = adapter.environment_variables();

    assert_eq!(env.get("PGHOST").map(String::as_str), Some("localhost"));
    assert_eq!(env.get("PGUSER").map(String::as_str), Some("deploy"));
    assert!(!env.contains_key("PGPORT"));
    assert!(!env.contains_key("PGPASSWORD"));
    assert_eq!(env.len(), 2);
}

#[test]
fn environment_map_carries_all_present_fields() {
    let config = ConnectionConfig::new("app_dev")
        .with_host("db.internal")
        .with_port(5433)
        .with_username("deploy")
        .with_password("s3cret");
    let adapter = PostgresAdapter::new(config).expect("valid config");

    let env = adapter.environment_variables();

    assert_eq!(env.get("PGHOST").map(String::as_str), Some("db.internal"));
    assert_eq!(env.get("PGPORT").map(String::as_str), Some("5433"));
    assert_eq!(env.get("PGUSER").map(String::as_str), Some("deploy"));
    assert_eq!(env.get("PGPASSWORD").map(String::as_str), Some("s3cret"));
    assert_eq!(env.len(), 4);
}

#[test]
fn adapter_rejects_invalid_config() {
    assert!(PostgresAdapter::new(ConnectionConfig::default()).is_err());
}
