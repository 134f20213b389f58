//! Database integration tests with real PostgreSQL
//!
//! These tests require a live PostgreSQL database.
//! Set POSTGRES_TEST_URL environment variable to run.

use bucket_loader::config::{DbType, DestinationConfig};
use bucket_loader::database::{Destination, DestinationEngine};
use bucket_loader::load::{build_insert, InsertBatch, SqlValue};
use bucket_loader::schema::ValueKind;

/// Get test connection string from environment or skip
fn get_test_connection() -> Option<String> {
    std::env::var("POSTGRES_TEST_URL").ok()
}

fn postgres_config(conn_str: String) -> DestinationConfig {
    DestinationConfig {
        engine: DbType::Postgres,
        connection_string: Some(conn_str),
        ..DestinationConfig::default()
    }
}

/// Create a scratch table through a separate DuckDB session
fn create_table(conn_str: &str, ddl: &str) {
    let conn = duckdb::Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "INSTALL postgres; LOAD postgres; ATTACH '{conn_str}' AS pg (TYPE POSTGRES); {ddl}"
    ))
    .unwrap();
}

#[test]
fn test_postgres_connection() {
    let Some(conn_str) = get_test_connection() else {
        println!("Skipping: POSTGRES_TEST_URL not set");
        return;
    };

    let engine = DestinationEngine::new(&postgres_config(conn_str));
    assert!(
        engine.is_ok(),
        "Failed to create engine: {:?}",
        engine.err()
    );

    let engine = engine.unwrap();
    let check = engine.check_connection();
    assert!(check.is_ok(), "Connection check failed: {:?}", check.err());
}

#[test]
fn test_postgres_describe_and_load() {
    let Some(conn_str) = get_test_connection() else {
        println!("Skipping: POSTGRES_TEST_URL not set");
        return;
    };

    create_table(
        &conn_str,
        "DROP TABLE IF EXISTS pg.public.probereading; \
         CREATE TABLE pg.public.probereading (id BIGINT, note VARCHAR, ison BOOLEAN, taken TIMESTAMP);",
    );

    let mut engine = DestinationEngine::new(&postgres_config(conn_str)).unwrap();
    let schema = engine.describe_table("probereading").unwrap();
    assert_eq!(
        schema
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.kind))
            .collect::<Vec<_>>(),
        vec![
            ("id", ValueKind::Integer),
            ("note", ValueKind::Text),
            ("ison", ValueKind::Boolean),
            ("taken", ValueKind::Timestamp),
        ]
    );

    let statement = build_insert(&schema);
    let mut batch = InsertBatch::new("probereading");
    batch.push(vec![
        SqlValue::Integer(1),
        SqlValue::Text("first".into()),
        SqlValue::Boolean(true),
        SqlValue::Null,
    ]);
    batch.push(vec![
        SqlValue::Null,
        SqlValue::Null,
        SqlValue::Boolean(false),
        SqlValue::Null,
    ]);

    let outcome = engine.execute_batch(&statement, &batch).unwrap();
    assert_eq!(outcome.row_counts, vec![1, 1]);
    assert!(outcome.anomalies().is_empty());
}

#[test]
fn test_postgres_missing_table() {
    let Some(conn_str) = get_test_connection() else {
        println!("Skipping: POSTGRES_TEST_URL not set");
        return;
    };

    let mut engine = DestinationEngine::new(&postgres_config(conn_str)).unwrap();
    let err = engine.describe_table("no_such_entity_table").unwrap_err();
    assert!(err.to_string().contains("no_such_entity_table"));
}
