//! Integration tests for the BigQuery REST client against a mock server

use mockito::{Matcher, Server, ServerGuard};
use quarry::adapters::bigquery::BigQueryClient;
use quarry::adapters::sink::{SinkClient, TableHandle};
use quarry::adapters::source::MemorySource;
use quarry::config::{secret_string, BigQueryConfig, RetryConfig};
use quarry::core::export::{BatchSize, ExportSpec, Exporter};
use quarry::domain::{
    ColumnSchema, FieldType, FieldValue, ProcessedRow, QuarryError, SchemaInfo, SinkError,
    Timestamp,
};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

const TABLE_PATH: &str = "/bigquery/v2/projects/proj/datasets/ds/tables/items";
const INSERT_PATH: &str = "/bigquery/v2/projects/proj/datasets/ds/tables/items/insertAll";
const QUERY_PATH: &str = "/bigquery/v2/projects/proj/queries";

fn client(server: &ServerGuard) -> BigQueryClient {
    BigQueryClient::new(BigQueryConfig {
        project: Some("proj".to_string()),
        base_url: format!("{}/bigquery/v2", server.url()),
        access_token: Some(secret_string("test-token".to_string())),
        timeout_seconds: 5,
        retry: RetryConfig {
            initial_delay_ms: 10,
            max_delay_ms: 20,
            backoff_multiplier: 2.0,
        },
    })
    .unwrap()
}

fn table_body() -> String {
    json!({
        "kind": "bigquery#table",
        "id": "proj:ds.items",
        "schema": {"fields": [
            {"name": "id", "type": "INTEGER", "mode": "REQUIRED"},
            {"name": "name", "type": "STRING"},
            {"name": "pull_date", "type": "TIMESTAMP"}
        ]}
    })
    .to_string()
}

fn table() -> TableHandle {
    TableHandle::new(
        "proj.ds.items",
        SchemaInfo::new(vec![
            ColumnSchema::new("id", FieldType::Integer),
            ColumnSchema::new("name", FieldType::String),
        ]),
    )
}

fn row(id: i64) -> ProcessedRow {
    let mut row = ProcessedRow::new();
    row.insert("id".to_string(), json!(id));
    row
}

#[test]
fn test_get_table_reads_schema() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", TABLE_PATH)
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(table_body())
        .create();

    let table = client(&server).get_table("proj.ds.items").unwrap();

    mock.assert();
    assert_eq!(table.table_id, "proj.ds.items");
    assert_eq!(table.schema.column_names(), vec!["id", "name", "pull_date"]);
    assert_eq!(table.schema.field_type("pull_date"), Some(&FieldType::Timestamp));
}

#[test]
fn test_get_table_not_found() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", TABLE_PATH)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"code": 404, "message": "Not found: Table proj:ds.items"}}"#)
        .expect(1)
        .create();

    let result = client(&server).get_table("ds.items");

    mock.assert();
    match result {
        Err(QuarryError::SinkTransport(SinkError::TableNotFound(msg))) => {
            assert!(msg.contains("Not found: Table proj:ds.items"));
        }
        other => panic!("expected table not found, got {other:?}"),
    }
}

#[test]
fn test_insert_rows_sends_rows_and_returns_insert_errors() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", INSERT_PATH)
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::Json(json!({
            "rows": [{"json": {"id": 1}}, {"json": {"id": 2}}],
            "skipInvalidRows": false,
            "ignoreUnknownValues": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "kind": "bigquery#tableDataInsertAllResponse",
                "insertErrors": [
                    {"index": 1, "errors": [{"reason": "invalid", "location": "id", "message": "out of range"}]}
                ]
            })
            .to_string(),
        )
        .create();

    let errors = client(&server)
        .insert_rows(&table(), &[row(1), row(2)], Some(Duration::from_secs(5)))
        .unwrap();

    mock.assert();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].index, 1);
    assert_eq!(errors[0].message(), "id: out of range");
}

#[test]
fn test_insert_rows_client_error_is_not_retried() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", INSERT_PATH)
        .with_status(400)
        .with_body(r#"{"error": {"code": 400, "message": "No such field: colour"}}"#)
        .expect(1)
        .create();

    let result = client(&server).insert_rows(&table(), &[row(1)], Some(Duration::from_secs(5)));

    mock.assert();
    assert!(matches!(
        result,
        Err(QuarryError::SinkTransport(SinkError::ClientError { status: 400, message }))
            if message == "No such field: colour"
    ));
}

#[test]
fn test_insert_rows_server_error_retried_until_deadline() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", INSERT_PATH)
        .with_status(503)
        .with_body("backend unavailable")
        .expect_at_least(2)
        .create();

    let result = client(&server).insert_rows(
        &table(),
        &[row(1)],
        Some(Duration::from_millis(200)),
    );

    mock.assert();
    match result {
        Err(QuarryError::SinkTransport(SinkError::DeadlineExceeded {
            attempts,
            last_error,
            ..
        })) => {
            assert!(attempts >= 2);
            assert!(last_error.contains("503"));
        }
        other => panic!("expected deadline exceeded, got {other:?}"),
    }
}

#[test]
fn test_insert_rows_recovers_after_transient_error() {
    let mut server = Server::new();
    let failing = server
        .mock("POST", INSERT_PATH)
        .with_status(500)
        .expect(1)
        .create();
    let succeeding = server
        .mock("POST", INSERT_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"kind": "bigquery#tableDataInsertAllResponse"}"#)
        .expect(1)
        .create();

    let errors = client(&server)
        .insert_rows(&table(), &[row(1)], Some(Duration::from_secs(5)))
        .unwrap();

    failing.assert();
    succeeding.assert();
    assert!(errors.is_empty());
}

#[test]
fn test_dry_run_sends_nothing() {
    let mut server = Server::new();
    let mock = server.mock("POST", INSERT_PATH).expect(0).create();

    let client = client(&server).with_dry_run(true);
    let errors = client
        .insert_rows(&table(), &[row(1), row(2)], None)
        .unwrap();

    mock.assert();
    assert!(errors.is_empty());
    assert!(client.is_dry_run());
}

#[test]
fn test_query_count() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", QUERY_PATH)
        .match_body(Matcher::PartialJson(json!({
            "query": "SELECT COUNT(*) FROM `proj.ds.items`",
            "useLegacySql": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "kind": "bigquery#queryResponse",
                "jobComplete": true,
                "totalRows": "1",
                "rows": [{"f": [{"v": "3"}]}]
            })
            .to_string(),
        )
        .create();

    let result = client(&server)
        .query("SELECT COUNT(*) FROM `proj.ds.items`")
        .unwrap();

    mock.assert();
    assert_eq!(result.scalar_count().unwrap(), 3);
}

#[test]
fn test_query_bad_sql() {
    let mut server = Server::new();
    server
        .mock("POST", QUERY_PATH)
        .with_status(400)
        .with_body(r#"{"error": {"code": 400, "message": "Syntax error"}}"#)
        .create();

    let result = client(&server).query("SELEC 1");

    assert!(matches!(
        result,
        Err(QuarryError::SinkTransport(SinkError::QueryFailed(msg))) if msg.contains("Syntax error")
    ));
}

#[test]
fn test_export_through_rest_client() {
    let mut server = Server::new();
    let table_mock = server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(table_body())
        .create();
    let insert_mock = server
        .mock("POST", INSERT_PATH)
        .match_body(Matcher::PartialJson(json!({
            "rows": [
                {"json": {"id": 1, "name": "Anvil", "pull_date": "2023-01-15 00:00:00"}},
                {"json": {"id": 2, "name": "Hammer", "pull_date": "2023-01-15 00:00:00"}}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"insertErrors": [{"index": 1, "errors": [{"message": "duplicate"}]}]}).to_string(),
        )
        .expect(1)
        .create();

    let records: Vec<HashMap<String, FieldValue>> = [(1, "Anvil"), (2, "Hammer")]
        .into_iter()
        .map(|(id, name)| {
            HashMap::from([
                ("id".to_string(), FieldValue::Int(id)),
                ("name".to_string(), FieldValue::from(name)),
            ])
        })
        .collect();
    let source = MemorySource::new("items", ["id", "name"], records);
    let spec = ExportSpec::builder()
        .table_id("proj.ds.items")
        .fields(["id", "name"])
        .batch_size(BatchSize::Unbounded)
        .build()
        .unwrap();

    let exporter = Exporter::new(spec, source, client(&server)).unwrap();
    let errors = exporter
        .export(Some(Timestamp::parse("2023-01-15").unwrap()), None)
        .unwrap();

    table_mock.assert();
    insert_mock.assert();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].index, 1);
    assert_eq!(errors[0].message(), "duplicate");
}
