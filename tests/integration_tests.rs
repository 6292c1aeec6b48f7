//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → paged HTTP requests → output
//! file and audit log

use clap::Parser;
use serde_json::{json, Value};
use soda_fetch::audit::AuditLog;
use soda_fetch::cli::{Cli, Runner};
use soda_fetch::config::{ConfigFile, ConfigOverrides, SessionConfig};
use soda_fetch::engine::{Session, SyncEngine};
use soda_fetch::http::HttpClientConfig;
use soda_fetch::output::{JsonLinesSink, ParquetSink};
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DATASET: &str = "/resource/wr8u-xric.json";

async fn mount_offset(server: &MockServer, offset: u64, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(DATASET))
        .and(header("X-App-Token", "integration-token"))
        .and(query_param("$offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path).unwrap().lines().count()
}

// ============================================================================
// Library Flow
// ============================================================================

#[tokio::test]
async fn test_two_record_dataset() {
    let server = MockServer::start().await;
    mount_offset(&server, 0, 200, json!([{"id": 1}, {"id": 2}])).await;
    mount_offset(&server, 2, 200, json!([])).await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("fire.json");
    let config = SessionConfig::new(
        format!("{}{DATASET}", server.uri()),
        "integration-token",
        &dest,
    )
    .with_limit(2);

    let mut session = Session::new(config);
    let mut engine = SyncEngine::for_session(&session, HttpClientConfig::default()).unwrap();
    let stats = engine
        .run(&mut session, &mut JsonLinesSink::new())
        .await
        .unwrap();

    assert_eq!(stats.pages_written, 1);
    assert_eq!(line_count(&dest), 2);

    let log = AuditLog::for_destination(&dest);
    let entries = log.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.status == 200));
}

#[tokio::test]
async fn test_failed_first_page_is_skipped() {
    let server = MockServer::start().await;
    mount_offset(&server, 0, 500, json!({"error": true})).await;
    mount_offset(&server, 2, 200, json!([{"id": 3}])).await;
    mount_offset(&server, 4, 200, json!([])).await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("fire.json");
    let config = SessionConfig::new(
        format!("{}{DATASET}", server.uri()),
        "integration-token",
        &dest,
    )
    .with_limit(2);

    let mut session = Session::new(config);
    let mut engine = SyncEngine::for_session(&session, HttpClientConfig::default()).unwrap();
    let stats = engine
        .run(&mut session, &mut JsonLinesSink::new())
        .await
        .unwrap();

    assert_eq!(stats.requests, 3);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.final_offset, 6);
    assert_eq!(line_count(&dest), 1);

    let log = AuditLog::for_destination(&dest);
    let statuses: Vec<u16> = log
        .entries()
        .await
        .unwrap()
        .iter()
        .map(|e| e.status)
        .collect();
    assert_eq!(statuses, vec![500, 200, 200]);
    assert!(std::fs::read_to_string(log.path())
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .ends_with(": \"500\"}"));
}

#[tokio::test]
async fn test_config_file_to_parquet_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DATASET))
        .and(query_param("battalion", "B02"))
        .and(query_param("$select", "id, battalion"))
        .and(query_param("$offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "battalion": "B02"},
            {"id": "2", "battalion": "B02"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DATASET))
        .and(query_param("$offset", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("snapshot.json");
    let yaml = format!(
        "url: \"{}{DATASET}\"\ntoken: integration-token\noutput_file: \"{}\"\n$select: \"id, battalion\"\nfilters:\n  battalion: B02\n",
        server.uri(),
        dest.display()
    );

    let file = ConfigFile::from_yaml(&yaml).unwrap();
    let config = SessionConfig::resolve(file, ConfigOverrides::default()).unwrap();
    let mut session = Session::new(config);
    let mut engine = SyncEngine::for_session(&session, HttpClientConfig::default()).unwrap();
    let mut sink = ParquetSink::new();

    let stats = engine.run(&mut session, &mut sink).await.unwrap();

    assert_eq!(stats.records_written, 2);
    assert!(ParquetSink::snapshot_path(&dest).exists());
    assert!(!dest.exists());
}

// ============================================================================
// CLI Flow
// ============================================================================

#[tokio::test]
async fn test_cli_runner_writes_jsonl() {
    let server = MockServer::start().await;
    mount_offset(&server, 10, 200, json!([{"id": 11}, {"id": 12}, {"id": 13}])).await;
    mount_offset(&server, 13, 200, json!([])).await;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("cli.json");
    let url = format!("{}{DATASET}", server.uri());
    let outfile = dest.to_string_lossy().to_string();

    let cli = Cli::try_parse_from([
        "soda-fetch",
        "--url",
        url.as_str(),
        "--token",
        "integration-token",
        "--outfile",
        outfile.as_str(),
        "--offset",
        "10",
        "--limit",
        "3",
    ])
    .unwrap();

    Runner::new(cli).run().await.unwrap();

    assert_eq!(line_count(&dest), 3);
    assert_eq!(line_count(AuditLog::for_destination(&dest).path()), 2);
}

#[tokio::test]
async fn test_cli_missing_token_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("{}{DATASET}", server.uri());
    let cli = Cli::try_parse_from(["soda-fetch", "--url", url.as_str()]).unwrap();

    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(matches!(
        err,
        soda_fetch::Error::MissingArgument { ref field } if field == "token"
    ));
}
