//! Tests for output module

use super::*;
use crate::types::Record;
use arrow::array::StringArray;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;
use std::fs::File;
use tempfile::tempdir;

fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

// ============================================================================
// JSON Lines Sink Tests
// ============================================================================

#[tokio::test]
async fn test_jsonl_sink_writes_one_line_per_record() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.json");
    let mut sink = JsonLinesSink::new();

    let page = records(vec![json!({"id": 1}), json!({"id": 2, "name": "Bob"})]);
    sink.on_page(&dest, &page).await.unwrap();

    let contents = std::fs::read_to_string(&dest).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["name"], "Bob");
}

#[tokio::test]
async fn test_jsonl_sink_appends_across_pages_and_runs() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.json");
    std::fs::write(&dest, "{\"id\":0}\n").unwrap();

    let mut sink = JsonLinesSink::new();
    sink.on_page(&dest, &records(vec![json!({"id": 1})]))
        .await
        .unwrap();
    sink.on_page(&dest, &records(vec![json!({"id": 2})]))
        .await
        .unwrap();
    sink.on_complete(&dest, &[]).await.unwrap();

    let contents = std::fs::read_to_string(&dest).unwrap();
    assert_eq!(contents, "{\"id\":0}\n{\"id\":1}\n{\"id\":2}\n");
}

// ============================================================================
// Memory Sink Tests
// ============================================================================

#[tokio::test]
async fn test_memory_sink_accumulates() {
    let dest = std::path::Path::new("unused.json");
    let mut sink = MemorySink::new();

    sink.on_page(dest, &records(vec![json!({"id": 1}), json!({"id": 2})]))
        .await
        .unwrap();
    sink.on_page(dest, &records(vec![json!({"id": 3})]))
        .await
        .unwrap();
    assert!(!sink.is_complete());

    sink.on_complete(dest, &[]).await.unwrap();
    assert!(sink.is_complete());
    assert_eq!(sink.pages(), 2);
    assert_eq!(sink.records().len(), 3);
    assert_eq!(sink.into_records()[2]["id"], 3);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_noop_sink_writes_nothing() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.json");
    let mut sink = NoopSink;

    sink.on_page(&dest, &records(vec![json!({"id": 1})]))
        .await
        .unwrap();
    sink.on_complete(&dest, &[]).await.unwrap();

    assert!(!dest.exists());
}

// ============================================================================
// Parquet Tests
// ============================================================================

#[test]
fn test_parquet_writer_config_default() {
    let config = ParquetWriterConfig::default();
    assert_eq!(config.row_group_size(), 1024 * 1024);

    let config = ParquetWriterConfig::new().with_row_group_size(10).zstd();
    assert_eq!(config.row_group_size(), 10);
}

#[test]
fn test_records_to_batch() {
    let batch = records_to_batch(&records(vec![
        json!({"id": "1", "name": "Alice", "score": 9.5}),
        json!({"id": "2", "name": "Bob", "score": 7}),
    ]))
    .unwrap();

    assert_eq!(batch.num_rows(), 2);
    let schema = batch.schema();
    assert_eq!(schema.field_with_name("id").unwrap().data_type(), &DataType::Utf8);
    assert_eq!(
        schema.field_with_name("score").unwrap().data_type(),
        &DataType::Float64
    );
}

#[test]
fn test_records_to_batch_missing_fields() {
    let batch = records_to_batch(&records(vec![
        json!({"id": "1", "name": "Alice"}),
        json!({"id": "2"}),
    ]))
    .unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 2);
}

#[test]
fn test_records_to_batch_keeps_consistent_nested_columns() {
    let batch = records_to_batch(&records(vec![
        json!({"loc": {"lat": "1"}}),
        json!({"loc": {"lat": "2"}}),
    ]))
    .unwrap();
    assert!(matches!(
        batch.schema().field_with_name("loc").unwrap().data_type(),
        DataType::Struct(_)
    ));
}

#[test]
fn test_records_to_batch_object_and_scalar_in_one_column() {
    let batch = records_to_batch(&records(vec![
        json!({"id": 1, "loc": {"lat": "1"}}),
        json!({"id": 2, "loc": "n/a"}),
    ]))
    .unwrap();

    assert_eq!(batch.num_rows(), 2);
    let loc = batch
        .column_by_name("loc")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(loc.value(0), r#"{"lat":"1"}"#);
    assert_eq!(loc.value(1), "n/a");
}

#[test]
fn test_records_to_batch_empty() {
    assert!(records_to_batch(&[]).is_err());
}

#[test]
fn test_write_records_to_parquet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.parquet");

    let rows = write_records_to_parquet(
        &path,
        &records(vec![json!({"id": "1"}), json!({"id": "2"}), json!({"id": "3"})]),
        &ParquetWriterConfig::default(),
    )
    .unwrap();
    assert_eq!(rows, 3);

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let total: usize = reader.map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(total, 3);
}

#[tokio::test]
async fn test_parquet_sink_writes_snapshot_on_complete() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.json");
    let mut sink = ParquetSink::new();

    sink.on_page(&dest, &records(vec![json!({"id": "1"}), json!({"id": "2"})]))
        .await
        .unwrap();
    assert_eq!(sink.buffered(), 2);

    let snapshot = ParquetSink::snapshot_path(&dest);
    assert_eq!(snapshot, dir.path().join("out.json.parquet"));
    assert!(!snapshot.exists());

    sink.on_complete(&dest, &[]).await.unwrap();
    assert!(snapshot.exists());
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_parquet_sink_skips_empty_snapshot() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.json");
    let mut sink = ParquetSink::with_config(ParquetWriterConfig::new().uncompressed());

    sink.on_complete(&dest, &[]).await.unwrap();
    assert!(!ParquetSink::snapshot_path(&dest).exists());
}

#[tokio::test]
async fn test_parquet_sink_survives_conflicting_nested_types() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.json");
    let mut sink = ParquetSink::new();

    sink.on_page(&dest, &records(vec![json!({"loc": {"lat": "1"}})]))
        .await
        .unwrap();
    sink.on_page(&dest, &records(vec![json!({"loc": "n/a"}), json!({"loc": [1, 2]})]))
        .await
        .unwrap();
    sink.on_complete(&dest, &[]).await.unwrap();

    let reader = ParquetRecordBatchReaderBuilder::try_new(
        File::open(ParquetSink::snapshot_path(&dest)).unwrap(),
    )
    .unwrap()
    .build()
    .unwrap();
    let total: usize = reader.map(|b| b.unwrap().num_rows()).sum();
    assert_eq!(total, 3);
}
