//! Parquet snapshot writer
//!
//! Converts accumulated JSON records to an Arrow RecordBatch and writes
//! it as a single Parquet file.

use crate::error::{Error, Result};
use crate::types::Record;
use arrow::error::ArrowError;
use arrow::json::reader::{infer_json_schema_from_iterator, ReaderBuilder};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Convert records to a RecordBatch with an inferred schema.
///
/// Mixed scalar types in one column are coerced to strings. If nested
/// values conflict with each other or with scalars, every object and array
/// is written as its JSON text instead, so a buffered run is never lost to
/// a schema mismatch.
pub fn records_to_batch(records: &[Record]) -> Result<RecordBatch> {
    if records.is_empty() {
        return Err(Error::output("No records to convert"));
    }

    let values: Vec<Value> = records.iter().cloned().map(Value::Object).collect();
    let batch = match decode_batch(&values) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "Conflicting column types, writing nested values as JSON text");
            let flattened: Vec<Value> = records.iter().map(stringify_nested).collect();
            decode_batch(&flattened)?
        }
    };

    batch.ok_or_else(|| Error::output("Decoder produced no rows"))
}

fn decode_batch(values: &[Value]) -> std::result::Result<Option<RecordBatch>, ArrowError> {
    let schema = infer_json_schema_from_iterator(values.iter().map(Ok::<_, ArrowError>))?;

    let mut decoder = ReaderBuilder::new(Arc::new(schema))
        .with_batch_size(values.len())
        .with_coerce_primitive(true)
        .build_decoder()?;
    decoder.serialize(values)?;
    decoder.flush()
}

fn stringify_nested(record: &Record) -> Value {
    Value::Object(
        record
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Object(_) | Value::Array(_) => Value::String(value.to_string()),
                    other => other.clone(),
                };
                (key.clone(), value)
            })
            .collect(),
    )
}

/// Write records to a Parquet file, replacing any existing file
pub fn write_records_to_parquet(
    path: impl AsRef<Path>,
    records: &[Record],
    config: &ParquetWriterConfig,
) -> Result<usize> {
    let batch = records_to_batch(records)?;

    let file = File::create(path.as_ref()).map_err(|e| Error::Output {
        message: format!("Failed to create file: {e}"),
    })?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(config.build_properties()))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(batch.num_rows())
}
