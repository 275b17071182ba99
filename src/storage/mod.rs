//! Storage backend (Arrow/Parquet/CSV)
//!
//! Reads a whole run log into memory as Arrow record batches. Delimited files
//! are read with every column as text so that cells like `-` or blanks on
//! failed runs survive until the typed extraction step decides what they mean.
//! Parquet files keep their native column types.

use crate::{Error, Result};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Format of a tabular source, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Delimited text with a header row
    Csv,
    /// Apache Parquet
    Parquet,
}

impl TableFormat {
    /// `.parquet` selects Parquet; anything else is read as CSV
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Self::Parquet,
            _ => Self::Csv,
        }
    }
}

/// A fully loaded table of run rows
#[derive(Debug, Clone)]
pub struct RunTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl RunTable {
    /// Create a table from existing batches
    ///
    /// Useful for testing
    #[must_use]
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    /// Load a table, dispatching on the file extension
    ///
    /// # Errors
    /// Returns [`Error::DataSource`] if the file cannot be opened or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match TableFormat::from_path(path) {
            TableFormat::Csv => Self::load_csv(path),
            TableFormat::Parquet => Self::load_parquet(path),
        }
    }

    /// Load table from a CSV file with a header row
    ///
    /// # Errors
    /// Returns [`Error::DataSource`] if the file cannot be opened or parsed
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        use arrow::csv::reader::Format;
        use arrow::csv::ReaderBuilder;

        let path = path.as_ref();
        let format = Format::default().with_header(true);

        let header_file = File::open(path)
            .map_err(|e| Error::data_source(path, format!("Failed to open CSV file: {e}")))?;
        let (header, _) = format
            .infer_schema(header_file, Some(0))
            .map_err(|e| Error::data_source(path, format!("Failed to read CSV header: {e}")))?;

        let fields: Vec<Field> = header
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect();
        let schema: SchemaRef = Arc::new(Schema::new(fields));

        let file = File::open(path)
            .map_err(|e| Error::data_source(path, format!("Failed to open CSV file: {e}")))?;
        let reader = ReaderBuilder::new(Arc::clone(&schema))
            .with_header(true)
            .build(file)
            .map_err(|e| Error::data_source(path, format!("Failed to create CSV reader: {e}")))?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch
                .map_err(|e| Error::data_source(path, format!("Failed to read CSV rows: {e}")))?;
            batches.push(batch);
        }

        debug!(path = %path.display(), batches = batches.len(), "loaded CSV table");
        Ok(Self { schema, batches })
    }

    /// Load table from Parquet file
    ///
    /// # Errors
    /// Returns [`Error::DataSource`] if the file cannot be opened or parsed
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::data_source(path, format!("Failed to open Parquet file: {e}")))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| Error::data_source(path, format!("Failed to parse Parquet file: {e}")))?;
        let schema = Arc::clone(builder.schema());

        let reader = builder.build().map_err(|e| {
            Error::data_source(path, format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::data_source(path, format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }

        debug!(path = %path.display(), batches = batches.len(), "loaded Parquet table");
        Ok(Self { schema, batches })
    }

    /// Table schema (available even when there are no rows)
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Get all record batches, in file order
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows across batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}
