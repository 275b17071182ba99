//! Record Store - the typed, ordered run log for one domain
//!
//! Loading happens in three steps: read the raw table (see
//! [`RunTable`]), validate its header against the domain schema, then extract
//! one [`RunRecord`] per row in file order.

use std::collections::HashSet;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, RecordBatch, StringArray};
use arrow::compute;
use arrow::datatypes::{DataType, Float64Type, Schema};
use tracing::{debug, info};

use super::{MetricValue, RunRecord};
use crate::domain::{required_columns, Domain, MetricKind};
use crate::storage::RunTable;
use crate::{Error, Result};

/// Immutable, ordered sequence of run records.
#[derive(Debug, Clone)]
pub struct RecordStore<M: MetricKind> {
    records: Vec<RunRecord<M>>,
}

impl<M: MetricKind> RecordStore<M> {
    /// Wrap records that are already in memory.
    #[must_use]
    pub fn new(records: Vec<RunRecord<M>>) -> Self {
        Self { records }
    }

    /// Load and validate a run log for domain `D`.
    ///
    /// Row order is preserved and values are not filtered. A row succeeded
    /// exactly when its outcome cell equals `D::SUCCESS_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataSource`] if the file is missing or unreadable,
    /// a required column is absent, a variant cell is empty, or the table
    /// has no rows.
    pub fn load<D>(source: impl AsRef<Path>) -> Result<Self>
    where
        D: Domain<Metric = M>,
    {
        let source = source.as_ref();
        let table = RunTable::load(source)?;
        let columns = ColumnMap::<M>::resolve::<D>(&table.schema(), source)?;

        let mut records = Vec::with_capacity(table.num_rows());
        for batch in table.batches() {
            columns.extract_batch::<D>(batch, source, &mut records)?;
        }

        if records.is_empty() {
            return Err(Error::data_source(source, "table contains no run records"));
        }

        info!(
            domain = D::NAME,
            path = %source.display(),
            records = records.len(),
            "loaded run records"
        );
        Ok(Self { records })
    }

    /// All records in source order.
    #[must_use]
    pub fn records(&self) -> &[RunRecord<M>] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct variant labels in order of first appearance.
    #[must_use]
    pub fn variants(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(RunRecord::variant)
            .filter(|v| seen.insert(*v))
            .collect()
    }
}

/// Column positions of the domain schema inside a loaded table.
struct ColumnMap<M> {
    variant: usize,
    outcome: usize,
    metrics: Vec<(M, usize)>,
}

impl<M: MetricKind> ColumnMap<M> {
    fn resolve<D: Domain<Metric = M>>(schema: &Schema, source: &Path) -> Result<Self> {
        let position = |name: &str| {
            schema
                .fields()
                .iter()
                .position(|f| f.name() == name)
                .ok_or_else(|| {
                    Error::data_source(
                        source,
                        format!(
                            "missing required column '{name}' (expected {})",
                            required_columns::<D>().join(", ")
                        ),
                    )
                })
        };

        let variant = position(D::VARIANT_COLUMN)?;
        let outcome = position(D::OUTCOME_COLUMN)?;
        let metrics = M::ALL
            .iter()
            .map(|m| position(m.column()).map(|idx| (*m, idx)))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            domain = D::NAME,
            columns = schema.fields().len(),
            "schema validated"
        );
        Ok(Self {
            variant,
            outcome,
            metrics,
        })
    }

    fn extract_batch<D: Domain<Metric = M>>(
        &self,
        batch: &RecordBatch,
        source: &Path,
        out: &mut Vec<RunRecord<M>>,
    ) -> Result<()> {
        let variants = text_column(batch.column(self.variant), D::VARIANT_COLUMN, source)?;
        let outcomes = text_column(batch.column(self.outcome), D::OUTCOME_COLUMN, source)?;
        let metrics = self
            .metrics
            .iter()
            .map(|(m, idx)| Ok((*m, metric_cells(batch.column(*idx), m.column(), source)?)))
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            if variants.is_null(row) || variants.value(row).is_empty() {
                return Err(Error::data_source(
                    source,
                    format!(
                        "empty value in column '{}' at row {}",
                        D::VARIANT_COLUMN,
                        out.len() + 1
                    ),
                ));
            }
            let outcome = outcomes.is_valid(row) && outcomes.value(row) == D::SUCCESS_TOKEN;

            let mut builder = RunRecord::builder(variants.value(row), outcome);
            for (metric, cells) in &metrics {
                builder = builder.cell(*metric, cells[row].clone());
            }
            out.push(builder.build());
        }
        Ok(())
    }
}

/// View a column as UTF-8 text, casting from other types when needed.
fn text_column(array: &ArrayRef, column: &str, source: &Path) -> Result<StringArray> {
    let cast = if array.data_type() == &DataType::Utf8 {
        ArrayRef::clone(array)
    } else {
        compute::cast(array, &DataType::Utf8).map_err(|e| {
            Error::data_source(source, format!("column '{column}' is not text: {e}"))
        })?
    };
    Ok(cast.as_string::<i32>().clone())
}

/// Convert a metric column into cells. Numeric columns are cast to f64;
/// text columns are parsed cell by cell.
fn metric_cells(array: &ArrayRef, column: &str, source: &Path) -> Result<Vec<MetricValue>> {
    if array.data_type().is_numeric() {
        let cast = compute::cast(array, &DataType::Float64).map_err(|e| {
            Error::data_source(source, format!("column '{column}' is not numeric: {e}"))
        })?;
        let values = cast.as_primitive::<Float64Type>();
        return Ok((0..values.len())
            .map(|i| {
                if values.is_null(i) {
                    MetricValue::Missing
                } else {
                    MetricValue::from_f64(values.value(i))
                }
            })
            .collect());
    }

    let text = text_column(array, column, source)?;
    Ok((0..text.len())
        .map(|i| {
            if text.is_null(i) {
                MetricValue::Missing
            } else {
                MetricValue::parse(text.value(i))
            }
        })
        .collect())
}
