//! Run Record - one observed trial of an algorithm variant

use crate::domain::MetricKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single metric cell as it appeared in the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    /// Empty, null, or NaN cell.
    Missing,
    /// Parsed numeric value.
    Value(f64),
    /// Present but not numeric; the raw text is kept for error reporting.
    Invalid(String),
}

impl MetricValue {
    /// Parse a text cell.
    ///
    /// Blank cells are `Missing`; NaN is treated as missing as well.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Self::from_f64(v),
            Err(_) => Self::Invalid(raw.to_string()),
        }
    }

    /// Wrap a numeric value, mapping NaN to `Missing`.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Value(value)
        }
    }

    /// The numeric value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Missing | Self::Invalid(_) => None,
        }
    }
}

/// Run Record represents a single trial of one algorithm variant.
///
/// Metrics are only meaningful when `outcome` is true; consumers must not
/// rely on them for failed runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord<M: MetricKind> {
    variant: String,
    outcome: bool,
    metrics: BTreeMap<M, MetricValue>,
}

impl<M: MetricKind> RunRecord<M> {
    /// Create a record with every metric `Missing`.
    #[must_use]
    pub fn new(variant: impl Into<String>, outcome: bool) -> Self {
        Self {
            variant: variant.into(),
            outcome,
            metrics: M::ALL.iter().map(|m| (*m, MetricValue::Missing)).collect(),
        }
    }

    /// Create a builder for constructing a record with metric values.
    #[must_use]
    pub fn builder(variant: impl Into<String>, outcome: bool) -> RunRecordBuilder<M> {
        RunRecordBuilder::new(variant, outcome)
    }

    /// Get the variant label.
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Whether the run reached a valid result.
    #[must_use]
    pub const fn outcome(&self) -> bool {
        self.outcome
    }

    /// Get a metric cell.
    #[must_use]
    pub fn metric(&self, metric: M) -> &MetricValue {
        static MISSING: MetricValue = MetricValue::Missing;
        self.metrics.get(&metric).unwrap_or(&MISSING)
    }

    /// All metric cells, keyed by metric.
    #[must_use]
    pub const fn metrics(&self) -> &BTreeMap<M, MetricValue> {
        &self.metrics
    }
}

/// Builder for `RunRecord`.
#[derive(Debug)]
pub struct RunRecordBuilder<M: MetricKind> {
    record: RunRecord<M>,
}

impl<M: MetricKind> RunRecordBuilder<M> {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(variant: impl Into<String>, outcome: bool) -> Self {
        Self {
            record: RunRecord::new(variant, outcome),
        }
    }

    /// Set a numeric metric.
    #[must_use]
    pub fn metric(self, metric: M, value: f64) -> Self {
        self.cell(metric, MetricValue::from_f64(value))
    }

    /// Set a metric cell directly.
    #[must_use]
    pub fn cell(mut self, metric: M, value: MetricValue) -> Self {
        self.record.metrics.insert(metric, value);
        self
    }

    /// Build the `RunRecord`.
    #[must_use]
    pub fn build(self) -> RunRecord<M> {
        self.record
    }
}
