//! Group aggregation
//!
//! Turns a run log into one [`VariantSummary`] per variant. Two denominators
//! are involved and each gets its own pass:
//!
//! - [`success_rate`] counts over the whole partition, failures included
//! - [`mean_metrics`] averages over the successful subset only
//!
//! Each metric is collected into a nullable `Float64Array` so that missing
//! cells drop out of both the sum and the count. Present values are summed in
//! ascending order, which makes every mean independent of record order.

use std::collections::{BTreeMap, HashMap};

use arrow::array::Float64Array;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::MetricKind;
use crate::experiment::{MetricValue, RunRecord};
use crate::{Error, Result};

/// Mean metric values of one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MetricMeans<M: MetricKind> {
    /// The variant has no successful run, so no mean exists.
    Unavailable,
    /// Means over the successful subset; `None` when no successful run
    /// carries the metric.
    Available(BTreeMap<M, Option<f64>>),
}

impl<M: MetricKind> MetricMeans<M> {
    /// Mean of one metric, if available.
    #[must_use]
    pub fn get(&self, metric: M) -> Option<f64> {
        match self {
            Self::Unavailable => None,
            Self::Available(means) => means.get(&metric).copied().flatten(),
        }
    }

    /// Whether any mean could be computed at all.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Derived statistics for one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantSummary<M: MetricKind> {
    variant: String,
    total_runs: usize,
    successful_runs: usize,
    success_rate: f64,
    means: MetricMeans<M>,
}

impl<M: MetricKind> VariantSummary<M> {
    /// Variant label.
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Number of runs recorded for the variant.
    #[must_use]
    pub const fn total_runs(&self) -> usize {
        self.total_runs
    }

    /// Number of runs with a positive outcome.
    #[must_use]
    pub const fn successful_runs(&self) -> usize {
        self.successful_runs
    }

    /// Fraction of all runs that succeeded, in `[0, 1]`.
    #[must_use]
    pub const fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// Per-metric means over the successful subset.
    #[must_use]
    pub const fn means(&self) -> &MetricMeans<M> {
        &self.means
    }
}

/// Summaries for every variant, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation<M: MetricKind> {
    summaries: Vec<VariantSummary<M>>,
}

impl<M: MetricKind> Aggregation<M> {
    /// Look up a variant's summary.
    #[must_use]
    pub fn get(&self, variant: &str) -> Option<&VariantSummary<M>> {
        self.summaries.iter().find(|s| s.variant == variant)
    }

    /// Iterate summaries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &VariantSummary<M>> {
        self.summaries.iter()
    }

    /// Number of variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Check if there are no variants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Total runs across all variants.
    #[must_use]
    pub fn total_runs(&self) -> usize {
        self.summaries.iter().map(VariantSummary::total_runs).sum()
    }
}

/// Compute one summary per distinct variant.
///
/// # Errors
///
/// Returns [`Error::Aggregation`] if a successful run carries a non-numeric
/// metric cell.
pub fn aggregate<M: MetricKind>(records: &[RunRecord<M>]) -> Result<Aggregation<M>> {
    let partitions = partition(records);
    debug!(
        records = records.len(),
        variants = partitions.len(),
        "partitioned runs"
    );

    let summaries = partitions
        .into_iter()
        .map(|(variant, runs)| {
            let (successful_runs, success_rate) = success_rate(&runs);
            let means = mean_metrics(variant, &runs)?;
            Ok(VariantSummary {
                variant: variant.to_string(),
                total_runs: runs.len(),
                successful_runs,
                success_rate,
                means,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(variants = summaries.len(), "aggregated run records");
    Ok(Aggregation { summaries })
}

/// Group records by variant, keeping the order in which variants first appear.
#[must_use]
pub fn partition<M: MetricKind>(records: &[RunRecord<M>]) -> Vec<(&str, Vec<&RunRecord<M>>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&RunRecord<M>>)> = Vec::new();

    for record in records {
        let slot = *index.entry(record.variant()).or_insert_with(|| {
            groups.push((record.variant(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }
    groups
}

/// Successful run count and success rate over the whole partition.
///
/// Grouping never yields an empty partition; an empty slice reports a rate
/// of 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn success_rate<M: MetricKind>(runs: &[&RunRecord<M>]) -> (usize, f64) {
    let successes = runs.iter().filter(|r| r.outcome()).count();
    if runs.is_empty() {
        return (0, 0.0);
    }
    (successes, successes as f64 / runs.len() as f64)
}

/// Per-metric means over the successful subset of a partition.
///
/// # Errors
///
/// Returns [`Error::Aggregation`] if a successful run carries a non-numeric
/// metric cell.
pub fn mean_metrics<M: MetricKind>(
    variant: &str,
    runs: &[&RunRecord<M>],
) -> Result<MetricMeans<M>> {
    for (metric, raw) in ignored_cells(runs) {
        warn!(
            variant,
            column = metric.column(),
            value = raw,
            "ignoring non-numeric metric on failed run"
        );
    }

    let successful: Vec<&RunRecord<M>> = runs.iter().copied().filter(|r| r.outcome()).collect();
    if successful.is_empty() {
        return Ok(MetricMeans::Unavailable);
    }

    let mut means = BTreeMap::new();
    for metric in M::ALL {
        let column = successful
            .iter()
            .map(|r| match r.metric(metric) {
                MetricValue::Value(v) => Ok(Some(*v)),
                MetricValue::Missing => Ok(None),
                MetricValue::Invalid(raw) => Err(Error::Aggregation {
                    variant: variant.to_string(),
                    column: metric.column().to_string(),
                    reason: format!("non-numeric value '{raw}' in a successful run"),
                }),
            })
            .collect::<Result<Float64Array>>()?;
        means.insert(metric, column_mean(&column));
    }
    Ok(MetricMeans::Available(means))
}

/// Non-numeric cells on failed runs; these never reach a mean.
fn ignored_cells<'a, M: MetricKind>(runs: &[&'a RunRecord<M>]) -> Vec<(M, &'a str)> {
    runs.iter()
        .copied()
        .filter(|r| !r.outcome())
        .flat_map(RunRecord::metrics)
        .filter_map(|(metric, cell)| match cell {
            MetricValue::Invalid(raw) => Some((*metric, raw.as_str())),
            MetricValue::Missing | MetricValue::Value(_) => None,
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn column_mean(column: &Float64Array) -> Option<f64> {
    let mut values: Vec<f64> = column.iter().flatten().collect();
    if values.is_empty() {
        return None;
    }
    // Sum in ascending order so the result does not depend on record order
    values.sort_by(f64::total_cmp);
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScheduleMetric, SearchMetric};

    fn search_run(
        variant: &str,
        outcome: bool,
        time: f64,
        len: f64,
        nodes: f64,
    ) -> RunRecord<SearchMetric> {
        RunRecord::builder(variant, outcome)
            .metric(SearchMetric::TimeTaken, time)
            .metric(SearchMetric::PathLength, len)
            .metric(SearchMetric::NodesExpanded, nodes)
            .build()
    }

    #[test]
    fn test_partition_keeps_first_appearance_order() {
        let records = vec![
            search_run("B", true, 1.0, 1.0, 1.0),
            search_run("A", true, 1.0, 1.0, 1.0),
            search_run("B", false, 0.0, 0.0, 0.0),
        ];
        let groups = partition(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "B");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "A");
    }

    #[test]
    fn test_success_rate_includes_failures() {
        let records = vec![
            search_run("A", true, 1.0, 1.0, 1.0),
            search_run("A", false, 0.0, 0.0, 0.0),
            search_run("A", false, 0.0, 0.0, 0.0),
            search_run("A", true, 1.0, 1.0, 1.0),
        ];
        let runs: Vec<_> = records.iter().collect();
        let (successes, rate) = success_rate(&runs);

        assert_eq!(successes, 2);
        assert!((rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_empty_slice() {
        let runs: Vec<&RunRecord<SearchMetric>> = Vec::new();
        assert_eq!(success_rate(&runs), (0, 0.0));
    }

    #[test]
    fn test_means_exclude_failed_runs() {
        // Failed runs log zeros; they must not drag the mean down
        let records = vec![
            search_run("A", true, 2.0, 10.0, 100.0),
            search_run("A", false, 0.0, 0.0, 0.0),
            search_run("A", true, 4.0, 20.0, 300.0),
        ];
        let runs: Vec<_> = records.iter().collect();
        let means = mean_metrics("A", &runs).unwrap();

        assert_eq!(means.get(SearchMetric::TimeTaken), Some(3.0));
        assert_eq!(means.get(SearchMetric::PathLength), Some(15.0));
        assert_eq!(means.get(SearchMetric::NodesExpanded), Some(200.0));
    }

    #[test]
    fn test_no_successes_is_unavailable_not_zero() {
        let records = vec![
            search_run("A", false, 0.0, 0.0, 0.0),
            search_run("A", false, 0.0, 0.0, 0.0),
        ];
        let runs: Vec<_> = records.iter().collect();
        let means = mean_metrics("A", &runs).unwrap();

        assert_eq!(means, MetricMeans::Unavailable);
        assert_eq!(means.get(SearchMetric::TimeTaken), None);
    }

    #[test]
    fn test_missing_cells_do_not_contribute() {
        let records = vec![
            RunRecord::builder("CSP", true)
                .metric(ScheduleMetric::TimeTaken, 1.0)
                .metric(ScheduleMetric::BacktrackCount, 4.0)
                .build(),
            RunRecord::builder("CSP", true)
                .metric(ScheduleMetric::TimeTaken, 3.0)
                .build(),
        ];
        let runs: Vec<_> = records.iter().collect();
        let means = mean_metrics("CSP", &runs).unwrap();

        assert_eq!(means.get(ScheduleMetric::TimeTaken), Some(2.0));
        assert_eq!(means.get(ScheduleMetric::BacktrackCount), Some(4.0));
        // Absent on every successful run
        assert!(means.is_available());
        assert_eq!(means.get(ScheduleMetric::Assignments), None);
    }

    #[test]
    fn test_invalid_cell_in_successful_run_fails() {
        let records = vec![RunRecord::builder("A", true)
            .cell(SearchMetric::PathLength, MetricValue::Invalid("n/a".to_string()))
            .build()];

        let err = aggregate(&records).unwrap_err();
        match err {
            Error::Aggregation { variant, column, reason } => {
                assert_eq!(variant, "A");
                assert_eq!(column, "PathLength");
                assert!(reason.contains("n/a"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_cell_in_failed_run_is_ignored() {
        let records = vec![
            search_run("A", true, 1.0, 2.0, 3.0),
            RunRecord::builder("A", false)
                .cell(SearchMetric::TimeTaken, MetricValue::Invalid("-".to_string()))
                .build(),
        ];

        let aggregation = aggregate(&records).unwrap();
        let summary = aggregation.get("A").unwrap();
        assert_eq!(summary.means().get(SearchMetric::TimeTaken), Some(1.0));
    }

    #[test]
    fn test_fractional_means_ignore_record_order() {
        let records: Vec<_> = (0..50)
            .map(|i| {
                let i = f64::from(i);
                search_run("A", true, 0.1 * i + 1.0 / (i + 7.0), i, i)
            })
            .collect();
        let expected = aggregate(&records).unwrap();

        for pivot in 1..records.len() {
            let mut rotated = records.clone();
            rotated.rotate_left(pivot);
            let actual = aggregate(&rotated).unwrap();
            let time = |a: &Aggregation<SearchMetric>| {
                a.get("A").unwrap().means().get(SearchMetric::TimeTaken).unwrap().to_bits()
            };
            assert_eq!(time(&actual), time(&expected), "rotation {pivot} changed the mean");
        }
    }

    #[test]
    fn test_ignored_cells_reported_without_successes() {
        let records = vec![
            RunRecord::builder("A", false)
                .cell(SearchMetric::TimeTaken, MetricValue::Invalid("-".to_string()))
                .build(),
            RunRecord::builder("A", false)
                .cell(SearchMetric::PathLength, MetricValue::Invalid("none".to_string()))
                .build(),
        ];
        let runs: Vec<_> = records.iter().collect();

        assert_eq!(
            ignored_cells(&runs),
            vec![(SearchMetric::TimeTaken, "-"), (SearchMetric::PathLength, "none")]
        );
        assert_eq!(mean_metrics("A", &runs).unwrap(), MetricMeans::Unavailable);
    }

    #[test]
    fn test_ignored_cells_skip_successful_runs() {
        let records = vec![RunRecord::builder("A", true)
            .cell(SearchMetric::TimeTaken, MetricValue::Invalid("-".to_string()))
            .build()];
        let runs: Vec<_> = records.iter().collect();

        assert!(ignored_cells(&runs).is_empty());
    }

    #[test]
    fn test_aggregate_empty_input() {
        let records: Vec<RunRecord<SearchMetric>> = Vec::new();
        let aggregation = aggregate(&records).unwrap();
        assert!(aggregation.is_empty());
        assert_eq!(aggregation.total_runs(), 0);
    }
}
