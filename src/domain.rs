//! Experiment domains
//!
//! A [`Domain`] fixes everything that differs between the two experiment
//! logs: column names, the metric set, report headings and default file
//! names. The pipeline itself is written once, generic over the domain.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// A named numeric measurement recorded for every run.
///
/// Implemented by one enum per domain so that metric names are checked at
/// compile time instead of looked up by string.
pub trait MetricKind:
    Copy + Ord + Hash + Debug + Serialize + for<'de> Deserialize<'de> + 'static
{
    /// All metrics of the domain, in panel order.
    const ALL: [Self; 3];

    /// Column header in the input table.
    fn column(self) -> &'static str;

    /// Chart panel title.
    fn panel_title(self) -> &'static str;

    /// Chart panel y-axis label.
    fn axis_label(self) -> &'static str;

    /// Label used in the text summary.
    fn summary_label(self) -> &'static str;

    /// Decimal places used in the text summary.
    fn summary_precision(self) -> usize {
        2
    }

    /// Unit suffix used in the text summary.
    fn summary_unit(self) -> &'static str {
        ""
    }
}

/// Schema and presentation of one experiment domain.
pub trait Domain: 'static {
    /// Metric enum for this domain.
    type Metric: MetricKind;

    /// Short name used in logs.
    const NAME: &'static str;

    /// Column holding the variant label.
    const VARIANT_COLUMN: &'static str;

    /// Column holding the outcome token.
    const OUTCOME_COLUMN: &'static str;

    /// Outcome token that marks a successful run. Compared by exact equality.
    const SUCCESS_TOKEN: &'static str = "Yes";

    /// First line of the text summary.
    const SUMMARY_TITLE: &'static str;

    /// Default input table.
    const DEFAULT_INPUT: &'static str = "performance_data.csv";

    /// Default chart destination.
    const DEFAULT_OUTPUT: &'static str;

    /// Per-variant heading in the text summary.
    fn variant_heading(variant: &str) -> String;
}

/// Pathfinding search comparing heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDomain;

/// Metrics logged by the pathfinding search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SearchMetric {
    /// Wall-clock seconds spent searching.
    TimeTaken,
    /// Number of cells on the found path.
    PathLength,
    /// Number of nodes popped from the open list.
    NodesExpanded,
}

impl MetricKind for SearchMetric {
    const ALL: [Self; 3] = [Self::TimeTaken, Self::PathLength, Self::NodesExpanded];

    fn column(self) -> &'static str {
        match self {
            Self::TimeTaken => "TimeTaken",
            Self::PathLength => "PathLength",
            Self::NodesExpanded => "NodesExpanded",
        }
    }

    fn panel_title(self) -> &'static str {
        match self {
            Self::TimeTaken => "Average Time Taken (seconds)",
            Self::PathLength => "Average Path Length",
            Self::NodesExpanded => "Average Nodes Expanded",
        }
    }

    fn axis_label(self) -> &'static str {
        match self {
            Self::TimeTaken => "Time (s)",
            Self::PathLength => "Path Length",
            Self::NodesExpanded => "Nodes Expanded",
        }
    }

    fn summary_label(self) -> &'static str {
        match self {
            Self::TimeTaken => "Avg Time",
            Self::PathLength => "Avg Path Length",
            Self::NodesExpanded => "Avg Nodes Expanded",
        }
    }

    fn summary_precision(self) -> usize {
        match self {
            Self::TimeTaken => 6,
            Self::PathLength | Self::NodesExpanded => 2,
        }
    }

    fn summary_unit(self) -> &'static str {
        match self {
            Self::TimeTaken => "s",
            Self::PathLength | Self::NodesExpanded => "",
        }
    }
}

impl Domain for SearchDomain {
    type Metric = SearchMetric;

    const NAME: &'static str = "search";
    const VARIANT_COLUMN: &'static str = "Heuristic";
    const OUTCOME_COLUMN: &'static str = "PathFound";
    const SUMMARY_TITLE: &'static str = "Performance Summary:";
    const DEFAULT_OUTPUT: &'static str = "performance_comparison.png";

    fn variant_heading(variant: &str) -> String {
        format!("{variant} Heuristic:")
    }
}

/// Timetabling CSP comparing solving strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingDomain;

/// Metrics logged by the CSP solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScheduleMetric {
    /// Wall-clock seconds spent solving.
    TimeTaken,
    /// Number of times the solver undid an assignment.
    BacktrackCount,
    /// Number of variable assignments attempted.
    Assignments,
}

impl MetricKind for ScheduleMetric {
    const ALL: [Self; 3] = [Self::TimeTaken, Self::BacktrackCount, Self::Assignments];

    fn column(self) -> &'static str {
        match self {
            Self::TimeTaken => "TimeTaken",
            Self::BacktrackCount => "BacktrackCount",
            Self::Assignments => "Assignments",
        }
    }

    fn panel_title(self) -> &'static str {
        match self {
            Self::TimeTaken => "Average Time Taken (seconds)",
            Self::BacktrackCount => "Average Backtrack Count",
            Self::Assignments => "Average Assignment Count",
        }
    }

    fn axis_label(self) -> &'static str {
        match self {
            Self::TimeTaken => "Time (s)",
            Self::BacktrackCount => "Backtracks",
            Self::Assignments => "Assignments",
        }
    }

    fn summary_label(self) -> &'static str {
        match self {
            Self::TimeTaken => "Avg Time",
            Self::BacktrackCount => "Avg Backtracks",
            Self::Assignments => "Avg Assignments",
        }
    }

    fn summary_precision(self) -> usize {
        match self {
            Self::TimeTaken => 6,
            Self::BacktrackCount | Self::Assignments => 2,
        }
    }

    fn summary_unit(self) -> &'static str {
        match self {
            Self::TimeTaken => "s",
            Self::BacktrackCount | Self::Assignments => "",
        }
    }
}

impl Domain for SchedulingDomain {
    type Metric = ScheduleMetric;

    const NAME: &'static str = "scheduling";
    const VARIANT_COLUMN: &'static str = "Method";
    const OUTCOME_COLUMN: &'static str = "SolutionFound";
    const SUMMARY_TITLE: &'static str = "CSP Performance Summary:";
    const DEFAULT_OUTPUT: &'static str = "csp_performance_comparison.png";

    fn variant_heading(variant: &str) -> String {
        format!("{variant}:")
    }
}

/// Every column a domain's input table must carry.
#[must_use]
pub fn required_columns<D: Domain>() -> Vec<&'static str> {
    let mut columns = vec![D::VARIANT_COLUMN, D::OUTCOME_COLUMN];
    columns.extend(D::Metric::ALL.iter().map(|m| m.column()));
    columns
}
