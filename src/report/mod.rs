//! Report rendering
//!
//! Two artifacts come out of one [`Aggregation`](crate::aggregate::Aggregation):
//! a 2×2 PNG chart and a text summary. Rendering never touches the summaries,
//! so a failed chart can be retried without aggregating again.

mod chart;
mod text;

pub use chart::{render_chart, Bar, ComparisonChart, Panel};
pub use text::{summary_string, write_summary, SummaryReport};
