//! One report invocation: load → aggregate → render
//!
//! Each stage completes before the next starts. A load error stops the run
//! before aggregation; an aggregation error stops it before anything is
//! rendered. [`prepare`] and [`render`] expose the two halves so a caller can
//! keep the aggregation when rendering fails.

use std::io::Write;

use tracing::{info, warn};

use crate::aggregate::{aggregate, Aggregation};
use crate::config::ReportConfig;
use crate::domain::Domain;
use crate::experiment::RecordStore;
use crate::report::{render_chart, write_summary, ComparisonChart};
use crate::Result;

/// Run the full pipeline for domain `D`, writing the text summary to `out`.
///
/// The aggregation is dropped if rendering fails; use [`prepare`] followed by
/// [`render`] to keep it for a retry.
///
/// # Errors
///
/// Returns the first error of the failing stage: [`Error::DataSource`],
/// [`Error::Aggregation`], or [`Error::Render`].
///
/// [`Error::DataSource`]: crate::Error::DataSource
/// [`Error::Aggregation`]: crate::Error::Aggregation
/// [`Error::Render`]: crate::Error::Render
pub fn run<D: Domain, W: Write>(
    config: &ReportConfig,
    out: &mut W,
) -> Result<Aggregation<D::Metric>> {
    let aggregation = prepare::<D>(config)?;
    render::<D, W>(&aggregation, config, out)?;
    Ok(aggregation)
}

/// Load the configured input and aggregate it.
///
/// # Errors
///
/// Returns [`Error::DataSource`](crate::Error::DataSource) if the input
/// cannot be loaded, or [`Error::Aggregation`](crate::Error::Aggregation) if
/// a successful run carries a non-numeric metric.
pub fn prepare<D: Domain>(config: &ReportConfig) -> Result<Aggregation<D::Metric>> {
    info!(domain = D::NAME, input = %config.input_path().display(), "loading runs");
    let store = RecordStore::load::<D>(config.input_path())?;

    aggregate(store.records())
}

/// Render both artifacts from an existing aggregation.
///
/// The chart is drawn first. The text summary is written even when the chart
/// fails, and the chart error is the one returned.
///
/// # Errors
///
/// Returns [`Error::Render`](crate::Error::Render) if the chart or the
/// summary cannot be written.
pub fn render<D: Domain, W: Write>(
    aggregation: &Aggregation<D::Metric>,
    config: &ReportConfig,
    out: &mut W,
) -> Result<()> {
    let chart = ComparisonChart::from_aggregation::<D>(aggregation);
    let charted = render_chart(&chart, config);
    if let Err(e) = &charted {
        warn!(error = %e, "chart not written, continuing with the text summary");
    }

    let summarized = write_summary::<D, W>(aggregation, out);
    charted.and(summarized)
}
