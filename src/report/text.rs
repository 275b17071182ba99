//! Console summary
//!
//! Fixed layout per variant: success rate always, metric means only when the
//! variant has at least one successful run.

use std::fmt;
use std::io::Write;
use std::marker::PhantomData;

use crate::aggregate::{Aggregation, MetricMeans, VariantSummary};
use crate::domain::{Domain, MetricKind};
use crate::{Error, Result};

/// Width of the rule under the summary title
const RULE_WIDTH: usize = 50;

/// Write the text summary for domain `D`.
///
/// # Errors
///
/// Returns [`Error::Render`] if writing to `out` fails.
pub fn write_summary<D: Domain, W: Write>(
    aggregation: &Aggregation<D::Metric>,
    out: &mut W,
) -> Result<()> {
    write!(out, "{}", SummaryReport::<D>::new(aggregation))
        .and_then(|()| out.flush())
        .map_err(|e| Error::render("<summary output>", format!("failed to write summary: {e}")))
}

/// Render the text summary into a string.
#[must_use]
pub fn summary_string<D: Domain>(aggregation: &Aggregation<D::Metric>) -> String {
    SummaryReport::<D>::new(aggregation).to_string()
}

/// Text summary of an aggregation, formatted for domain `D`.
pub struct SummaryReport<'a, D: Domain> {
    aggregation: &'a Aggregation<D::Metric>,
    domain: PhantomData<D>,
}

impl<'a, D: Domain> SummaryReport<'a, D> {
    /// Wrap an aggregation for display.
    #[must_use]
    pub const fn new(aggregation: &'a Aggregation<D::Metric>) -> Self {
        Self {
            aggregation,
            domain: PhantomData,
        }
    }
}

impl<D: Domain> fmt::Display for SummaryReport<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", D::SUMMARY_TITLE)?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        for summary in self.aggregation.iter() {
            write_variant::<D>(summary, f)?;
        }
        Ok(())
    }
}

fn write_variant<D: Domain>(
    summary: &VariantSummary<D::Metric>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", D::variant_heading(summary.variant()))?;
    writeln!(f, "  Success Rate: {:.2}%", summary.success_rate() * 100.0)?;

    if let MetricMeans::Available(_) = summary.means() {
        for metric in D::Metric::ALL {
            let label = metric.summary_label();
            match summary.means().get(metric) {
                Some(mean) => writeln!(
                    f,
                    "  {label}: {mean:.prec$}{unit}",
                    prec = metric.summary_precision(),
                    unit = metric.summary_unit()
                )?,
                None => writeln!(f, "  {label}: n/a")?,
            }
        }
    }
    Ok(())
}
