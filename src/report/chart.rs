//! Multi-panel bar chart
//!
//! The chart is built in two steps. [`ComparisonChart::from_aggregation`]
//! decides which bars exist; [`render_chart`] rasterises them with the
//! `plotters` bitmap backend.

use std::fs::{self, OpenOptions};
use std::path::Path;

use plotters::prelude::*;
use tracing::{debug, info};

use crate::aggregate::Aggregation;
use crate::config::ReportConfig;
use crate::domain::{Domain, MetricKind};
use crate::{Error, Result};

/// Title and axis label of the success-rate panel
const SUCCESS_RATE_TITLE: &str = "Success Rate (%)";

/// One bar: variant label and height
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Variant label shown under the bar
    pub label: String,
    /// Bar height
    pub value: f64,
}

/// One independent bar chart of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Panel caption
    pub title: String,
    /// X-axis description (the variant column)
    pub x_label: String,
    /// Y-axis description
    pub y_label: String,
    /// Bars in first-appearance order
    pub bars: Vec<Bar>,
}

impl Panel {
    /// Upper bound of the y axis with 10% headroom
    #[must_use]
    pub fn y_max(&self) -> f64 {
        let max = self.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }
}

/// Fixed 2×2 grid: three metric means, then success rate
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonChart {
    panels: [Panel; 4],
}

impl ComparisonChart {
    /// Build the panels for domain `D`.
    ///
    /// Metric panels only get a bar for variants with an available mean.
    /// The success-rate panel always has one bar per variant.
    #[must_use]
    pub fn from_aggregation<D: Domain>(aggregation: &Aggregation<D::Metric>) -> Self {
        let metric_panel = |metric: D::Metric| Panel {
            title: metric.panel_title().to_string(),
            x_label: D::VARIANT_COLUMN.to_string(),
            y_label: metric.axis_label().to_string(),
            bars: aggregation
                .iter()
                .filter_map(|s| {
                    s.means().get(metric).map(|value| Bar {
                        label: s.variant().to_string(),
                        value,
                    })
                })
                .collect(),
        };

        let [first, second, third] = D::Metric::ALL;
        let success = Panel {
            title: SUCCESS_RATE_TITLE.to_string(),
            x_label: D::VARIANT_COLUMN.to_string(),
            y_label: SUCCESS_RATE_TITLE.to_string(),
            bars: aggregation
                .iter()
                .map(|s| Bar {
                    label: s.variant().to_string(),
                    value: s.success_rate() * 100.0,
                })
                .collect(),
        };

        Self {
            panels: [
                metric_panel(first),
                metric_panel(second),
                metric_panel(third),
                success,
            ],
        }
    }

    /// Panels in row-major order
    #[must_use]
    pub const fn panels(&self) -> &[Panel; 4] {
        &self.panels
    }
}

/// Write the chart as a PNG to the configured output path.
///
/// # Errors
///
/// Returns [`Error::Render`] if the destination cannot be created or the
/// drawing backend fails.
pub fn render_chart(chart: &ComparisonChart, config: &ReportConfig) -> Result<()> {
    let path = config.output_path();

    ensure_writable(path)
        .map_err(|e| Error::render(path, format!("output is not writable: {e}")))?;

    draw(chart, config).map_err(|e| Error::render(path, e.to_string()))?;

    info!(path = %path.display(), "chart saved");
    Ok(())
}

/// Check the destination can be written without touching an existing chart.
fn ensure_writable(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        // Opening for write without truncation leaves the old contents intact
        OpenOptions::new().write(true).truncate(false).open(path)?;
        return Ok(());
    }

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let metadata = fs::metadata(parent)?;
    if !metadata.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", parent.display()),
        ));
    }
    if metadata.permissions().readonly() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("{} is read-only", parent.display()),
        ));
    }
    Ok(())
}

fn draw(
    chart: &ComparisonChart,
    config: &ReportConfig,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(config.output_path(), config.size()).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 2));
    for (area, panel) in areas.iter().zip(chart.panels()) {
        draw_panel(area, panel)?;
    }

    root.present()?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    panel: &Panel,
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    debug!(panel = %panel.title, bars = panel.bars.len(), "drawing panel");
    if panel.bars.is_empty() {
        area.titled(&panel.title, ("sans-serif", 22))?;
        return Ok(());
    }

    let labels: Vec<&str> = panel.bars.iter().map(|b| b.label.as_str()).collect();
    let count = panel.bars.len() as u32;

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..count).into_segmented(), 0.0f64..panel.y_max())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .x_labels(labels.len())
        .x_label_formatter(&|v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                labels.get(*i as usize).map_or_else(String::new, |l| (*l).to_string())
            }
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    chart.draw_series(panel.bars.iter().enumerate().map(|(i, bar)| {
        let x = i as u32;
        let color = Palette99::pick(i).mix(0.8);
        let mut rect = Rectangle::new(
            [
                (SegmentValue::Exact(x), 0.0),
                (SegmentValue::Exact(x + 1), bar.value),
            ],
            color.filled(),
        );
        rect.set_margin(0, 0, 12, 12);
        rect
    }))?;

    Ok(())
}
