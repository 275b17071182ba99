//! Report configuration
//!
//! One value per invocation, passed explicitly to the renderer. Defaults come
//! from the [`Domain`](crate::domain::Domain), never from process-wide state.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default chart size in pixels (15×12 inch figure at 100 px/in)
pub const DEFAULT_CHART_SIZE: (u32, u32) = (1500, 1200);

/// Where to read runs from and where to write the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    input: PathBuf,
    output: PathBuf,
    chart_size: (u32, u32),
}

impl ReportConfig {
    /// Default configuration for a domain.
    #[must_use]
    pub fn for_domain<D: Domain>() -> Self {
        Self {
            input: PathBuf::from(D::DEFAULT_INPUT),
            output: PathBuf::from(D::DEFAULT_OUTPUT),
            chart_size: DEFAULT_CHART_SIZE,
        }
    }

    /// Set the input table path
    #[must_use]
    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    /// Set the chart destination
    #[must_use]
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the chart size in pixels
    #[must_use]
    pub const fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = (width, height);
        self
    }

    /// Input table path
    #[must_use]
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    /// Chart destination
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Chart size in pixels
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        self.chart_size
    }
}
