//! Heuristic comparison report for the pathfinding search.
//!
//! Reads `performance_data.csv`, writes `performance_comparison.png`, and
//! prints the summary to stdout. Set `RUST_LOG` to change log verbosity.

use anyhow::{Context, Result};
use runstat::config::ReportConfig;
use runstat::domain::SearchDomain;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ReportConfig::for_domain::<SearchDomain>();
    let aggregation = runstat::pipeline::prepare::<SearchDomain>(&config)
        .with_context(|| format!("failed to summarize {}", config.input_path().display()))?;
    runstat::pipeline::render::<SearchDomain, _>(
        &aggregation,
        &config,
        &mut std::io::stdout().lock(),
    )
    .context("failed to render report")?;

    println!("\nChart saved to {}", config.output_path().display());
    Ok(())
}
