//! # runstat: comparative reports for algorithm experiment runs
//!
//! runstat reads the per-run logs written by two experiment drivers (a grid
//! pathfinding search comparing heuristics, and a timetabling CSP comparing
//! solving strategies), groups runs by variant, and renders a 2×2 bar chart
//! plus a console summary.
//!
//! ## Design Principles
//!
//! - **Two denominators**: success rate counts every run; metric means count
//!   successful runs only
//! - **Unavailable is not zero**: a variant with no successful run has no
//!   means at all
//! - **Typed schemas**: each domain is a [`domain::Domain`] with a metric
//!   enum, validated against the table header at load time
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use runstat::config::ReportConfig;
//! use runstat::domain::SearchDomain;
//!
//! let config = ReportConfig::for_domain::<SearchDomain>();
//! let aggregation = runstat::pipeline::run::<SearchDomain, _>(&config, &mut std::io::stdout())?;
//!
//! for summary in aggregation.iter() {
//!     println!("{}: {:.0}%", summary.variant(), summary.success_rate() * 100.0);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod pipeline;
pub mod report;
pub mod storage;

pub use error::{Error, Result};
