//! Run records and the record store
//!
//! ## Schema Overview
//!
//! ```text
//! RecordStore (1) ──< RunRecord (N)
//!                        │
//!                        ├── variant  (group key)
//!                        ├── outcome  ("Yes" token → true)
//!                        └──< MetricValue (one per domain metric)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use runstat::domain::SearchMetric;
//! use runstat::experiment::{RecordStore, RunRecord};
//!
//! let store = RecordStore::new(vec![
//!     RunRecord::builder("Manhattan", true)
//!         .metric(SearchMetric::TimeTaken, 0.002)
//!         .build(),
//!     RunRecord::new("Manhattan", false),
//! ]);
//!
//! assert_eq!(store.variants(), vec!["Manhattan"]);
//! ```

mod run_record;
mod store;

pub use run_record::{MetricValue, RunRecord, RunRecordBuilder};
pub use store::RecordStore;
