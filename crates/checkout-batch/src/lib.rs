//! # checkout-batch: Batch Pricing Runs
//!
//! Feeds many orders through [`checkout_core`] and reports on the run.
//!
//! ## Module Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        checkout-batch                                   │
//! │                                                                         │
//! │  config.rs ──► BatchConfig     defaults → batch.toml → CHECKOUT_* env  │
//! │  aggregator.rs ──► BatchAggregator   run / run_parallel                 │
//! │  stats.rs ──► RunStatistics     fold over outcomes                      │
//! │  report.rs ──► BatchReport      counts + details + statistics           │
//! │  error.rs ──► BatchError        config, input, task failures            │
//! │                                                                         │
//! │  bin/price-batch.rs             CLI: orders.json ──► JSON report        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing itself never fails at this level: every record yields an
//! [`OrderOutcome`](checkout_core::OrderOutcome). [`BatchError`] only covers
//! what happens around the run (config, input file, task join).

pub mod aggregator;
pub mod config;
pub mod error;
pub mod report;
pub mod stats;

pub use aggregator::BatchAggregator;
pub use config::{BatchConfig, ReportSettings, RunSettings};
pub use error::{BatchError, BatchResult};
pub use report::BatchReport;
pub use stats::RunStatistics;

use std::path::Path;

use serde_json::Value;

/// Reads a JSON file holding an array of order records.
///
/// A single object is accepted as a one-order batch.
pub fn load_orders(path: &Path) -> BatchResult<Vec<Value>> {
    let contents = std::fs::read_to_string(path)?;
    parse_orders(&contents)
}

/// Parses a JSON document holding an array of order records.
pub fn parse_orders(json: &str) -> BatchResult<Vec<Value>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(records) => Ok(records),
        record @ Value::Object(_) => Ok(vec![record]),
        other => Err(BatchError::InvalidInput(format!(
            "expected an array of orders, got {}",
            other
        ))),
    }
}
