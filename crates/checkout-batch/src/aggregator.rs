//! # Batch Aggregator
//!
//! Prices a list of raw order records and folds the outcomes into a
//! [`BatchReport`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Batch Aggregator                                 │
//! │                                                                         │
//! │  orders.json ──► Vec<serde_json::Value>                                 │
//! │                        │                                                │
//! │                        │ decode each record                             │
//! │                        │   not an object / bad shape ──► Rejected       │
//! │                        │                                (validation)    │
//! │                        ▼                                                │
//! │           ┌────────────────────────────┐                                │
//! │           │ SEQUENTIAL       PARALLEL  │                                │
//! │           │ for each order   JoinSet:  │                                │
//! │           │ price_order      one       │                                │
//! │           │                  blocking  │                                │
//! │           │                  task per  │                                │
//! │           │                  order     │                                │
//! │           └─────────────┬──────────────┘                                │
//! │                         │ outcomes, in input order                      │
//! │                         ▼                                               │
//! │           RunStatistics fold (single writer)                           │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                    BatchReport                                          │
//! │                                                                         │
//! │  A bad record never aborts the run: every input yields one outcome.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use checkout_core::{
    Order, OrderOutcome, OrderPipeline, PricingOptions, RejectionReason, ValidationError,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::{BatchConfig, ReportSettings};
use crate::error::{BatchError, BatchResult};
use crate::report::BatchReport;
use crate::stats::RunStatistics;

// =============================================================================
// Batch Aggregator
// =============================================================================

/// Runs a batch of orders through the pricing pipeline.
///
/// ## Usage
/// ```rust
/// use checkout_batch::BatchAggregator;
/// use checkout_core::PricingOptions;
/// use serde_json::json;
///
/// let aggregator = BatchAggregator::new(PricingOptions::default());
/// let report = aggregator.run(vec![
///     json!({"id": "1", "items": [{"id": "a", "price": 10, "quantity": 2}],
///            "customer": {"id": "c", "email": "c@example.com"}}),
///     json!("not an order"),
/// ]);
/// assert_eq!(report.accepted, 1);
/// assert_eq!(report.rejected, 1);
/// ```
#[derive(Debug, Clone)]
pub struct BatchAggregator {
    options: Arc<PricingOptions>,
    pipeline: Arc<OrderPipeline>,
    report: ReportSettings,
}

impl BatchAggregator {
    /// Aggregator with the standard discount stack and a full report.
    pub fn new(options: PricingOptions) -> Self {
        BatchAggregator {
            options: Arc::new(options),
            pipeline: Arc::new(OrderPipeline::new()),
            report: ReportSettings::default(),
        }
    }

    /// Aggregator set up from a loaded configuration.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.pricing.clone()).with_report_settings(config.report)
    }

    /// Overrides what the report includes.
    pub fn with_report_settings(mut self, settings: ReportSettings) -> Self {
        self.report = settings;
        self
    }

    /// Overrides the pipeline (e.g. a custom discount stack).
    pub fn with_pipeline(mut self, pipeline: OrderPipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    /// Options every order is priced with.
    pub fn options(&self) -> &PricingOptions {
        &self.options
    }

    /// Prices every record one after another.
    pub fn run(&self, orders: Vec<Value>) -> BatchReport {
        let started_at = Utc::now();
        info!(orders = orders.len(), "Starting sequential batch run");

        let outcomes: Vec<OrderOutcome> = orders
            .into_iter()
            .enumerate()
            .map(|(index, record)| evaluate(&self.pipeline, &self.options, index, record))
            .collect();

        self.finish(outcomes, started_at)
    }

    /// Prices every record on tokio's blocking pool.
    ///
    /// Outcomes keep input order; statistics are folded afterwards by
    /// this task alone.
    pub async fn run_parallel(&self, orders: Vec<Value>) -> BatchResult<BatchReport> {
        let started_at = Utc::now();
        let total = orders.len();
        info!(orders = total, "Starting parallel batch run");

        let mut tasks = JoinSet::new();
        for (index, record) in orders.into_iter().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            let options = Arc::clone(&self.options);
            tasks.spawn_blocking(move || (index, evaluate(&pipeline, &options, index, record)));
        }

        let mut slots: Vec<Option<OrderOutcome>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined?;
            slots[index] = Some(outcome);
        }

        let outcomes = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    BatchError::TaskFailed(format!("no outcome for record {}", index))
                })
            })
            .collect::<BatchResult<Vec<_>>>()?;

        Ok(self.finish(outcomes, started_at))
    }

    /// Sequential or parallel, whichever `parallel` asks for.
    pub async fn run_with(&self, orders: Vec<Value>, parallel: bool) -> BatchResult<BatchReport> {
        if parallel {
            self.run_parallel(orders).await
        } else {
            Ok(self.run(orders))
        }
    }

    fn finish(&self, outcomes: Vec<OrderOutcome>, started_at: DateTime<Utc>) -> BatchReport {
        let statistics = RunStatistics::from_outcomes(&outcomes, started_at, Utc::now());

        info!(
            run_id = %statistics.run_id,
            accepted = statistics.accepted,
            rejected = statistics.rejected,
            total_value = %statistics.total_accepted_value,
            elapsed_ms = statistics.elapsed_ms,
            "Batch run complete"
        );

        BatchReport::assemble(outcomes, statistics, self.report)
    }
}

// =============================================================================
// Record Decoding
// =============================================================================

/// Decodes one raw record and prices it.
fn evaluate(
    pipeline: &OrderPipeline,
    options: &PricingOptions,
    index: usize,
    record: Value,
) -> OrderOutcome {
    match decode(index, record) {
        Ok(order) => pipeline.run(&order, options),
        Err(rejected) => rejected,
    }
}

/// Turns a raw record into an [`Order`], or a validation rejection.
pub fn decode(index: usize, record: Value) -> Result<Order, OrderOutcome> {
    let order_id = record_id(index, &record);

    if !record.is_object() {
        let reason = format!("record {} is {}", index, kind_of(&record));
        return Err(not_a_record(order_id, reason));
    }

    serde_json::from_value::<Order>(record).map_err(|e| {
        debug!(order_id = %order_id, error = %e, "Record did not decode as an order");
        not_a_record(order_id, e.to_string())
    })
}

fn not_a_record(order_id: String, reason: String) -> OrderOutcome {
    OrderOutcome::Rejected {
        order_id,
        reason: RejectionReason::ValidationFailed,
        errors: vec![ValidationError::NotARecord { reason }.to_string()],
        message: None,
    }
}

/// The record's own `id` when it has a string one, else its position.
fn record_id(index: usize, record: &Value) -> String {
    record
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
