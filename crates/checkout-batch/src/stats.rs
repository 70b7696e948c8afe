//! # Run Statistics
//!
//! Summary figures for one batch run, built by an explicit fold over
//! order outcomes.
//!
//! ## Fold
//! ```text
//! RunStatistics::start(started_at)
//!        │
//!        │  record(&outcome)   ◄── once per order, single writer
//!        │  record(&outcome)
//!        │  ...
//!        ▼
//! finish(finished_at) ──► average, elapsed_ms
//! ```
//!
//! The fold never touches shared state: parallel runs collect outcomes
//! first and fold them afterwards in input order.

use std::collections::BTreeMap;

use checkout_core::{Money, OrderOutcome};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Statistics for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub run_id: Uuid,
    pub accepted: usize,
    pub rejected: usize,
    /// Rejection counts keyed by reason (`validation_failed`, ...).
    pub rejections_by_reason: BTreeMap<String, usize>,
    /// Sum of final prices of accepted orders.
    pub total_accepted_value: Money,
    /// `total_accepted_value / accepted`, zero when nothing was accepted.
    pub average_accepted_value: Money,
    /// Sum of discounts granted to accepted orders.
    pub total_discount: Money,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_ms: i64,
}

impl RunStatistics {
    /// Empty statistics with a fresh run id.
    pub fn start(started_at: DateTime<Utc>) -> Self {
        Self::with_run_id(Uuid::new_v4(), started_at)
    }

    /// Empty statistics with a caller-chosen run id.
    pub fn with_run_id(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        RunStatistics {
            run_id,
            accepted: 0,
            rejected: 0,
            rejections_by_reason: BTreeMap::new(),
            total_accepted_value: Money::zero(),
            average_accepted_value: Money::zero(),
            total_discount: Money::zero(),
            started_at,
            finished_at: None,
            elapsed_ms: 0,
        }
    }

    /// Folds one outcome into the running figures.
    pub fn record(&mut self, outcome: &OrderOutcome) {
        match outcome {
            OrderOutcome::Accepted { order_id, pricing, .. } => {
                self.accepted += 1;
                self.total_accepted_value =
                    accumulate(self.total_accepted_value, pricing.final_price, order_id);
                self.total_discount =
                    accumulate(self.total_discount, pricing.total_discount, order_id);
            }
            OrderOutcome::Rejected { reason, .. } => {
                self.rejected += 1;
                *self
                    .rejections_by_reason
                    .entry(reason.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }
    }

    /// Closes the run: stamps the end time and derives the average.
    pub fn finish(mut self, finished_at: DateTime<Utc>) -> Self {
        self.average_accepted_value = if self.accepted == 0 {
            Money::zero()
        } else {
            Money::new(self.total_accepted_value.amount() / Decimal::from(self.accepted))
        };
        self.elapsed_ms = (finished_at - self.started_at).num_milliseconds().max(0);
        self.finished_at = Some(finished_at);
        self
    }

    /// Folds a whole slice of outcomes.
    pub fn from_outcomes(
        outcomes: &[OrderOutcome],
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        outcomes
            .iter()
            .fold(Self::start(started_at), |mut stats, outcome| {
                stats.record(outcome);
                stats
            })
            .finish(finished_at)
    }

    /// Total number of orders seen.
    pub fn processed(&self) -> usize {
        self.accepted + self.rejected
    }
}

fn accumulate(total: Money, value: Money, order_id: &str) -> Money {
    total.checked_add(value).unwrap_or_else(|| {
        tracing::warn!(order_id, "Run total overflowed; order left out of the sum");
        total
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{CustomerTier, PricingBreakdown, RejectionReason};
    use chrono::Duration;

    fn accepted(id: &str, final_cents: i64, discount_cents: i64) -> OrderOutcome {
        OrderOutcome::Accepted {
            order_id: id.into(),
            customer_id: "c".into(),
            item_count: 1,
            total_quantity: 1,
            tier: CustomerTier::Standard,
            pricing: PricingBreakdown {
                final_price: Money::from_cents(final_cents),
                total_discount: Money::from_cents(discount_cents),
                ..Default::default()
            },
            warnings: Vec::new(),
        }
    }

    fn rejected(id: &str, reason: RejectionReason) -> OrderOutcome {
        OrderOutcome::Rejected {
            order_id: id.into(),
            reason,
            errors: Vec::new(),
            message: None,
        }
    }

    #[test]
    fn test_fold_counts_and_sums() {
        let start = Utc::now();
        let outcomes = vec![
            accepted("a", 1000, 100),
            rejected("b", RejectionReason::ValidationFailed),
            accepted("c", 2000, 0),
            rejected("d", RejectionReason::ValidationFailed),
            rejected("e", RejectionReason::BelowMinimum),
        ];

        let finish = start + Duration::milliseconds(42);
        let stats = RunStatistics::from_outcomes(&outcomes, start, finish);

        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected, 3);
        assert_eq!(stats.processed(), 5);
        assert_eq!(stats.rejections_by_reason["validation_failed"], 2);
        assert_eq!(stats.rejections_by_reason["below_minimum"], 1);
        assert_eq!(stats.total_accepted_value, Money::from_units(30));
        assert_eq!(stats.average_accepted_value, Money::from_units(15));
        assert_eq!(stats.total_discount, Money::from_units(1));
        assert_eq!(stats.elapsed_ms, 42);
        assert!(stats.finished_at.is_some());
    }

    #[test]
    fn test_empty_run() {
        let start = Utc::now();
        let stats = RunStatistics::from_outcomes(&[], start, start);
        assert_eq!(stats.processed(), 0);
        assert_eq!(stats.average_accepted_value, Money::zero());
        assert!(stats.rejections_by_reason.is_empty());
    }

    #[test]
    fn test_runs_get_distinct_ids() {
        let now = Utc::now();
        assert_ne!(RunStatistics::start(now).run_id, RunStatistics::start(now).run_id);
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = RunStatistics::start(Utc::now()).finish(Utc::now());
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("runId").is_some());
        assert!(json.get("rejectionsByReason").is_some());
        assert!(json.get("averageAcceptedValue").is_some());
    }
}
