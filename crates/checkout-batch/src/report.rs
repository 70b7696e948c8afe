//! # Batch Report
//!
//! The JSON document a batch run produces.
//!
//! ```json
//! {
//!   "accepted": 2,
//!   "rejected": 1,
//!   "details": [ { "status": "accepted", "orderId": "123", ... }, ... ],
//!   "statistics": { "runId": "...", "totalAcceptedValue": 44.1, ... }
//! }
//! ```
//!
//! `details` and `statistics` are omitted when switched off in
//! [`ReportSettings`].

use checkout_core::OrderOutcome;
use serde::{Deserialize, Serialize};

use crate::config::ReportSettings;
use crate::stats::RunStatistics;

/// Result of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub accepted: usize,
    pub rejected: usize,
    /// Every outcome, in input order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<OrderOutcome>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<RunStatistics>,
}

impl BatchReport {
    /// Shapes outcomes and statistics per `settings`.
    pub fn assemble(
        outcomes: Vec<OrderOutcome>,
        statistics: RunStatistics,
        settings: ReportSettings,
    ) -> Self {
        BatchReport {
            accepted: statistics.accepted,
            rejected: statistics.rejected,
            details: settings.include_details.then_some(outcomes),
            statistics: settings.include_statistics.then_some(statistics),
        }
    }

    /// Number of orders in the run.
    pub fn total(&self) -> usize {
        self.accepted + self.rejected
    }

    /// Outcomes, or an empty slice when details were switched off.
    pub fn outcomes(&self) -> &[OrderOutcome] {
        self.details.as_deref().unwrap_or(&[])
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
