//! Batch runs driven from files on disk.

use std::io::Write;

use checkout_batch::{load_orders, BatchAggregator, BatchConfig, ReportSettings};
use checkout_core::{Money, OrderOutcome, RejectionReason};
use rust_decimal::Decimal;

const ORDERS: &str = r#"[
    {
        "id": "123",
        "items": [{"id": "item1", "price": 10, "quantity": 2}],
        "customer": {"id": "cust1", "email": "test@example.com",
                     "purchaseHistory": {"totalSpent": 1200}}
    },
    {
        "id": "124",
        "items": [{"id": "item1", "price": 10, "quantity": 1}],
        "customer": {"id": "cust1", "email": "not-an-email"}
    },
    {
        "id": "125",
        "items": [{"id": "item1", "price": 1, "quantity": 1}],
        "customer": {"id": "cust1", "email": "test@example.com"}
    },
    "garbage",
    {
        "id": "126",
        "items": [],
        "customer": {"id": "cust1", "email": "test@example.com"}
    }
]"#;

const CONFIG: &str = r#"
[pricing]
taxRate = 0.1
promotionalCode = "SAVE10"
currentMonth = 6
requireMinimumValue = true

[report]
include_details = true
include_statistics = true
"#;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn reasons(outcomes: &[OrderOutcome]) -> Vec<Option<RejectionReason>> {
    outcomes.iter().map(OrderOutcome::reason).collect()
}

#[tokio::test]
async fn file_batch_produces_expected_outcomes() {
    let orders_file = write_temp(ORDERS);
    let config_file = write_temp(CONFIG);

    let config = BatchConfig::from_file(config_file.path()).unwrap();
    config.validate().unwrap();
    let orders = load_orders(orders_file.path()).unwrap();
    assert_eq!(orders.len(), 5);

    let report = BatchAggregator::from_config(&config)
        .run_with(orders, true)
        .await
        .unwrap();

    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 4);
    assert_eq!(
        reasons(report.outcomes()),
        vec![
            None,
            Some(RejectionReason::ValidationFailed),
            Some(RejectionReason::BelowMinimum),
            Some(RejectionReason::ValidationFailed),
            Some(RejectionReason::ValidationFailed),
        ]
    );

    let stats = report.statistics.as_ref().unwrap();
    assert_eq!(stats.total_accepted_value, Money::new(Decimal::new(19845, 3)));
    assert_eq!(stats.rejections_by_reason["validation_failed"], 3);
    assert_eq!(stats.rejections_by_reason["below_minimum"], 1);
}

#[tokio::test]
async fn counts_only_report_serializes_compactly() {
    let mut config = BatchConfig::default();
    config.report = ReportSettings {
        include_details: false,
        include_statistics: false,
    };

    let orders = checkout_batch::parse_orders(ORDERS).unwrap();
    let report = BatchAggregator::from_config(&config)
        .run_with(orders, false)
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    // Minimum is off by default, so order 125 is accepted here.
    assert_eq!(json, serde_json::json!({"accepted": 2, "rejected": 3}));
}

#[test]
fn accepted_detail_serializes_with_status_tag() {
    let orders = checkout_batch::parse_orders(ORDERS).unwrap();
    let report = BatchAggregator::new(Default::default()).run(orders);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["details"][0]["status"], "accepted");
    assert_eq!(json["details"][0]["orderId"], "123");
    assert_eq!(json["details"][3]["status"], "rejected");
    assert_eq!(json["details"][3]["orderId"], "#3");
    assert_eq!(json["details"][3]["reason"], "validation_failed");
}
