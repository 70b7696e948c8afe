//! # Validation Module
//!
//! Structural and semantic validation of orders.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      validate_order(order)                              │
//! │                                                                         │
//! │  order.id non-empty ──────────────┐                                     │
//! │  items non-empty ─────────────────┤                                     │
//! │  each item: id, price>0, qty>0 ───┼──► errors[]   (ALL rules run,       │
//! │  customer.id non-empty ───────────┤                no short-circuit)    │
//! │  customer.email pattern ──────────┘                                     │
//! │                                                                         │
//! │  createdAt parses? ───────────────────► warnings[] (never blocks)       │
//! │                                                                         │
//! │  valid = errors.is_empty()                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use checkout_core::types::Order;
//! use checkout_core::validation::{validate_order, validate_quantity};
//!
//! let report = validate_order(&Order::default());
//! assert!(!report.valid);
//! assert!(report.errors.len() >= 2); // missing id AND no items
//!
//! assert!(validate_quantity(5).is_ok());
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, Item, Order, Rate};
use crate::MAX_PROMO_CODE_LENGTH;

/// Result type for single-field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex pattern")
});

// =============================================================================
// Validation Report
// =============================================================================

/// Outcome of validating a whole order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ValidationReport {
    pub valid: bool,
    #[ts(type = "Array<string>")]
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<ValidationError>,
    /// Non-blocking findings (e.g. unparseable timestamp).
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_findings(errors: Vec<ValidationError>, warnings: Vec<String>) -> Self {
        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Errors rendered as messages.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

fn serialize_errors<S>(errors: &[ValidationError], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

// =============================================================================
// Order Validation
// =============================================================================

/// Validates an order, collecting every error rather than stopping at the
/// first one.
///
/// ## Example
/// ```rust
/// use checkout_core::money::Money;
/// use checkout_core::types::{Customer, Item, Order};
/// use checkout_core::validation::validate_order;
///
/// let order = Order {
///     id: "o-1".into(),
///     items: vec![
///         Item { id: "a".into(), price: Money::zero(), quantity: 1 },
///         Item { id: "b".into(), price: Money::from_units(1), quantity: 0 },
///     ],
///     customer: Some(Customer { id: "c".into(), email: "c@x.io".into(), ..Default::default() }),
///     created_at: None,
/// };
/// let report = validate_order(&order);
/// assert_eq!(report.errors.len(), 2);
/// ```
pub fn validate_order(order: &Order) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = validate_identifier(&order.id, "order.id") {
        errors.push(e);
    }

    if order.items.is_empty() {
        errors.push(ValidationError::NoItems);
    }
    for (index, item) in order.items.iter().enumerate() {
        errors.extend(validate_item(index, item));
    }

    match order.customer {
        Some(ref customer) => errors.extend(validate_customer(customer)),
        None => errors.push(ValidationError::Required {
            field: "customer".to_string(),
        }),
    }

    if let Some(ref raw) = order.created_at {
        if parse_timestamp(raw).is_none() {
            tracing::warn!(order_id = %order.id, created_at = %raw, "Unparseable order timestamp");
            warnings.push(format!("createdAt '{}' is not a valid timestamp", raw));
        }
    }

    ValidationReport::from_findings(errors, warnings)
}

/// At most one error per item: every failed rule, joined with `; `.
fn validate_item(index: usize, item: &Item) -> Option<ValidationError> {
    let problems: Vec<String> = [
        validate_identifier(&item.id, "id"),
        validate_price(item.price),
        validate_quantity(item.quantity),
    ]
    .into_iter()
    .filter_map(Result::err)
    .map(|e| e.to_string())
    .collect();

    if problems.is_empty() {
        return None;
    }

    Some(ValidationError::Item {
        index,
        problem: problems.join("; "),
    })
}

fn validate_customer(customer: &Customer) -> Vec<ValidationError> {
    [
        validate_identifier(&customer.id, "customer.id"),
        validate_email(&customer.email),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]`, or a bare date.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that an identifier is present.
pub fn validate_identifier(id: &str, field: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an email against `local@domain.tld`.
///
/// ## Example
/// ```rust
/// use checkout_core::validation::validate_email;
///
/// assert!(validate_email("test@example.com").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// assert!(validate_email("a b@example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "customer.email".to_string(),
        });
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidFormat {
            field: "customer.email".to_string(),
            reason: "must look like local@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price. Free items are not allowed.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity value.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate fraction.
///
/// ## Rules
/// - Must be between 0 and 1 (0% to 100%)
pub fn validate_tax_rate(rate: Rate) -> ValidationResult<()> {
    if rate.fraction() < Decimal::ZERO || rate.fraction() > Decimal::ONE {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: "0".to_string(),
            max: "1".to_string(),
        });
    }

    Ok(())
}

/// Validates a promotional code as typed by a shopper.
///
/// Unknown codes are fine here; they simply earn no discount.
pub fn validate_promotional_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.len() > MAX_PROMO_CODE_LENGTH {
        return Err(ValidationError::OutOfRange {
            field: "promotionalCode length".to_string(),
            min: "0".to_string(),
            max: MAX_PROMO_CODE_LENGTH.to_string(),
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "promotionalCode".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_order() -> Order {
        Order {
            id: "123".to_string(),
            items: vec![Item {
                id: "item1".to_string(),
                price: Money::from_units(10),
                quantity: 2,
            }],
            customer: Some(Customer {
                id: "cust1".to_string(),
                email: "test@example.com".to_string(),
                ..Default::default()
            }),
            created_at: None,
        }
    }

    #[test]
    fn test_valid_order() {
        let report = validate_order(&valid_order());
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_items() {
        let mut order = valid_order();
        order.items.clear();

        let report = validate_order(&order);
        assert!(!report.valid);
        assert!(report
            .error_messages()
            .iter()
            .any(|e| e.contains("at least one item")));
    }

    #[test]
    fn test_each_bad_item_reported_separately() {
        let mut order = valid_order();
        order.items = vec![
            Item { id: "a".into(), price: Money::from_units(-1), quantity: 1 },
            Item { id: "b".into(), price: Money::from_units(3), quantity: 1 },
            Item { id: "c".into(), price: Money::from_units(3), quantity: 0 },
        ];

        let report = validate_order(&order);
        assert_eq!(
            report.errors,
            vec![
                ValidationError::Item { index: 0, problem: "price must be positive".into() },
                ValidationError::Item { index: 2, problem: "quantity must be positive".into() },
            ]
        );
    }

    #[test]
    fn test_item_with_several_problems() {
        let mut order = valid_order();
        order.items = vec![Item::default()];

        let report = validate_order(&order);
        assert_eq!(
            report.error_messages(),
            vec!["Item 0: id is required; price must be positive; quantity must be positive"]
        );
    }

    #[test]
    fn test_all_rules_evaluated_without_short_circuit() {
        let order = Order {
            id: " ".into(),
            items: vec![],
            customer: Some(Customer {
                id: String::new(),
                email: "nope".into(),
                ..Default::default()
            }),
            created_at: None,
        };

        let report = validate_order(&order);
        // order.id, no items, customer.id, customer.email
        assert_eq!(report.errors.len(), 4);
    }

    #[test]
    fn test_missing_customer() {
        let mut order = valid_order();
        order.customer = None;

        let report = validate_order(&order);
        assert_eq!(
            report.errors,
            vec![ValidationError::Required { field: "customer".into() }]
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@sub.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("space @example.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_invalid_timestamp_is_only_a_warning() {
        let mut order = valid_order();
        order.created_at = Some("yesterday-ish".into());

        let report = validate_order(&order);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2024-12-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-12-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-12-01T10:00:00.123").is_some());
        assert!(parse_timestamp("2024-12-01").is_some());
        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn test_validate_quantity_and_price() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());

        assert!(validate_price(Money::from_cents(1)).is_ok());
        assert!(validate_price(Money::zero()).is_err());
    }

    #[test]
    fn test_validate_tax_rate() {
        assert!(validate_tax_rate(Rate::zero()).is_ok());
        assert!(validate_tax_rate(Rate::from_bps(825)).is_ok());
        assert!(validate_tax_rate(Rate::from_percentage(100)).is_ok());
        assert!(validate_tax_rate(Rate::from_percentage(101)).is_err());
    }

    #[test]
    fn test_validate_promotional_code() {
        assert!(validate_promotional_code("SAVE10").is_ok());
        assert!(validate_promotional_code("FAKE").is_ok());
        assert!(validate_promotional_code("has space").is_err());
        assert!(validate_promotional_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_report_serializes_messages() {
        let mut order = valid_order();
        order.items.clear();
        let json = serde_json::to_value(validate_order(&order)).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0], "Order must contain at least one item");
    }
}
