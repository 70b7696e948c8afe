//! # Domain Types
//!
//! Core domain types used throughout the pricing pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (caller-owned, never mutated)                                    │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │      Item       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  items[]        │──►│  price          │   │  email          │       │
//! │  │  customer       │   │  quantity       │   │  purchaseHistory│       │
//! │  │  createdAt?     │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  OUTPUT (value objects, built once per order)                           │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  OrderOutcome   │   │PricingBreakdown │   │ DiscountEntry   │       │
//! │  │  Accepted       │──►│  subtotal, tax  │──►│  kind, amount   │       │
//! │  │  Rejected       │   │  fee, discounts │   │  percentage     │       │
//! │  └─────────────────┘   │  finalPrice     │   │  code?          │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All boundary types use camelCase on the wire.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation;
use crate::{
    DEFAULT_LARGE_ORDER_THRESHOLD, DEFAULT_MINIMUM_ORDER_VALUE, DEFAULT_TAX_RATE_BPS,
    GOLD_TIER_THRESHOLD, PREMIUM_TIER_THRESHOLD,
};

// =============================================================================
// Rate
// =============================================================================

/// A proportional rate held as a fraction (`0.10` = 10%).
///
/// ## Why a Fraction?
/// Callers send tax rates as fractions (`taxRate: 0.1`) while discount
/// tables read naturally as percentages. Both construct the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    Decimal,
);

impl Rate {
    /// Creates a rate from a fraction (`0.1` = 10%).
    #[inline]
    pub const fn from_fraction(fraction: Decimal) -> Self {
        Rate(fraction)
    }

    /// Creates a rate from whole percent (`10` = 10%).
    #[inline]
    pub fn from_percentage(pct: u32) -> Self {
        Rate(Decimal::new(pct as i64, 2))
    }

    /// Creates a rate from basis points (`825` = 8.25%).
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::new(bps as i64, 4))
    }

    /// Returns the rate as a fraction.
    #[inline]
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(Decimal::ZERO)
    }

    /// Checks if rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

// =============================================================================
// Order Input
// =============================================================================

/// A purchase order as received from the caller.
///
/// Every field has a serde default so that a sparse record still
/// deserializes and the validator can report *all* of its problems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier. Required, non-empty.
    #[serde(default)]
    pub id: String,

    /// Line items in caller order.
    #[serde(default)]
    pub items: Vec<Item>,

    /// The purchasing customer.
    #[serde(default)]
    pub customer: Option<Customer>,

    /// Raw creation timestamp; an unparseable value is only a warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Order {
    /// Sum of quantities across all items (not the number of lines).
    ///
    /// `None` when the sum overflows.
    pub fn total_quantity(&self) -> Option<i64> {
        self.items
            .iter()
            .try_fold(0i64, |acc, item| acc.checked_add(item.quantity))
    }

    /// Number of line items.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// A line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub id: String,

    /// Unit price. Must be > 0.
    #[serde(default)]
    pub price: Money,

    /// Quantity ordered. Must be > 0.
    #[serde(default)]
    pub quantity: i64,
}

/// The purchasing customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_history: Option<PurchaseHistory>,

    /// Set by the caller (fraud checks, blocked accounts). Only consulted
    /// when `skipInvalidCustomers` is enabled.
    #[serde(default)]
    pub flagged_invalid: bool,
}

impl Customer {
    /// Historical spend, zero when no history is present.
    pub fn total_spent(&self) -> Money {
        self.purchase_history
            .as_ref()
            .and_then(|h| h.total_spent)
            .unwrap_or_default()
    }

    /// Tier derived from historical spend.
    #[inline]
    pub fn tier(&self) -> CustomerTier {
        CustomerTier::from_total_spent(self.total_spent())
    }
}

/// Purchase history summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseHistory {
    #[serde(default)]
    pub total_spent: Option<Money>,
}

// =============================================================================
// Customer Tier
// =============================================================================

/// Loyalty tier derived from historical spend.
///
/// ```text
/// totalSpent >= 1000 → Premium
/// totalSpent >=  500 → Gold
/// otherwise          → Standard
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerTier {
    #[default]
    Standard,
    Gold,
    Premium,
}

impl CustomerTier {
    /// Classifies a customer by total spend.
    ///
    /// ## Example
    /// ```rust
    /// use checkout_core::money::Money;
    /// use checkout_core::types::CustomerTier;
    ///
    /// assert_eq!(CustomerTier::from_total_spent(Money::from_units(1200)), CustomerTier::Premium);
    /// assert_eq!(CustomerTier::from_total_spent(Money::from_units(500)), CustomerTier::Gold);
    /// assert_eq!(
    ///     CustomerTier::from_total_spent(Money::from_cents(49999)),
    ///     CustomerTier::Standard
    /// );
    /// ```
    pub fn from_total_spent(total_spent: Money) -> Self {
        if total_spent >= Money::from_units(PREMIUM_TIER_THRESHOLD) {
            CustomerTier::Premium
        } else if total_spent >= Money::from_units(GOLD_TIER_THRESHOLD) {
            CustomerTier::Gold
        } else {
            CustomerTier::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerTier::Standard => "standard",
            CustomerTier::Gold => "gold",
            CustomerTier::Premium => "premium",
        }
    }
}

impl fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pricing Options
// =============================================================================

/// Per-run pricing options.
///
/// ## Configuration Flow
/// ```text
/// batch.toml [pricing] ──► env overrides ──► PricingOptions ──► price_order()
/// ```
///
/// `currentMonth` is injected rather than read from the clock so that
/// pricing is reproducible. `None` means the seasonal rule never fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingOptions {
    /// Tax rate as a fraction. Default 0.10.
    pub tax_rate: Rate,

    /// Charge the flat handling fee. Default true.
    pub apply_fees: bool,

    /// Total quantity above which an order is "large". Default 10.
    pub large_order_threshold: i64,

    /// Promotional code entered at checkout.
    pub promotional_code: Option<String>,

    /// Reject orders whose final price is zero or less.
    pub strict_mode: bool,

    /// Reject orders whose final price is below `minimum_order_value`.
    pub require_minimum_value: bool,

    /// Default 10.
    pub minimum_order_value: Money,

    /// Reject customers the caller has flagged invalid.
    pub skip_invalid_customers: bool,

    /// Signed line adjustments folded into the taxable subtotal once.
    pub adjustments: Vec<Money>,

    /// Calendar month (1-12) used by the seasonal rule.
    pub current_month: Option<u32>,
}

impl Default for PricingOptions {
    fn default() -> Self {
        PricingOptions {
            tax_rate: Rate::from_bps(DEFAULT_TAX_RATE_BPS),
            apply_fees: true,
            large_order_threshold: DEFAULT_LARGE_ORDER_THRESHOLD,
            promotional_code: None,
            strict_mode: false,
            require_minimum_value: false,
            minimum_order_value: Money::from_units(DEFAULT_MINIMUM_ORDER_VALUE),
            skip_invalid_customers: false,
            adjustments: Vec::new(),
            current_month: None,
        }
    }
}

impl PricingOptions {
    /// Sets the promotional code (builder style).
    pub fn with_promotional_code(mut self, code: impl Into<String>) -> Self {
        self.promotional_code = Some(code.into());
        self
    }

    /// Sets the current month (builder style).
    pub fn with_current_month(mut self, month: u32) -> Self {
        self.current_month = Some(month);
        self
    }

    /// Checks that every option is within its allowed range.
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_tax_rate(self.tax_rate)?;

        if self.large_order_threshold < 0 {
            return Err(CoreError::InvalidOptions(
                "largeOrderThreshold must not be negative".to_string(),
            ));
        }

        if self.minimum_order_value.is_negative() {
            return Err(CoreError::InvalidOptions(
                "minimumOrderValue must not be negative".to_string(),
            ));
        }

        if let Some(month) = self.current_month {
            if !(1..=12).contains(&month) {
                return Err(CoreError::InvalidOptions(format!(
                    "currentMonth must be between 1 and 12, got {}",
                    month
                )));
            }
        }

        if let Some(ref code) = self.promotional_code {
            validation::validate_promotional_code(code)?;
        }

        Ok(())
    }
}

// =============================================================================
// Pricing Output
// =============================================================================

/// Which rule in the discount stack produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Tier,
    Volume,
    Promotional,
    Seasonal,
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscountKind::Tier => "tier",
            DiscountKind::Volume => "volume",
            DiscountKind::Promotional => "promotional",
            DiscountKind::Seasonal => "seasonal",
        };
        f.write_str(name)
    }
}

/// One applied discount, in stack order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountEntry {
    pub kind: DiscountKind,
    /// Amount taken off the running total.
    pub amount: Money,
    pub percentage: Rate,
    /// Promotional code that triggered the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Full price breakdown for an accepted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub subtotal: Money,
    /// Sum of caller-supplied line adjustments.
    pub adjustments: Money,
    pub tax: Money,
    pub fee: Money,
    pub pre_discount_total: Money,
    pub discounts: Vec<DiscountEntry>,
    pub total_discount: Money,
    /// Exact final price, never negative.
    pub final_price: Money,
}

impl PricingBreakdown {
    /// Final price rounded to cents.
    #[inline]
    pub fn payable(&self) -> Money {
        self.final_price.rounded()
    }
}

/// Why an order was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    ValidationFailed,
    BelowMinimum,
    CompletionFailed,
    Error,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::ValidationFailed => "validation_failed",
            RejectionReason::BelowMinimum => "below_minimum",
            RejectionReason::CompletionFailed => "completion_failed",
            RejectionReason::Error => "error",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderOutcome {
    #[serde(rename_all = "camelCase")]
    Accepted {
        order_id: String,
        customer_id: String,
        item_count: usize,
        total_quantity: i64,
        tier: CustomerTier,
        pricing: PricingBreakdown,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    Rejected {
        order_id: String,
        reason: RejectionReason,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        errors: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl OrderOutcome {
    pub fn order_id(&self) -> &str {
        match self {
            OrderOutcome::Accepted { order_id, .. } | OrderOutcome::Rejected { order_id, .. } => {
                order_id
            }
        }
    }

    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, OrderOutcome::Accepted { .. })
    }

    /// Exact final price for accepted orders.
    pub fn final_price(&self) -> Option<Money> {
        match self {
            OrderOutcome::Accepted { pricing, .. } => Some(pricing.final_price),
            OrderOutcome::Rejected { .. } => None,
        }
    }

    pub fn pricing(&self) -> Option<&PricingBreakdown> {
        match self {
            OrderOutcome::Accepted { pricing, .. } => Some(pricing),
            OrderOutcome::Rejected { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            OrderOutcome::Accepted { .. } => None,
            OrderOutcome::Rejected { reason, .. } => Some(*reason),
        }
    }

    /// Validation or fault messages; empty for accepted orders.
    pub fn errors(&self) -> &[String] {
        match self {
            OrderOutcome::Accepted { .. } => &[],
            OrderOutcome::Rejected { errors, .. } => errors,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_constructors_agree() {
        assert_eq!(Rate::from_bps(1000), Rate::from_percentage(10));
        assert_eq!(Rate::from_percentage(10).fraction(), Decimal::new(1, 1));
        assert_eq!(Rate::from_bps(825).to_string(), "8.25%");
    }

    #[test]
    fn test_order_deserializes_sparse_record() {
        let order: Order = serde_json::from_str(r#"{"id": "1"}"#).unwrap();
        assert_eq!(order.id, "1");
        assert!(order.items.is_empty());
        assert!(order.customer.is_none());
    }

    #[test]
    fn test_order_deserializes_camel_case() {
        let json = r#"{
            "id": "123",
            "items": [{"id": "item1", "price": 10, "quantity": 2}],
            "customer": {"id": "cust1", "email": "test@example.com",
                         "purchaseHistory": {"totalSpent": 1200}},
            "createdAt": "2024-01-15T10:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.total_quantity(), Some(2));
        let customer = order.customer.unwrap();
        assert_eq!(customer.total_spent(), Money::from_units(1200));
        assert_eq!(customer.tier(), CustomerTier::Premium);
    }

    #[test]
    fn test_total_quantity_sums_quantities_not_lines() {
        let order = Order {
            items: vec![
                Item { id: "a".into(), price: Money::from_units(1), quantity: 6 },
                Item { id: "b".into(), price: Money::from_units(1), quantity: 6 },
            ],
            ..Default::default()
        };
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.total_quantity(), Some(12));
    }

    #[test]
    fn test_total_quantity_overflow_is_none() {
        let order = Order {
            items: vec![
                Item { id: "a".into(), price: Money::from_units(1), quantity: i64::MAX },
                Item { id: "b".into(), price: Money::from_units(1), quantity: 1 },
            ],
            ..Default::default()
        };
        assert_eq!(order.total_quantity(), None);
    }

    #[test]
    fn test_missing_history_is_standard() {
        let customer = Customer::default();
        assert_eq!(customer.total_spent(), Money::zero());
        assert_eq!(customer.tier(), CustomerTier::Standard);
    }

    #[test]
    fn test_default_options() {
        let options = PricingOptions::default();
        assert_eq!(options.tax_rate, Rate::from_percentage(10));
        assert!(options.apply_fees);
        assert_eq!(options.large_order_threshold, 10);
        assert_eq!(options.minimum_order_value, Money::from_units(10));
        assert!(options.current_month.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_validation() {
        let mut options = PricingOptions::default().with_current_month(13);
        assert!(options.validate().is_err());

        options.current_month = Some(12);
        assert!(options.validate().is_ok());

        options.tax_rate = Rate::from_percentage(150);
        assert!(options.validate().is_err());

        options.tax_rate = Rate::from_percentage(10);
        options.large_order_threshold = -1;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: PricingOptions =
            serde_json::from_str(r#"{"taxRate": 0.2, "promotionalCode": "SAVE20"}"#).unwrap();
        assert_eq!(options.tax_rate, Rate::from_percentage(20));
        assert_eq!(options.promotional_code.as_deref(), Some("SAVE20"));
        assert!(options.apply_fees);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = OrderOutcome::Rejected {
            order_id: "o-1".to_string(),
            reason: RejectionReason::BelowMinimum,
            errors: vec![],
            message: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["orderId"], "o-1");
        assert_eq!(json["reason"], "below_minimum");
        assert!(json.get("errors").is_none());
    }
}
