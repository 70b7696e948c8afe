//! # Pricing Calculator
//!
//! Derives subtotal, tax, fee and pre-discount total from a validated order.
//!
//! ```text
//! items ──► subtotal = Σ price × qty
//!                │
//!                + adjustments (signed, once)
//!                │
//!                ├──► tax = taxable × taxRate
//!                │
//!                ├──► fee = 5.00 if Σ qty > threshold, else 2.50 (0 if fees off)
//!                │
//!                ▼
//!        preDiscountTotal = taxable + tax + fee
//! ```
//!
//! The large-order test compares total *quantity* against the threshold,
//! never the number of line items.

use serde::{Deserialize, Serialize};

use crate::error::PricingFault;
use crate::money::Money;
use crate::types::{Order, PricingOptions};
use crate::{LARGE_ORDER_FEE_CENTS, STANDARD_FEE_CENTS};

/// Pricing figures ahead of the discount stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComputation {
    pub subtotal: Money,
    pub adjustments: Money,
    pub tax: Money,
    pub fee: Money,
    pub pre_discount_total: Money,
    pub total_quantity: i64,
}

impl PriceComputation {
    /// Whether the order counts as large under `threshold`.
    #[inline]
    pub fn is_large_order(&self, threshold: i64) -> bool {
        is_large_order(self.total_quantity, threshold)
    }
}

/// Computes subtotal, tax, fee and pre-discount total.
///
/// Expects an order that already passed validation. Arithmetic is checked
/// so absurd inputs surface as a [`PricingFault`] instead of a panic.
///
/// ## Example
/// ```rust
/// use checkout_core::money::Money;
/// use checkout_core::pricing::compute_pricing;
/// use checkout_core::types::{Item, Order, PricingOptions};
///
/// let order = Order {
///     items: vec![Item { id: "a".into(), price: Money::from_units(10), quantity: 2 }],
///     ..Default::default()
/// };
/// let pricing = compute_pricing(&order, &PricingOptions::default()).unwrap();
/// assert_eq!(pricing.subtotal, Money::from_units(20));
/// assert_eq!(pricing.tax, Money::from_units(2));
/// assert_eq!(pricing.fee, Money::from_cents(250));
/// assert_eq!(pricing.pre_discount_total, Money::from_cents(2450));
/// ```
pub fn compute_pricing(
    order: &Order,
    options: &PricingOptions,
) -> Result<PriceComputation, PricingFault> {
    let subtotal = order
        .items
        .iter()
        .try_fold(Money::zero(), |acc, item| {
            item.price
                .checked_mul_quantity(item.quantity)
                .and_then(|line| acc.checked_add(line))
        })
        .ok_or(PricingFault::Overflow { stage: "subtotal" })?;

    let total_quantity = order
        .total_quantity()
        .ok_or(PricingFault::Overflow { stage: "total quantity" })?;

    let adjustments = options
        .adjustments
        .iter()
        .try_fold(Money::zero(), |acc, adj| acc.checked_add(*adj))
        .ok_or(PricingFault::Overflow { stage: "adjustments" })?;

    let taxable = subtotal
        .checked_add(adjustments)
        .ok_or(PricingFault::Overflow { stage: "adjusted subtotal" })?;

    let tax = taxable
        .checked_portion(options.tax_rate)
        .ok_or(PricingFault::Overflow { stage: "tax" })?;

    let fee = handling_fee(total_quantity, options);

    let pre_discount_total = taxable
        .checked_add(tax)
        .and_then(|t| t.checked_add(fee))
        .ok_or(PricingFault::Overflow { stage: "pre-discount total" })?;

    tracing::debug!(
        order_id = %order.id,
        %subtotal,
        %tax,
        %fee,
        %pre_discount_total,
        total_quantity,
        "Computed pricing"
    );

    Ok(PriceComputation {
        subtotal,
        adjustments,
        tax,
        fee,
        pre_discount_total,
        total_quantity,
    })
}

/// Flat handling fee for an order with `total_quantity` units.
///
/// ## Example
/// ```rust
/// use checkout_core::money::Money;
/// use checkout_core::pricing::handling_fee;
/// use checkout_core::types::PricingOptions;
///
/// let options = PricingOptions::default();
/// assert_eq!(handling_fee(10, &options), Money::from_cents(250));
/// assert_eq!(handling_fee(11, &options), Money::from_cents(500));
/// ```
pub fn handling_fee(total_quantity: i64, options: &PricingOptions) -> Money {
    if !options.apply_fees {
        return Money::zero();
    }

    if is_large_order(total_quantity, options.large_order_threshold) {
        Money::from_cents(LARGE_ORDER_FEE_CENTS)
    } else {
        Money::from_cents(STANDARD_FEE_CENTS)
    }
}

/// Strictly greater than: an order of exactly `threshold` units is not large.
#[inline]
pub fn is_large_order(total_quantity: i64, threshold: i64) -> bool {
    total_quantity > threshold
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, Rate};
    use rust_decimal::Decimal;

    fn order_with(items: &[(i64, i64)]) -> Order {
        Order {
            id: "o".into(),
            items: items
                .iter()
                .enumerate()
                .map(|(i, (cents, qty))| Item {
                    id: format!("item{}", i),
                    price: Money::from_cents(*cents),
                    quantity: *qty,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_breakdown() {
        let order = order_with(&[(1000, 2)]);
        let pricing = compute_pricing(&order, &PricingOptions::default()).unwrap();

        assert_eq!(pricing.subtotal, Money::from_units(20));
        assert_eq!(pricing.tax, Money::from_units(2));
        assert_eq!(pricing.fee, Money::from_cents(250));
        assert_eq!(pricing.pre_discount_total, Money::from_cents(2450));
        assert_eq!(pricing.total_quantity, 2);
    }

    #[test]
    fn test_fee_uses_total_quantity_not_line_count() {
        // Two lines, twelve units: large by quantity, small by line count.
        let order = order_with(&[(100, 6), (100, 6)]);
        let pricing = compute_pricing(&order, &PricingOptions::default()).unwrap();
        assert_eq!(pricing.fee, Money::from_cents(500));

        // Eleven lines of one unit each: also large.
        let order = order_with(&[(100, 1); 11]);
        let pricing = compute_pricing(&order, &PricingOptions::default()).unwrap();
        assert_eq!(pricing.fee, Money::from_cents(500));
    }

    #[test]
    fn test_threshold_boundary() {
        let options = PricingOptions::default();
        assert_eq!(handling_fee(10, &options), Money::from_cents(250));
        assert_eq!(handling_fee(11, &options), Money::from_cents(500));

        let options = PricingOptions {
            large_order_threshold: 2,
            ..Default::default()
        };
        assert_eq!(handling_fee(3, &options), Money::from_cents(500));
    }

    #[test]
    fn test_fees_disabled() {
        let options = PricingOptions {
            apply_fees: false,
            ..Default::default()
        };
        let pricing = compute_pricing(&order_with(&[(1000, 20)]), &options).unwrap();
        assert_eq!(pricing.fee, Money::zero());
        assert_eq!(pricing.pre_discount_total, Money::from_units(220));
    }

    #[test]
    fn test_custom_tax_rate() {
        let options = PricingOptions {
            tax_rate: Rate::from_bps(825),
            ..Default::default()
        };
        let pricing = compute_pricing(&order_with(&[(1000, 1)]), &options).unwrap();
        // Exact: 0.825, not rounded at this stage.
        assert_eq!(pricing.tax.amount(), Decimal::new(825, 3));
    }

    #[test]
    fn test_adjustments_are_taxed_once() {
        let options = PricingOptions {
            adjustments: vec![Money::from_units(5), Money::from_units(-2)],
            ..Default::default()
        };
        let pricing = compute_pricing(&order_with(&[(1000, 1)]), &options).unwrap();

        assert_eq!(pricing.subtotal, Money::from_units(10));
        assert_eq!(pricing.adjustments, Money::from_units(3));
        assert_eq!(pricing.tax, Money::from_cents(130));
        // 13 + 1.30 + 2.50
        assert_eq!(pricing.pre_discount_total, Money::from_cents(1680));
    }

    #[test]
    fn test_overflow_is_a_fault() {
        let order = Order {
            items: vec![Item {
                id: "huge".into(),
                price: Money::new(Decimal::MAX),
                quantity: 2,
            }],
            ..Default::default()
        };
        let err = compute_pricing(&order, &PricingOptions::default()).unwrap_err();
        assert_eq!(err, PricingFault::Overflow { stage: "subtotal" });
    }

    #[test]
    fn test_quantity_overflow_is_a_fault() {
        let order = order_with(&[(1, i64::MAX), (1, 1)]);
        let err = compute_pricing(&order, &PricingOptions::default()).unwrap_err();
        assert_eq!(err, PricingFault::Overflow { stage: "total quantity" });
    }
}
