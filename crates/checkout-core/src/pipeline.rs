//! # Order Pipeline
//!
//! Runs one order through validation, pricing, discounts and the
//! acceptance gate, producing exactly one [`OrderOutcome`].
//!
//! ## State Machine
//! ```text
//! START ──► PricingOptions::validate
//!             │ out of range ─────────────────────► Rejected(error, message)
//!             ▼
//!           validate_order
//!             │ invalid ──────────────────────────► Rejected(validation_failed)
//!             │ valid
//!             ▼
//!           compute_pricing ──► DiscountEngine::apply ──► AcceptanceGate
//!             │                      │                       │ pass ──► Accepted
//!             │ fault                │ fault                 │ fail ──► Rejected(below_minimum
//!             ▼                      ▼                       │               | completion_failed)
//!           Rejected(error, message) ◄────────────────────────
//! ```
//!
//! Faults are recovered here and nowhere else; nothing escapes to the
//! batch level.

use crate::discount::{DiscountContext, DiscountEngine, DiscountOutcome};
use crate::error::PricingFault;
use crate::pricing::{compute_pricing, PriceComputation};
use crate::types::{
    Customer, Order, OrderOutcome, PricingBreakdown, PricingOptions, RejectionReason,
};
use crate::validation::validate_order;

// =============================================================================
// Acceptance Gate
// =============================================================================

/// Why the gate refused an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRejection {
    pub reason: RejectionReason,
    pub message: String,
}

/// Final checks on a fully priced order.
///
/// ## Rules (in order)
/// 1. `skipInvalidCustomers` and the customer is flagged → completion_failed
/// 2. `requireMinimumValue` and final < minimum → below_minimum
/// 3. `strictMode` and final <= 0 → completion_failed
pub fn acceptance_gate(
    customer: &Customer,
    breakdown: &PricingBreakdown,
    options: &PricingOptions,
) -> Result<(), GateRejection> {
    if options.skip_invalid_customers && customer.flagged_invalid {
        return Err(GateRejection {
            reason: RejectionReason::CompletionFailed,
            message: format!("Customer {} is flagged invalid", customer.id),
        });
    }

    if options.require_minimum_value && breakdown.final_price < options.minimum_order_value {
        return Err(GateRejection {
            reason: RejectionReason::BelowMinimum,
            message: format!(
                "Final price {} is below the minimum order value {}",
                breakdown.final_price, options.minimum_order_value
            ),
        });
    }

    if options.strict_mode && !breakdown.final_price.is_positive() {
        return Err(GateRejection {
            reason: RejectionReason::CompletionFailed,
            message: format!("Final price {} is not positive", breakdown.final_price),
        });
    }

    Ok(())
}

// =============================================================================
// Pipeline
// =============================================================================

/// Orchestrates one pricing run per order.
///
/// Holds only the (immutable) discount stack, so one pipeline can be shared
/// across threads.
#[derive(Debug, Default)]
pub struct OrderPipeline {
    engine: DiscountEngine,
}

impl OrderPipeline {
    /// Pipeline with the standard discount stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with a custom discount stack.
    pub fn with_engine(engine: DiscountEngine) -> Self {
        OrderPipeline { engine }
    }

    /// Prices one order. Never panics, never returns an error.
    ///
    /// Out-of-range options reject the order with reason `error` before
    /// anything is priced.
    pub fn run(&self, order: &Order, options: &PricingOptions) -> OrderOutcome {
        if let Err(err) = options.validate() {
            tracing::warn!(order_id = %order.id, error = %err, "Invalid pricing options");
            return OrderOutcome::Rejected {
                order_id: order.id.clone(),
                reason: RejectionReason::Error,
                errors: Vec::new(),
                message: Some(err.to_string()),
            };
        }

        let report = validate_order(order);
        if !report.valid {
            tracing::info!(
                order_id = %order.id,
                errors = report.errors.len(),
                "Order rejected: validation failed"
            );
            return OrderOutcome::Rejected {
                order_id: order.id.clone(),
                reason: RejectionReason::ValidationFailed,
                errors: report.error_messages(),
                message: None,
            };
        }

        let (customer, total_quantity, breakdown) = match self.price(order, options) {
            Ok(priced) => priced,
            Err(fault) => {
                tracing::warn!(order_id = %order.id, error = %fault, "Pricing fault");
                return OrderOutcome::Rejected {
                    order_id: order.id.clone(),
                    reason: RejectionReason::Error,
                    errors: Vec::new(),
                    message: Some(fault.to_string()),
                };
            }
        };

        if let Err(rejection) = acceptance_gate(customer, &breakdown, options) {
            tracing::info!(
                order_id = %order.id,
                reason = %rejection.reason,
                "Order rejected: {}",
                rejection.message
            );
            return OrderOutcome::Rejected {
                order_id: order.id.clone(),
                reason: rejection.reason,
                errors: Vec::new(),
                message: Some(rejection.message),
            };
        }

        tracing::info!(
            order_id = %order.id,
            final_price = %breakdown.final_price,
            "Order accepted"
        );

        OrderOutcome::Accepted {
            order_id: order.id.clone(),
            customer_id: customer.id.clone(),
            item_count: order.item_count(),
            total_quantity,
            tier: customer.tier(),
            pricing: breakdown,
            warnings: report.warnings,
        }
    }

    fn price<'o>(
        &self,
        order: &'o Order,
        options: &PricingOptions,
    ) -> Result<(&'o Customer, i64, PricingBreakdown), PricingFault> {
        let customer = order
            .customer
            .as_ref()
            .ok_or_else(|| PricingFault::MissingCustomer {
                order_id: order.id.clone(),
            })?;

        let computation = compute_pricing(order, options)?;
        let ctx = DiscountContext {
            tier: customer.tier(),
            total_quantity: computation.total_quantity,
            options,
        };
        let discounts = self.engine.apply(computation.pre_discount_total, &ctx)?;

        let total_quantity = computation.total_quantity;
        Ok((customer, total_quantity, assemble(computation, discounts)))
    }
}

fn assemble(computation: PriceComputation, discounts: DiscountOutcome) -> PricingBreakdown {
    PricingBreakdown {
        subtotal: computation.subtotal,
        adjustments: computation.adjustments,
        tax: computation.tax,
        fee: computation.fee,
        pre_discount_total: computation.pre_discount_total,
        discounts: discounts.discounts,
        total_discount: discounts.total_discount,
        final_price: discounts.final_price,
    }
}

/// Prices one order with the standard discount stack.
///
/// ## Example
/// ```rust
/// use checkout_core::{price_order, Money, Order, OrderOutcome, PricingOptions};
///
/// let order: Order = serde_json::from_str(r#"{
///     "id": "123",
///     "items": [{"id": "item1", "price": 10, "quantity": 2}],
///     "customer": {"id": "cust1", "email": "test@example.com",
///                  "purchaseHistory": {"totalSpent": 1200}}
/// }"#).unwrap();
///
/// let options = PricingOptions::default().with_promotional_code("SAVE10");
/// let outcome = price_order(&order, &options);
/// assert!(outcome.is_accepted());
/// assert_eq!(outcome.final_price().unwrap().rounded(), Money::from_cents(1985));
/// ```
pub fn price_order(order: &Order, options: &PricingOptions) -> OrderOutcome {
    OrderPipeline::new().run(order, options)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Item, Rate};

    fn order(price_cents: i64, quantity: i64) -> Order {
        Order {
            id: "o-1".into(),
            items: vec![Item {
                id: "i-1".into(),
                price: Money::from_cents(price_cents),
                quantity,
            }],
            customer: Some(Customer {
                id: "c-1".into(),
                email: "c@example.com".into(),
                ..Default::default()
            }),
            created_at: None,
        }
    }

    #[test]
    fn test_accepted_carries_breakdown() {
        let outcome = price_order(&order(1000, 2), &PricingOptions::default());
        match outcome {
            OrderOutcome::Accepted {
                customer_id,
                item_count,
                total_quantity,
                pricing,
                ..
            } => {
                assert_eq!(customer_id, "c-1");
                assert_eq!(item_count, 1);
                assert_eq!(total_quantity, 2);
                assert_eq!(pricing.final_price, Money::from_cents(2450));
            }
            other => panic!("expected accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_below_minimum() {
        let options = PricingOptions {
            require_minimum_value: true,
            ..Default::default()
        };
        let outcome = price_order(&order(100, 1), &options);
        assert_eq!(outcome.reason(), Some(RejectionReason::BelowMinimum));
    }

    #[test]
    fn test_minimum_not_enforced_by_default() {
        let outcome = price_order(&order(100, 1), &PricingOptions::default());
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_strict_mode_rejects_zero_price() {
        let options = PricingOptions {
            strict_mode: true,
            apply_fees: false,
            adjustments: vec![Money::from_units(-50)],
            ..Default::default()
        };
        let outcome = price_order(&order(1000, 1), &options);
        assert_eq!(outcome.reason(), Some(RejectionReason::CompletionFailed));

        let lenient = PricingOptions {
            strict_mode: false,
            ..options
        };
        let outcome = price_order(&order(1000, 1), &lenient);
        assert_eq!(outcome.final_price(), Some(Money::zero()));
    }

    #[test]
    fn test_skip_flagged_customer() {
        let mut flagged = order(1000, 2);
        if let Some(ref mut c) = flagged.customer {
            c.flagged_invalid = true;
        }

        let outcome = price_order(&flagged, &PricingOptions::default());
        assert!(outcome.is_accepted());

        let options = PricingOptions {
            skip_invalid_customers: true,
            ..Default::default()
        };
        let outcome = price_order(&flagged, &options);
        assert_eq!(outcome.reason(), Some(RejectionReason::CompletionFailed));
    }

    #[test]
    fn test_fault_becomes_error_outcome() {
        let options = PricingOptions {
            adjustments: vec![Money::new(rust_decimal::Decimal::MAX)],
            ..Default::default()
        };
        let outcome = price_order(&order(1000, 1), &options);
        match outcome {
            OrderOutcome::Rejected {
                reason, message, ..
            } => {
                assert_eq!(reason, RejectionReason::Error);
                assert!(message.unwrap().contains("overflow"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_options_reject_before_pricing() {
        let options = PricingOptions {
            tax_rate: Rate::from_fraction(rust_decimal::Decimal::new(-5, 1)),
            large_order_threshold: -3,
            current_month: Some(13),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        match price_order(&order(10000, 1), &options) {
            OrderOutcome::Rejected {
                reason,
                errors,
                message,
                ..
            } => {
                assert_eq!(reason, RejectionReason::Error);
                assert!(errors.is_empty());
                assert!(message.unwrap().contains("taxRate"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_month_alone_is_rejected() {
        let options = PricingOptions::default().with_current_month(13);
        let outcome = price_order(&order(1000, 2), &options);
        assert_eq!(outcome.reason(), Some(RejectionReason::Error));
    }

    #[test]
    fn test_warnings_pass_through() {
        let mut o = order(1000, 2);
        o.created_at = Some("not a date".into());
        match price_order(&o, &PricingOptions::default()) {
            OrderOutcome::Accepted { warnings, .. } => assert_eq!(warnings.len(), 1),
            other => panic!("expected accepted, got {:?}", other),
        }
    }
}
