//! # Discount Engine
//!
//! Applies the discount stack to a pre-discount total.
//!
//! ## Stack Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  preDiscountTotal                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Tier          premium 10%  (gold/standard evaluated, 0%)            │
//! │       │ running -= running × rate                                       │
//! │       ▼                                                                 │
//! │  2. Volume        5% when Σ qty > threshold                             │
//! │       ▼                                                                 │
//! │  3. Promotional   SAVE10 / SAVE20 / SAVE50, unknown codes 0%            │
//! │       ▼                                                                 │
//! │  4. Seasonal      15% when currentMonth == 12                           │
//! │       ▼                                                                 │
//! │  finalPrice = max(0, running)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each rate multiplies the total left by the previous step, so the order
//! of the stack changes the amount each rule records. Only nonzero
//! discounts are recorded.

use std::fmt;

use crate::error::PricingFault;
use crate::money::Money;
use crate::pricing::is_large_order;
use crate::types::{CustomerTier, DiscountEntry, DiscountKind, PricingOptions, Rate};
use crate::{
    DECEMBER, PREMIUM_TIER_DISCOUNT_PCT, PROMOTIONAL_CODES, SEASONAL_DISCOUNT_PCT,
    VOLUME_DISCOUNT_PCT,
};

// =============================================================================
// Rule Contract
// =============================================================================

/// Facts the discount rules look at.
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext<'a> {
    pub tier: CustomerTier,
    pub total_quantity: i64,
    pub options: &'a PricingOptions,
}

/// What a rule decided for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecision {
    pub rate: Rate,
    pub code: Option<String>,
}

impl RuleDecision {
    fn rate(rate: Rate) -> Self {
        RuleDecision { rate, code: None }
    }
}

/// One step of the discount stack.
pub trait DiscountRule: fmt::Debug + Send + Sync {
    fn kind(&self) -> DiscountKind;

    /// Returns `None` when the rule does not apply at all.
    fn evaluate(&self, ctx: &DiscountContext<'_>) -> Option<RuleDecision>;
}

// =============================================================================
// Rules
// =============================================================================

/// Loyalty discount by customer tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierDiscount;

impl DiscountRule for TierDiscount {
    fn kind(&self) -> DiscountKind {
        DiscountKind::Tier
    }

    fn evaluate(&self, ctx: &DiscountContext<'_>) -> Option<RuleDecision> {
        Some(RuleDecision::rate(tier_rate(ctx.tier)))
    }
}

/// Tier → rate table. Gold currently earns nothing.
pub fn tier_rate(tier: CustomerTier) -> Rate {
    match tier {
        CustomerTier::Premium => Rate::from_percentage(PREMIUM_TIER_DISCOUNT_PCT),
        CustomerTier::Gold | CustomerTier::Standard => Rate::zero(),
    }
}

/// Discount for large orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeDiscount;

impl DiscountRule for VolumeDiscount {
    fn kind(&self) -> DiscountKind {
        DiscountKind::Volume
    }

    fn evaluate(&self, ctx: &DiscountContext<'_>) -> Option<RuleDecision> {
        is_large_order(ctx.total_quantity, ctx.options.large_order_threshold)
            .then(|| RuleDecision::rate(Rate::from_percentage(VOLUME_DISCOUNT_PCT)))
    }
}

/// Discount for a recognized promotional code.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromotionalDiscount;

impl DiscountRule for PromotionalDiscount {
    fn kind(&self) -> DiscountKind {
        DiscountKind::Promotional
    }

    fn evaluate(&self, ctx: &DiscountContext<'_>) -> Option<RuleDecision> {
        let code = ctx.options.promotional_code.as_deref()?;
        let rate = promotional_rate(code).unwrap_or_else(|| {
            tracing::debug!(code, "Unrecognized promotional code");
            Rate::zero()
        });
        Some(RuleDecision {
            rate,
            code: Some(normalize_code(code)),
        })
    }
}

/// Looks up a promotional code, ignoring case and surrounding whitespace.
///
/// ## Example
/// ```rust
/// use checkout_core::discount::promotional_rate;
/// use checkout_core::types::Rate;
///
/// assert_eq!(promotional_rate("SAVE20"), Some(Rate::from_percentage(20)));
/// assert_eq!(promotional_rate(" save10 "), Some(Rate::from_percentage(10)));
/// assert_eq!(promotional_rate("FAKE"), None);
/// ```
pub fn promotional_rate(code: &str) -> Option<Rate> {
    let code = normalize_code(code);
    PROMOTIONAL_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, pct)| Rate::from_percentage(*pct))
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// December discount. The month is injected through the options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalDiscount;

impl DiscountRule for SeasonalDiscount {
    fn kind(&self) -> DiscountKind {
        DiscountKind::Seasonal
    }

    fn evaluate(&self, ctx: &DiscountContext<'_>) -> Option<RuleDecision> {
        (ctx.options.current_month == Some(DECEMBER))
            .then(|| RuleDecision::rate(Rate::from_percentage(SEASONAL_DISCOUNT_PCT)))
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Result of running the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountOutcome {
    pub discounts: Vec<DiscountEntry>,
    pub total_discount: Money,
    pub final_price: Money,
}

/// An ordered stack of discount rules.
#[derive(Debug)]
pub struct DiscountEngine {
    rules: Vec<Box<dyn DiscountRule>>,
}

impl DiscountEngine {
    /// Tier → Volume → Promotional → Seasonal.
    pub fn standard() -> Self {
        DiscountEngine {
            rules: vec![
                Box::new(TierDiscount),
                Box::new(VolumeDiscount),
                Box::new(PromotionalDiscount),
                Box::new(SeasonalDiscount),
            ],
        }
    }

    /// Builds an engine with a custom rule order.
    pub fn with_rules(rules: Vec<Box<dyn DiscountRule>>) -> Self {
        DiscountEngine { rules }
    }

    /// Kinds in application order.
    pub fn order(&self) -> Vec<DiscountKind> {
        self.rules.iter().map(|r| r.kind()).collect()
    }

    /// Applies every rule in order to the running total.
    ///
    /// A non-positive running total is left alone: a discount never raises
    /// the price.
    ///
    /// ## Example
    /// ```rust
    /// use checkout_core::discount::{DiscountContext, DiscountEngine};
    /// use checkout_core::money::Money;
    /// use checkout_core::types::{CustomerTier, PricingOptions};
    ///
    /// let options = PricingOptions::default().with_promotional_code("SAVE10");
    /// let ctx = DiscountContext {
    ///     tier: CustomerTier::Premium,
    ///     total_quantity: 2,
    ///     options: &options,
    /// };
    /// let outcome = DiscountEngine::standard().apply(Money::from_cents(2450), &ctx).unwrap();
    /// assert_eq!(outcome.final_price.to_string(), "$19.85"); // exact 19.845
    /// assert_eq!(outcome.discounts.len(), 2);
    /// ```
    pub fn apply(
        &self,
        pre_discount_total: Money,
        ctx: &DiscountContext<'_>,
    ) -> Result<DiscountOutcome, PricingFault> {
        let mut running = pre_discount_total;
        let mut discounts = Vec::new();
        let mut total_discount = Money::zero();

        for rule in &self.rules {
            let Some(decision) = rule.evaluate(ctx) else {
                continue;
            };
            if decision.rate.is_zero() || !running.is_positive() {
                continue;
            }

            let amount = running
                .checked_portion(decision.rate)
                .ok_or(PricingFault::Overflow { stage: "discount" })?;
            running = running
                .checked_sub(amount)
                .ok_or(PricingFault::Overflow { stage: "discount" })?;
            total_discount += amount;

            tracing::debug!(
                kind = %rule.kind(),
                rate = %decision.rate,
                %amount,
                %running,
                "Applied discount"
            );

            discounts.push(DiscountEntry {
                kind: rule.kind(),
                amount,
                percentage: decision.rate,
                code: decision.code,
            });
        }

        Ok(DiscountOutcome {
            discounts,
            total_discount,
            final_price: running.clamp_non_negative(),
        })
    }
}

impl Default for DiscountEngine {
    fn default() -> Self {
        DiscountEngine::standard()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
