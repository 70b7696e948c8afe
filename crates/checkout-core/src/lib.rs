//! # checkout-core: Pure Pricing Logic
//!
//! This crate is the **heart** of checkout pricing. It validates an order,
//! prices it, applies the discount stack and decides whether it is
//! accepted, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Pricing Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              checkout-batch (BatchAggregator, CLI)              │   │
//! │  │     load orders ──► price each ──► fold RunStatistics ──► report│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ price_order(order, options)           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ checkout-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │validation │─►│  pricing  │─►│ discount  │─►│ pipeline  │  │   │
//! │  │   │  errors[] │  │ tax, fee  │  │  stack    │  │   gate    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO SHARED STATE • PURE FUNCTIONS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Orders, options, breakdowns and outcomes
//! - [`money`] - Money type with exact decimal arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Order validation
//! - [`pricing`] - Subtotal, tax and fee
//! - [`discount`] - The ordered discount stack
//! - [`pipeline`] - Orchestration and acceptance gate
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same order + options = same outcome
//! 2. **No I/O**: even the current month is passed in
//! 3. **Exact Money**: decimal arithmetic, rounded only for display
//! 4. **Errors as Data**: every order yields exactly one outcome
//!
//! ## Example Usage
//!
//! ```rust
//! use checkout_core::{price_order, Order, PricingOptions, RejectionReason};
//!
//! let order: Order = serde_json::from_str(r#"{
//!     "id": "42",
//!     "items": [],
//!     "customer": {"id": "c", "email": "c@example.com"}
//! }"#).unwrap();
//!
//! let outcome = price_order(&order, &PricingOptions::default());
//! assert_eq!(outcome.reason(), Some(RejectionReason::ValidationFailed));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod error;
pub mod money;
pub mod pipeline;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use discount::DiscountEngine;
pub use error::{CoreError, CoreResult, PricingFault, ValidationError};
pub use money::Money;
pub use pipeline::{price_order, OrderPipeline};
pub use types::*;
pub use validation::{validate_order, ValidationReport};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate in basis points (10%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1000;

/// Total quantity above which an order is "large".
pub const DEFAULT_LARGE_ORDER_THRESHOLD: i64 = 10;

/// Default minimum order value, in whole currency units.
pub const DEFAULT_MINIMUM_ORDER_VALUE: i64 = 10;

/// Handling fee for large orders.
pub const LARGE_ORDER_FEE_CENTS: i64 = 500;

/// Handling fee for everything else.
pub const STANDARD_FEE_CENTS: i64 = 250;

/// Spend thresholds for customer tiers, in whole currency units.
pub const PREMIUM_TIER_THRESHOLD: i64 = 1000;
pub const GOLD_TIER_THRESHOLD: i64 = 500;

/// Discount percentages.
pub const PREMIUM_TIER_DISCOUNT_PCT: u32 = 10;
pub const VOLUME_DISCOUNT_PCT: u32 = 5;
pub const SEASONAL_DISCOUNT_PCT: u32 = 15;

/// Month number that triggers the seasonal discount.
pub const DECEMBER: u32 = 12;

/// Recognized promotional codes and their percentage.
pub const PROMOTIONAL_CODES: &[(&str, u32)] = &[("SAVE10", 10), ("SAVE20", 20), ("SAVE50", 50)];

/// Longest promotional code accepted in options.
pub const MAX_PROMO_CODE_LENGTH: usize = 32;
