//! # Error Types
//!
//! Domain-specific error types for checkout-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  checkout-core errors (this file)                                      │
//! │  ├── ValidationError  - Structural/semantic problems with an order     │
//! │  ├── PricingFault     - Unexpected faults while computing a price      │
//! │  └── CoreError        - Wraps both, plus invalid pricing options       │
//! │                                                                         │
//! │  checkout-batch errors (separate crate)                                │
//! │  └── BatchError       - Config, file and JSON failures                 │
//! │                                                                         │
//! │  Per-order errors never escape: the pipeline turns them into a         │
//! │  Rejected outcome, so a batch always runs to completion.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core pricing errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Pricing options are out of range (e.g. tax rate above 100%).
    #[error("Invalid pricing options: {0}")]
    InvalidOptions(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Computation fault (wraps PricingFault).
    #[error("Pricing fault: {0}")]
    Pricing(#[from] PricingFault),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Order validation errors.
///
/// One value per failed rule. The validator collects all of them, so an
/// order with two bad items yields two `Item` entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The record is not a structured order at all.
    #[error("Order must be a structured record: {reason}")]
    NotARecord { reason: String },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The order has no line items.
    #[error("Order must contain at least one item")]
    NoItems,

    /// A line item failed one of its rules.
    #[error("Item {index}: {problem}")]
    Item { index: usize, problem: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Wraps a field-level error as an item error at `index`.
    pub fn at_item(index: usize, inner: ValidationError) -> Self {
        ValidationError::Item {
            index,
            problem: inner.to_string(),
        }
    }
}

// =============================================================================
// Pricing Fault
// =============================================================================

/// Unexpected faults during pricing or discounting.
///
/// A validated order should never produce one; if it does, the pipeline
/// rejects the order with reason `error` and the fault message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingFault {
    /// Decimal arithmetic overflowed.
    #[error("Arithmetic overflow while computing {stage}")]
    Overflow { stage: &'static str },

    /// Customer record disappeared between validation and pricing.
    #[error("Order {order_id} has no customer")]
    MissingCustomer { order_id: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
