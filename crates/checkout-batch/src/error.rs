//! # Batch Error Types
//!
//! Errors raised around a batch run: loading configuration and input,
//! never the pricing of an individual order (that is data in
//! [`checkout_core::OrderOutcome`]).
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Batch Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │      Input      │  │      Internal           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Io             │  │  TaskFailed             │ │
//! │  │  ConfigLoad     │  │  InvalidInput   │  │                         │ │
//! │  │  ConfigSave     │  │  Json           │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Batch error type.
#[derive(Debug, Error)]
pub enum BatchError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration parsed but holds values out of range.
    #[error("Invalid batch configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Reading the orders file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Orders file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Orders file is JSON but not a list of orders.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// A pricing task panicked or was cancelled.
    #[error("Pricing task failed: {0}")]
    TaskFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<toml::de::Error> for BatchError {
    fn from(err: toml::de::Error) -> Self {
        BatchError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for BatchError {
    fn from(err: toml::ser::Error) -> Self {
        BatchError::ConfigSaveFailed(err.to_string())
    }
}

impl From<checkout_core::CoreError> for BatchError {
    fn from(err: checkout_core::CoreError) -> Self {
        BatchError::InvalidConfig(err.to_string())
    }
}

impl From<tokio::task::JoinError> for BatchError {
    fn from(err: tokio::task::JoinError) -> Self {
        BatchError::TaskFailed(err.to_string())
    }
}

impl BatchError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BatchError::InvalidConfig(_)
                | BatchError::ConfigLoadFailed(_)
                | BatchError::ConfigSaveFailed(_)
        )
    }
}
