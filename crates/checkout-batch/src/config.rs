//! # Batch Configuration
//!
//! Configuration for batch pricing runs.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority, applied by price-batch)      │
//! │     --promo SAVE10  --month 12  --parallel                             │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     CHECKOUT_TAX_RATE=0.0825                                           │
//! │     CHECKOUT_PROMO_CODE=SAVE20                                         │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/checkout/batch.toml (Linux)                              │
//! │     ~/Library/Application Support/com.checkout.checkout/batch.toml     │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     10% tax, fees on, threshold 10, no promo, sequential               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # batch.toml
//! [pricing]
//! taxRate = 0.0825
//! largeOrderThreshold = 10
//! promotionalCode = "SAVE10"
//! requireMinimumValue = true
//! minimumOrderValue = 15
//!
//! [report]
//! include_details = true
//! include_statistics = true
//!
//! [run]
//! parallel = false
//! ```

use std::path::{Path, PathBuf};

use checkout_core::{Money, PricingOptions, Rate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BatchError, BatchResult};

// =============================================================================
// Environment Keys
// =============================================================================

pub const ENV_TAX_RATE: &str = "CHECKOUT_TAX_RATE";
pub const ENV_PROMO_CODE: &str = "CHECKOUT_PROMO_CODE";
pub const ENV_STRICT_MODE: &str = "CHECKOUT_STRICT_MODE";
pub const ENV_MIN_ORDER_VALUE: &str = "CHECKOUT_MIN_ORDER_VALUE";
pub const ENV_LARGE_ORDER_THRESHOLD: &str = "CHECKOUT_LARGE_ORDER_THRESHOLD";
pub const ENV_PARALLEL: &str = "CHECKOUT_PARALLEL";

// =============================================================================
// Report Settings
// =============================================================================

/// What the batch report carries besides the accepted/rejected counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Include every order outcome, in input order.
    #[serde(default = "default_true")]
    pub include_details: bool,

    /// Include the folded [`RunStatistics`](crate::stats::RunStatistics).
    #[serde(default = "default_true")]
    pub include_statistics: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            include_details: true,
            include_statistics: true,
        }
    }
}

// =============================================================================
// Run Settings
// =============================================================================

/// How orders are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Price orders on the blocking pool instead of one after another.
    #[serde(default)]
    pub parallel: bool,
}

// =============================================================================
// Main Batch Configuration
// =============================================================================

/// Complete batch configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Options handed to every `price_order` call.
    #[serde(default)]
    pub pricing: PricingOptions,

    /// Report shape.
    #[serde(default)]
    pub report: ReportSettings,

    /// Scheduling.
    #[serde(default)]
    pub run: RunSettings,
}

impl BatchConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (batch.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> BatchResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading batch config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> BatchResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BatchError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> BatchResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| BatchError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BatchError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| BatchError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Batch config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> BatchResult<()> {
        self.pricing.validate()?;
        Ok(())
    }

    /// Applies `CHECKOUT_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TAX_RATE) {
            match raw.trim().parse::<Decimal>() {
                Ok(fraction) => {
                    debug!(tax_rate = %fraction, "Overriding tax rate from environment");
                    self.pricing.tax_rate = Rate::from_fraction(fraction);
                }
                Err(_) => warn!(value = %raw, "Ignoring unparseable {}", ENV_TAX_RATE),
            }
        }

        if let Some(code) = lookup(ENV_PROMO_CODE) {
            let code = code.trim();
            if code.is_empty() {
                self.pricing.promotional_code = None;
            } else {
                debug!(code, "Overriding promotional code from environment");
                self.pricing.promotional_code = Some(code.to_string());
            }
        }

        if let Some(raw) = lookup(ENV_STRICT_MODE) {
            match parse_flag(&raw) {
                Some(flag) => self.pricing.strict_mode = flag,
                None => warn!(value = %raw, "Ignoring unparseable {}", ENV_STRICT_MODE),
            }
        }

        if let Some(raw) = lookup(ENV_MIN_ORDER_VALUE) {
            match raw.trim().parse::<Decimal>() {
                Ok(value) => {
                    self.pricing.minimum_order_value = Money::new(value);
                    self.pricing.require_minimum_value = true;
                }
                Err(_) => warn!(value = %raw, "Ignoring unparseable {}", ENV_MIN_ORDER_VALUE),
            }
        }

        if let Some(raw) = lookup(ENV_LARGE_ORDER_THRESHOLD) {
            match raw.trim().parse::<i64>() {
                Ok(threshold) => self.pricing.large_order_threshold = threshold,
                Err(_) => warn!(value = %raw, "Ignoring unparseable {}", ENV_LARGE_ORDER_THRESHOLD),
            }
        }

        if let Some(raw) = lookup(ENV_PARALLEL) {
            match parse_flag(&raw) {
                Some(flag) => self.run.parallel = flag,
                None => warn!(value = %raw, "Ignoring unparseable {}", ENV_PARALLEL),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "checkout", "checkout")
            .map(|dirs| dirs.config_dir().join("batch.toml"))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
