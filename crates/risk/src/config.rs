//! Risk engine configuration
//!
//! Thresholds load from a JSON file with per-field defaults, so a partial
//! file only overrides what it names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RiskError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Global ceiling applied to any obligation's min-price borrow limit (USD)
    #[serde(default = "default_borrow_limit_cap_usd")]
    pub borrow_limit_cap_usd: Decimal,
}

fn default_borrow_limit_cap_usd() -> Decimal {
    Decimal::new(30_000_000, 0)
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            borrow_limit_cap_usd: default_borrow_limit_cap_usd(),
        }
    }
}

impl RiskConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, RiskError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RiskError::ConfigError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| RiskError::ConfigError(format!("{}: {}", path.display(), e)))
    }
}
