//! Action validator configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Distinct deposit reserves an obligation may hold
    #[serde(default = "default_max_positions")]
    pub max_deposit_positions: usize,

    /// Distinct borrow reserves an obligation may hold
    #[serde(default = "default_max_positions")]
    pub max_borrow_positions: usize,

    /// SUI kept in the wallet for gas when depositing or repaying SUI
    #[serde(default = "default_native_gas_reserve")]
    pub native_gas_reserve: Decimal,

    /// USD value above which holding the same asset on both sides counts as looping
    #[serde(default = "default_looping_threshold_usd")]
    pub looping_threshold_usd: Decimal,
}

fn default_max_positions() -> usize {
    5
}

fn default_native_gas_reserve() -> Decimal {
    Decimal::ONE
}

fn default_looping_threshold_usd() -> Decimal {
    Decimal::new(2, 2) // $0.02
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            max_deposit_positions: default_max_positions(),
            max_borrow_positions: default_max_positions(),
            native_gas_reserve: default_native_gas_reserve(),
            looping_threshold_usd: default_looping_threshold_usd(),
        }
    }
}

impl ActionConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ActionError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ActionError::ConfigError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ActionError::ConfigError(format!("{}: {}", path.display(), e)))
    }
}
