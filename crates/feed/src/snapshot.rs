//! Chain state as of one moment

use lendguard_core::{CoinMetadata, CoinType};
use lendguard_risk::{LendingMarket, Obligation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A lending market, the obligations of interest and coin metadata, read
/// together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub market: LendingMarket,
    #[serde(default)]
    pub obligations: Vec<Obligation>,
    #[serde(default)]
    pub coin_metadata: BTreeMap<CoinType, CoinMetadata>,
    /// Chain clock at read time (ms)
    pub timestamp_ms: u64,
}

impl MarketSnapshot {
    pub fn obligation(&self, id: &str) -> Option<&Obligation> {
        self.obligations.iter().find(|o| o.id == id)
    }
}
