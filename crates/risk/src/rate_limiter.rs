//! Outflow rate limiter mirror
//!
//! The market caps aggregate outflow (borrows and withdrawals) over a
//! sliding window. The window itself lives on chain; the client only reads
//! the remaining capacity snapshot and converts it into asset units.

use lendguard_core::decimal::{percent_of, safe_div};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reserve::ParsedReserve;

/// Which kind of outflow is being sized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutflowSide {
    Borrow,
    Withdraw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Window length in seconds
    pub window_duration_s: u64,
    /// Maximum outflow per window (USD)
    pub max_outflow: Decimal,
}

/// Snapshot of the market's outflow limiter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiter {
    pub config: RateLimiterConfig,
    /// Outflow still allowed in the current window (USD)
    pub remaining_outflow: Decimal,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig, remaining_outflow: Decimal) -> Self {
        Self {
            config,
            remaining_outflow,
        }
    }

    /// Remaining outflow in units of `reserve`'s token.
    ///
    /// Valued at the reserve's upper price bound; borrows are further divided
    /// by the borrow weight. Zero when the price is zero.
    pub fn remaining_outflow_for(&self, reserve: &ParsedReserve, side: OutflowSide) -> Decimal {
        let per_unit = match side {
            OutflowSide::Withdraw => reserve.max_price,
            OutflowSide::Borrow => reserve.max_price * reserve.config.borrow_weight,
        };
        safe_div(self.remaining_outflow, per_unit).unwrap_or(Decimal::ZERO)
    }

    /// Percent of the window's capacity already used
    pub fn used_percent(&self) -> Decimal {
        let used = (self.config.max_outflow - self.remaining_outflow).max(Decimal::ZERO);
        percent_of(used, self.config.max_outflow)
    }
}
