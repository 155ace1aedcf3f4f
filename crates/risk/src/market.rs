//! Lending market snapshot

use lendguard_core::CoinType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RiskError;
use crate::rate_limiter::RateLimiter;
use crate::reserve::{find_by_symbol, refresh_reserves, ParsedReserve, Reserve, ReserveMap};

/// A lending market as mirrored from chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingMarket {
    pub id: String,
    pub rate_limiter: RateLimiter,
    pub reserves: Vec<Reserve>,
}

/// A lending market with every reserve valued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMarket {
    pub id: String,
    pub rate_limiter: RateLimiter,
    pub reserves: ReserveMap,
    pub deposited_amount_usd: Decimal,
    pub borrowed_amount_usd: Decimal,
}

impl ParsedMarket {
    pub fn reserve(&self, coin_type: &CoinType) -> Result<&ParsedReserve, RiskError> {
        self.reserves
            .get(coin_type)
            .ok_or_else(|| RiskError::ReserveNotFound(coin_type.to_string()))
    }

    pub fn reserve_by_symbol(&self, symbol: &str) -> Result<&ParsedReserve, RiskError> {
        find_by_symbol(&self.reserves, symbol)
            .ok_or_else(|| RiskError::ReserveNotFound(symbol.to_string()))
    }

    /// Total value locked: deposits not lent out (USD)
    pub fn tvl_usd(&self) -> Decimal {
        self.deposited_amount_usd - self.borrowed_amount_usd
    }
}

pub fn refresh_market(market: &LendingMarket) -> Result<ParsedMarket, RiskError> {
    let reserves = refresh_reserves(&market.reserves)?;
    let deposited_amount_usd = reserves.values().map(|r| r.deposited_amount_usd).sum();
    let borrowed_amount_usd = reserves.values().map(|r| r.borrowed_amount_usd).sum();

    tracing::debug!(
        market = %market.id,
        reserves = reserves.len(),
        "refreshed lending market"
    );

    Ok(ParsedMarket {
        id: market.id.clone(),
        rate_limiter: market.rate_limiter.clone(),
        reserves,
        deposited_amount_usd,
        borrowed_amount_usd,
    })
}
