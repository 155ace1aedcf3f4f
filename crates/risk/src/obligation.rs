//! Obligation Health Engine
//!
//! Aggregates one account's deposits and borrows across reserves into a
//! borrow limit, weighted borrows and a liquidation threshold.
//!
//! The valuation is deliberately asymmetric:
//! - the borrow limit values collateral at each reserve's `min_price`
//! - max-price weighted borrows value debt at each reserve's `max_price`
//! - the unhealthy borrow value uses the current price, as liquidation does
//!   on chain

use lendguard_core::decimal::{percent_of, pow10};
use lendguard_core::{CoinType, Wad};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::error::RiskError;
use crate::pool_reward::UserRewardManager;
use crate::reserve::{ParsedReserve, ReserveMap};

/// A deposit position as mirrored from chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub coin_type: CoinType,
    pub reserve_array_index: u64,
    /// Raw c-token units
    pub deposited_ctoken_amount: u64,
    pub user_reward_manager_index: u64,
}

/// A borrow position as mirrored from chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrow {
    pub coin_type: CoinType,
    pub reserve_array_index: u64,
    /// WAD-scaled raw mint units as of the position's last refresh
    pub borrowed_amount: Wad,
    /// Reserve cumulative borrow rate at the position's last refresh
    pub cumulative_borrow_rate: Wad,
    pub user_reward_manager_index: u64,
}

/// One account's cross-collateral position in a lending market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub deposits: Vec<Deposit>,
    #[serde(default)]
    pub borrows: Vec<Borrow>,
    #[serde(default)]
    pub user_reward_managers: Vec<UserRewardManager>,
}

impl AsRef<Obligation> for Obligation {
    fn as_ref(&self) -> &Obligation {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDeposit {
    pub coin_type: CoinType,
    pub symbol: String,
    pub reserve_array_index: u64,
    pub deposited_ctoken_amount: Decimal,
    pub deposited_amount: Decimal,
    pub deposited_amount_usd: Decimal,
    pub user_reward_manager_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBorrow {
    pub coin_type: CoinType,
    pub symbol: String,
    pub reserve_array_index: u64,
    pub borrowed_amount: Decimal,
    pub borrowed_amount_usd: Decimal,
    /// Whether the borrowed reserve is isolated
    pub isolated: bool,
    pub user_reward_manager_index: u64,
}

/// Three-state health of an obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Weighted borrows below the borrow limit
    Healthy,
    /// Past the borrow limit, not yet liquidatable
    AtRisk,
    /// At or past the unhealthy borrow value
    Liquidatable,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::AtRisk => write!(f, "at risk"),
            HealthStatus::Liquidatable => write!(f, "liquidatable"),
        }
    }
}

/// An obligation valued against a reserve snapshot.
///
/// Every aggregate is recomputed from scratch on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedObligation {
    pub id: String,
    pub deposits: Vec<ParsedDeposit>,
    pub borrows: Vec<ParsedBorrow>,

    /// Σ deposit x price
    pub deposited_amount_usd: Decimal,
    /// Σ borrow x price
    pub borrowed_amount_usd: Decimal,
    /// Deposits minus borrows (USD)
    pub net_value_usd: Decimal,
    /// Σ deposit x min_price x open LTV, capped by the global cap
    pub borrow_limit_usd: Decimal,
    /// Σ borrow x price x borrow weight
    pub weighted_borrows_usd: Decimal,
    /// Σ borrow x max_price x borrow weight
    pub max_price_weighted_borrows_usd: Decimal,
    /// Σ deposit x price x close LTV
    pub unhealthy_borrow_value_usd: Decimal,
    /// Σ deposit x price x max close LTV
    pub super_unhealthy_borrow_value_usd: Decimal,

    /// The chain-mirrored obligation this was computed from
    pub source: Obligation,
}

impl AsRef<Obligation> for ParsedObligation {
    fn as_ref(&self) -> &Obligation {
        &self.source
    }
}

impl ParsedObligation {
    /// Weighted borrows as displayed and compared against thresholds.
    ///
    /// Below the limit this is the max-price figure. Once the max-price
    /// figure passes the limit, the current-price figure is shown but never
    /// below the limit itself.
    pub fn display_weighted_borrows_usd(&self) -> Decimal {
        if self.max_price_weighted_borrows_usd > self.borrow_limit_usd {
            self.weighted_borrows_usd.max(self.borrow_limit_usd)
        } else {
            self.max_price_weighted_borrows_usd
        }
    }

    /// True once weighted borrows reach the borrow limit.
    /// An obligation without borrows never passes.
    pub fn passed_borrow_limit(&self) -> bool {
        let weighted = self.display_weighted_borrows_usd();
        weighted > Decimal::ZERO && weighted >= self.borrow_limit_usd
    }

    /// True once weighted borrows reach the unhealthy borrow value
    pub fn passed_liquidation_threshold(&self) -> bool {
        let weighted = self.display_weighted_borrows_usd();
        weighted > Decimal::ZERO && weighted >= self.unhealthy_borrow_value_usd
    }

    pub fn health_status(&self) -> HealthStatus {
        if self.passed_liquidation_threshold() {
            HealthStatus::Liquidatable
        } else if self.passed_borrow_limit() {
            HealthStatus::AtRisk
        } else {
            HealthStatus::Healthy
        }
    }

    /// Weighted borrows as a percent of the borrow limit, zero without a limit
    pub fn borrow_limit_used_percent(&self) -> Decimal {
        percent_of(self.display_weighted_borrows_usd(), self.borrow_limit_usd)
    }

    pub fn deposit_position_count(&self) -> usize {
        self.deposits.len()
    }

    pub fn borrow_position_count(&self) -> usize {
        self.borrows.len()
    }

    pub fn deposit(&self, coin_type: &CoinType) -> Option<&ParsedDeposit> {
        self.deposits.iter().find(|d| &d.coin_type == coin_type)
    }

    pub fn borrow(&self, coin_type: &CoinType) -> Option<&ParsedBorrow> {
        self.borrows.iter().find(|b| &b.coin_type == coin_type)
    }

    pub fn deposit_by_symbol(&self, symbol: &str) -> Option<&ParsedDeposit> {
        self.deposits
            .iter()
            .find(|d| d.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn borrow_by_symbol(&self, symbol: &str) -> Option<&ParsedBorrow> {
        self.borrows
            .iter()
            .find(|b| b.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Token amount deposited in a reserve, zero without a position
    pub fn deposited_amount(&self, coin_type: &CoinType) -> Decimal {
        self.deposit(coin_type)
            .map(|d| d.deposited_amount)
            .unwrap_or_default()
    }

    /// Token amount borrowed from a reserve, zero without a position
    pub fn borrowed_amount(&self, coin_type: &CoinType) -> Decimal {
        self.borrow(coin_type)
            .map(|b| b.borrowed_amount)
            .unwrap_or_default()
    }

    pub fn has_isolated_borrow(&self) -> bool {
        self.borrows.iter().any(|b| b.isolated)
    }

    pub fn user_reward_manager(&self, index: u64) -> Option<&UserRewardManager> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.source.user_reward_managers.get(i))
    }
}

fn lookup<'a>(
    reserves: &'a ReserveMap,
    coin_type: &CoinType,
) -> Result<&'a ParsedReserve, RiskError> {
    reserves
        .get(coin_type)
        .ok_or_else(|| RiskError::ReserveNotFound(coin_type.to_string()))
}

/// Value an obligation against the given reserves.
///
/// Accepts either a raw [`Obligation`] or a previous [`ParsedObligation`];
/// refreshing a refreshed obligation against unchanged reserves yields the
/// same result.
pub fn refresh_obligation(
    obligation: &impl AsRef<Obligation>,
    reserves: &ReserveMap,
    config: &RiskConfig,
) -> Result<ParsedObligation, RiskError> {
    let obligation = obligation.as_ref();

    let mut deposited_amount_usd = Decimal::ZERO;
    let mut borrow_limit_usd = Decimal::ZERO;
    let mut unhealthy_borrow_value_usd = Decimal::ZERO;
    let mut super_unhealthy_borrow_value_usd = Decimal::ZERO;

    let mut deposits = Vec::with_capacity(obligation.deposits.len());
    for deposit in &obligation.deposits {
        let reserve = lookup(reserves, &deposit.coin_type)?;
        let config = &reserve.config;

        let ctokens = Decimal::from(deposit.deposited_ctoken_amount) / pow10(reserve.mint_decimals);
        let amount = ctokens * reserve.ctoken_exchange_rate;
        let amount_usd = amount * reserve.price;

        deposited_amount_usd += amount_usd;
        borrow_limit_usd += amount * reserve.min_price * config.open_ltv();
        unhealthy_borrow_value_usd += amount_usd * config.close_ltv();
        super_unhealthy_borrow_value_usd += amount_usd * config.max_close_ltv();

        deposits.push(ParsedDeposit {
            coin_type: deposit.coin_type.clone(),
            symbol: reserve.symbol.clone(),
            reserve_array_index: deposit.reserve_array_index,
            deposited_ctoken_amount: ctokens,
            deposited_amount: amount,
            deposited_amount_usd: amount_usd,
            user_reward_manager_index: deposit.user_reward_manager_index,
        });
    }

    let mut borrowed_amount_usd = Decimal::ZERO;
    let mut weighted_borrows_usd = Decimal::ZERO;
    let mut max_price_weighted_borrows_usd = Decimal::ZERO;

    let mut borrows = Vec::with_capacity(obligation.borrows.len());
    for borrow in &obligation.borrows {
        let reserve = lookup(reserves, &borrow.coin_type)?;

        let initial = borrow
            .borrowed_amount
            .to_decimal()
            .map_err(RiskError::invalid("borrowed_amount"))?
            / pow10(reserve.mint_decimals);
        let position_rate = borrow
            .cumulative_borrow_rate
            .to_decimal()
            .map_err(RiskError::invalid("cumulative_borrow_rate"))?;
        // accrue interest since the position's last refresh
        let amount = if position_rate.is_zero() {
            initial
        } else {
            initial * reserve.cumulative_borrow_rate / position_rate
        };
        let amount_usd = amount * reserve.price;

        borrowed_amount_usd += amount_usd;
        weighted_borrows_usd += amount_usd * reserve.config.borrow_weight;
        max_price_weighted_borrows_usd += amount * reserve.max_price * reserve.config.borrow_weight;

        borrows.push(ParsedBorrow {
            coin_type: borrow.coin_type.clone(),
            symbol: reserve.symbol.clone(),
            reserve_array_index: borrow.reserve_array_index,
            borrowed_amount: amount,
            borrowed_amount_usd: amount_usd,
            isolated: reserve.config.isolated,
            user_reward_manager_index: borrow.user_reward_manager_index,
        });
    }

    Ok(ParsedObligation {
        id: obligation.id.clone(),
        deposits,
        borrows,
        deposited_amount_usd,
        borrowed_amount_usd,
        net_value_usd: deposited_amount_usd - borrowed_amount_usd,
        borrow_limit_usd: borrow_limit_usd.min(config.borrow_limit_cap_usd),
        weighted_borrows_usd,
        max_price_weighted_borrows_usd,
        unhealthy_borrow_value_usd,
        super_unhealthy_borrow_value_usd,
        source: obligation.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reserve::refresh_reserves;
    use crate::testutils::{ObligationBuilder, ReserveBuilder};
    use rust_decimal_macros::dec;

    fn usdc_sui_market() -> (ReserveMap, crate::Reserve, crate::Reserve) {
        let usdc = ReserveBuilder::new("USDC", 6)
            .array_index(0)
            .available(dec!(1_000_000))
            .build();
        let sui = ReserveBuilder::sui()
            .array_index(1)
            .price(dec!(2))
            .smoothed_price(dec!(2.5))
            .available(dec!(1_000_000))
            .borrow_weight_bps(15_000)
            .build();
        let map = refresh_reserves([&usdc, &sui]).unwrap();
        (map, usdc, sui)
    }

    #[test]
    fn test_empty_obligation_is_healthy() {
        let (reserves, _, _) = usdc_sui_market();
        let obligation = ObligationBuilder::new("empty").build();
        let parsed = refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

        assert_eq!(parsed.deposited_amount_usd, dec!(0));
        assert!(!parsed.passed_borrow_limit());
        assert_eq!(parsed.health_status(), HealthStatus::Healthy);
    }

    #[test]
    fn test_price_bound_asymmetry() {
        let (reserves, usdc, sui) = usdc_sui_market();
        let obligation = ObligationBuilder::new("o")
            .deposit(&sui, dec!(100))
            .borrow(&usdc, dec!(10))
            .borrow(&sui, dec!(10))
            .build();
        let parsed = refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

        // collateral at min price 2: 100 x 2 x 0.8
        assert_eq!(parsed.borrow_limit_usd, dec!(160));
        // current price 2
        assert_eq!(parsed.deposited_amount_usd, dec!(200));
        assert_eq!(parsed.unhealthy_borrow_value_usd, dec!(170));
        // 10 USDC + 10 SUI x 2 x 1.5
        assert_eq!(parsed.weighted_borrows_usd, dec!(40));
        // 10 USDC + 10 SUI x 2.5 x 1.5
        assert_eq!(parsed.max_price_weighted_borrows_usd, dec!(47.5));
        assert_eq!(parsed.borrowed_amount_usd, dec!(30));
        assert_eq!(parsed.net_value_usd, dec!(170));
    }

    #[test]
    fn test_borrow_accrues_interest() {
        let usdc = ReserveBuilder::new("USDC", 6)
            .available(dec!(1000))
            .build();
        let obligation = ObligationBuilder::new("o").borrow(&usdc, dec!(100)).build();

        let accrued = ReserveBuilder::new("USDC", 6)
            .available(dec!(1000))
            .cumulative_borrow_rate(dec!(1.05))
            .build();
        let reserves = refresh_reserves([&accrued]).unwrap();
        let parsed = refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

        assert_eq!(parsed.borrows[0].borrowed_amount, dec!(105));
    }

    #[test]
    fn test_borrow_limit_is_capped() {
        let (reserves, usdc, _) = usdc_sui_market();
        let obligation = ObligationBuilder::new("o")
            .deposit(&usdc, dec!(1000))
            .build();
        let config = RiskConfig {
            borrow_limit_cap_usd: dec!(500),
        };
        let parsed = refresh_obligation(&obligation, &reserves, &config).unwrap();
        assert_eq!(parsed.borrow_limit_usd, dec!(500));
    }

    #[test]
    fn test_missing_reserve_is_an_error() {
        let (reserves, _, _) = usdc_sui_market();
        let weth = ReserveBuilder::new("WETH", 8).build();
        let obligation = ObligationBuilder::new("o").deposit(&weth, dec!(1)).build();

        let result = refresh_obligation(&obligation, &reserves, &RiskConfig::default());
        assert!(matches!(result, Err(RiskError::ReserveNotFound(_))));
    }

    #[test]
    fn test_display_weighted_borrows_clamps_to_limit() {
        let (reserves, usdc, sui) = usdc_sui_market();
        // limit 100 x 0.8 = 80; weighted 20 x 2 x 1.5 = 60; max-price 20 x 2.5 x 1.5 = 75
        let obligation = ObligationBuilder::new("o")
            .deposit(&usdc, dec!(100))
            .borrow(&sui, dec!(20))
            .build();
        let parsed = refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();
        assert_eq!(parsed.display_weighted_borrows_usd(), dec!(75));
        assert!(!parsed.passed_borrow_limit());

        // max-price 24 x 2.5 x 1.5 = 90 > 80, weighted 72 -> shown as the limit
        let obligation = ObligationBuilder::new("o")
            .deposit(&usdc, dec!(100))
            .borrow(&sui, dec!(24))
            .build();
        let parsed = refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();
        assert_eq!(parsed.display_weighted_borrows_usd(), dec!(80));
        assert!(parsed.passed_borrow_limit());
        assert_eq!(parsed.health_status(), HealthStatus::AtRisk);
    }

    #[test]
    fn test_refresh_accepts_parsed_obligation() {
        let (reserves, usdc, sui) = usdc_sui_market();
        let obligation = ObligationBuilder::new("o")
            .deposit(&usdc, dec!(500))
            .borrow(&sui, dec!(30))
            .build();
        let config = RiskConfig::default();

        let once = refresh_obligation(&obligation, &reserves, &config).unwrap();
        let twice = refresh_obligation(&once, &reserves, &config).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_position_lookups() {
        let (reserves, usdc, sui) = usdc_sui_market();
        let obligation = ObligationBuilder::new("o")
            .deposit(&usdc, dec!(500))
            .borrow(&sui, dec!(30))
            .build();
        let parsed = refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

        assert_eq!(parsed.deposited_amount(&usdc.coin_type), dec!(500));
        assert_eq!(parsed.borrowed_amount(&sui.coin_type), dec!(30));
        assert_eq!(parsed.borrowed_amount(&usdc.coin_type), dec!(0));
        assert!(parsed.borrow_by_symbol("sui").is_some());
        assert_eq!(parsed.deposit_position_count(), 1);
        assert!(parsed.user_reward_manager(1).is_some());
        assert!(parsed.user_reward_manager(7).is_none());
    }
}
