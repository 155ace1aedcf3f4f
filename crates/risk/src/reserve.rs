//! Reserve Valuation
//!
//! Converts a reserve as mirrored from chain (raw integer and WAD fields)
//! into token-unit and USD figures, price bounds and rates.
//!
//! Two prices exist for every reserve:
//! - `price` is the current oracle price, used for display values.
//! - `min_price` / `max_price` bound the oracle's recent range and are used
//!   for every risk computation. Collateral is valued at `min_price`, debt
//!   at `max_price`.

use lendguard_core::decimal::{from_bps, from_percent, pow10, raw_amount, safe_div};
use lendguard_core::{CoinType, Wad};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RiskError;
use crate::interest::{deposit_apr_percent, utilization_percent, InterestRateCurve};
use crate::pool_reward::{PoolRewardManager, Side};

/// Admin-set reserve configuration, raw on-chain units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveConfig {
    pub open_ltv_pct: u8,
    pub close_ltv_pct: u8,
    pub max_close_ltv_pct: u8,
    pub borrow_weight_bps: u64,
    /// Raw mint units
    pub deposit_limit: u64,
    /// Raw mint units
    pub borrow_limit: u64,
    pub deposit_limit_usd: u64,
    pub borrow_limit_usd: u64,
    pub liquidation_bonus_bps: u64,
    pub max_liquidation_bonus_bps: u64,
    pub borrow_fee_bps: u64,
    pub spread_fee_bps: u64,
    pub protocol_liquidation_fee_bps: u64,
    #[serde(default)]
    pub isolated: bool,
    #[serde(default)]
    pub open_attributed_borrow_limit_usd: u64,
    #[serde(default)]
    pub close_attributed_borrow_limit_usd: u64,
    pub interest_rate: InterestRateCurve,
}

/// A reserve as mirrored from chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    pub array_index: u64,
    pub coin_type: CoinType,
    pub symbol: String,
    pub mint_decimals: u8,
    pub config: ReserveConfig,
    pub price: Wad,
    pub smoothed_price: Wad,
    #[serde(default)]
    pub price_last_update_timestamp_s: u64,
    /// Raw mint units
    pub available_amount: u64,
    /// Raw c-token units
    pub ctoken_supply: u64,
    /// WAD-scaled raw mint units
    pub borrowed_amount: Wad,
    pub cumulative_borrow_rate: Wad,
    #[serde(default)]
    pub unclaimed_spread_fees: Wad,
    #[serde(default)]
    pub deposits_pool_reward_manager: PoolRewardManager,
    #[serde(default)]
    pub borrows_pool_reward_manager: PoolRewardManager,
}

/// Reserve configuration in token units and fractions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReserveConfig {
    pub open_ltv_pct: Decimal,
    pub close_ltv_pct: Decimal,
    pub max_close_ltv_pct: Decimal,
    /// Multiplier (`1.5` for 15_000 bps)
    pub borrow_weight: Decimal,
    pub deposit_limit: Decimal,
    pub borrow_limit: Decimal,
    pub deposit_limit_usd: Decimal,
    pub borrow_limit_usd: Decimal,
    pub liquidation_bonus_bps: u64,
    pub max_liquidation_bonus_bps: u64,
    pub borrow_fee_bps: u64,
    pub spread_fee_bps: u64,
    pub protocol_liquidation_fee_bps: u64,
    pub isolated: bool,
    pub open_attributed_borrow_limit_usd: Decimal,
    pub close_attributed_borrow_limit_usd: Decimal,
    pub interest_rate: InterestRateCurve,
}

impl ParsedReserveConfig {
    fn parse(config: &ReserveConfig, mint_decimals: u8) -> Self {
        Self {
            open_ltv_pct: Decimal::from(config.open_ltv_pct),
            close_ltv_pct: Decimal::from(config.close_ltv_pct),
            max_close_ltv_pct: Decimal::from(config.max_close_ltv_pct),
            borrow_weight: from_bps(config.borrow_weight_bps),
            deposit_limit: raw_amount(config.deposit_limit, mint_decimals),
            borrow_limit: raw_amount(config.borrow_limit, mint_decimals),
            deposit_limit_usd: Decimal::from(config.deposit_limit_usd),
            borrow_limit_usd: Decimal::from(config.borrow_limit_usd),
            liquidation_bonus_bps: config.liquidation_bonus_bps,
            max_liquidation_bonus_bps: config.max_liquidation_bonus_bps,
            borrow_fee_bps: config.borrow_fee_bps,
            spread_fee_bps: config.spread_fee_bps,
            protocol_liquidation_fee_bps: config.protocol_liquidation_fee_bps,
            isolated: config.isolated,
            open_attributed_borrow_limit_usd: Decimal::from(
                config.open_attributed_borrow_limit_usd,
            ),
            close_attributed_borrow_limit_usd: Decimal::from(
                config.close_attributed_borrow_limit_usd,
            ),
            interest_rate: config.interest_rate.clone(),
        }
    }

    /// Open LTV as a fraction
    pub fn open_ltv(&self) -> Decimal {
        from_percent(self.open_ltv_pct)
    }

    /// Close LTV as a fraction
    pub fn close_ltv(&self) -> Decimal {
        from_percent(self.close_ltv_pct)
    }

    /// Max close LTV as a fraction
    pub fn max_close_ltv(&self) -> Decimal {
        from_percent(self.max_close_ltv_pct)
    }

    /// Borrow fee as a fraction
    pub fn borrow_fee(&self) -> Decimal {
        from_bps(self.borrow_fee_bps)
    }
}

/// A reserve valued against current prices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReserve {
    pub array_index: u64,
    pub coin_type: CoinType,
    pub symbol: String,
    pub mint_decimals: u8,
    pub config: ParsedReserveConfig,

    pub price: Decimal,
    pub smoothed_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,

    pub available_amount: Decimal,
    pub available_amount_usd: Decimal,
    pub borrowed_amount: Decimal,
    pub borrowed_amount_usd: Decimal,
    pub deposited_amount: Decimal,
    pub deposited_amount_usd: Decimal,

    pub ctoken_supply: Decimal,
    pub ctoken_exchange_rate: Decimal,
    pub cumulative_borrow_rate: Decimal,
    pub unclaimed_spread_fees: Decimal,

    pub utilization_percent: Decimal,
    pub borrow_apr_percent: Decimal,
    pub deposit_apr_percent: Decimal,

    pub deposits_pool_reward_manager: PoolRewardManager,
    pub borrows_pool_reward_manager: PoolRewardManager,
}

impl ParsedReserve {
    /// Returns true if this reserve holds the native gas token
    pub fn is_native_gas(&self) -> bool {
        self.coin_type.is_sui()
    }

    pub fn pool_reward_manager(&self, side: Side) -> &PoolRewardManager {
        match side {
            Side::Deposit => &self.deposits_pool_reward_manager,
            Side::Borrow => &self.borrows_pool_reward_manager,
        }
    }

    /// Total supplied (token units) on the given side
    pub fn side_amount(&self, side: Side) -> Decimal {
        match side {
            Side::Deposit => self.deposited_amount,
            Side::Borrow => self.borrowed_amount,
        }
    }

    /// Total supplied (USD, current price) on the given side
    pub fn side_amount_usd(&self, side: Side) -> Decimal {
        match side {
            Side::Deposit => self.deposited_amount_usd,
            Side::Borrow => self.borrowed_amount_usd,
        }
    }

    /// Total deposits valued at the upper price bound, as the deposit USD limit checks them
    pub fn deposited_amount_usd_upper_bound(&self) -> Decimal {
        self.deposited_amount * self.max_price
    }

    /// Total borrows valued at the upper price bound, as the borrow USD limit checks them
    pub fn borrowed_amount_usd_upper_bound(&self) -> Decimal {
        self.borrowed_amount * self.max_price
    }

    pub fn deposit_limit_reached(&self) -> bool {
        self.deposited_amount >= self.config.deposit_limit
    }

    pub fn deposit_limit_usd_reached(&self) -> bool {
        self.deposited_amount_usd_upper_bound() >= self.config.deposit_limit_usd
    }

    pub fn borrow_limit_reached(&self) -> bool {
        self.borrowed_amount >= self.config.borrow_limit
    }

    pub fn borrow_limit_usd_reached(&self) -> bool {
        self.borrowed_amount_usd_upper_bound() >= self.config.borrow_limit_usd
    }
}

/// Parsed reserves keyed by coin type
pub type ReserveMap = BTreeMap<CoinType, ParsedReserve>;

/// Value a reserve against its current prices.
///
/// Pure: the same input always produces the same output.
pub fn refresh_reserve(reserve: &Reserve) -> Result<ParsedReserve, RiskError> {
    let decimals = reserve.mint_decimals;

    let price = reserve
        .price
        .to_decimal()
        .map_err(RiskError::invalid("price"))?;
    let smoothed_price = reserve
        .smoothed_price
        .to_decimal()
        .map_err(RiskError::invalid("smoothed_price"))?;
    let min_price = price.min(smoothed_price);
    let max_price = price.max(smoothed_price);

    let available_amount = raw_amount(reserve.available_amount, decimals);
    let borrowed_amount = reserve
        .borrowed_amount
        .to_decimal()
        .map_err(RiskError::invalid("borrowed_amount"))?
        / pow10(decimals);
    let deposited_amount = available_amount + borrowed_amount;

    let ctoken_supply = raw_amount(reserve.ctoken_supply, decimals);
    let ctoken_exchange_rate = safe_div(deposited_amount, ctoken_supply).unwrap_or(Decimal::ONE);

    let cumulative_borrow_rate = reserve
        .cumulative_borrow_rate
        .to_decimal()
        .map_err(RiskError::invalid("cumulative_borrow_rate"))?;
    let unclaimed_spread_fees = reserve
        .unclaimed_spread_fees
        .to_decimal()
        .map_err(RiskError::invalid("unclaimed_spread_fees"))?
        / pow10(decimals);

    let config = ParsedReserveConfig::parse(&reserve.config, decimals);
    let utilization_percent = utilization_percent(borrowed_amount, deposited_amount);
    let borrow_apr_percent = config.interest_rate.borrow_apr_percent(utilization_percent);
    let deposit_apr_percent =
        deposit_apr_percent(utilization_percent, borrow_apr_percent, config.spread_fee_bps);

    Ok(ParsedReserve {
        array_index: reserve.array_index,
        coin_type: reserve.coin_type.clone(),
        symbol: reserve.symbol.clone(),
        mint_decimals: decimals,
        config,
        price,
        smoothed_price,
        min_price,
        max_price,
        available_amount,
        available_amount_usd: available_amount * price,
        borrowed_amount,
        borrowed_amount_usd: borrowed_amount * price,
        deposited_amount,
        deposited_amount_usd: deposited_amount * price,
        ctoken_supply,
        ctoken_exchange_rate,
        cumulative_borrow_rate,
        unclaimed_spread_fees,
        utilization_percent,
        borrow_apr_percent,
        deposit_apr_percent,
        deposits_pool_reward_manager: reserve.deposits_pool_reward_manager.clone(),
        borrows_pool_reward_manager: reserve.borrows_pool_reward_manager.clone(),
    })
}

/// Value every reserve of a market
pub fn refresh_reserves<'a>(
    reserves: impl IntoIterator<Item = &'a Reserve>,
) -> Result<ReserveMap, RiskError> {
    reserves
        .into_iter()
        .map(|reserve| refresh_reserve(reserve).map(|parsed| (parsed.coin_type.clone(), parsed)))
        .collect()
}

/// Find a parsed reserve by display symbol (case-insensitive)
pub fn find_by_symbol<'a>(reserves: &'a ReserveMap, symbol: &str) -> Option<&'a ParsedReserve> {
    reserves
        .values()
        .find(|reserve| reserve.symbol.eq_ignore_ascii_case(symbol))
}
