//! Liquidation planning
//!
//! Builds the client side of a liquidation: which wallet coin repays the
//! debt, how much native gas to hold back, and where the seized collateral
//! goes. The maximum liquidatable amount is enforced on chain; the estimate
//! here is informational.

use lendguard_core::decimal::{from_bps, safe_div};
use lendguard_core::CoinType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::obligation::ParsedObligation;
use crate::reserve::{find_by_symbol, ParsedReserve, ReserveMap};

/// Liquidation planning errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiquidationError {
    #[error("Obligation {0} is not liquidatable")]
    NotLiquidatable(String),

    #[error("Obligation does not borrow {0}")]
    RepayAssetNotBorrowed(String),

    #[error("Obligation does not deposit {0}")]
    WithdrawAssetNotDeposited(String),

    #[error("Reserve not found for {0}")]
    ReserveNotFound(String),

    #[error("Wallet holds no {0} coin to repay with")]
    NoRepayCoin(String),

    #[error("Insufficient SUI for gas: reserve {required}, have {available}")]
    InsufficientGas {
        required: Decimal,
        available: Decimal,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Configuration for the liquidation planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationConfig {
    /// SUI held back for gas when SUI is repaid or received (token units)
    #[serde(default = "default_native_gas_reserve")]
    pub native_gas_reserve: Decimal,
}

fn default_native_gas_reserve() -> Decimal {
    Decimal::ONE
}

impl Default for LiquidationConfig {
    fn default() -> Self {
        Self {
            native_gas_reserve: default_native_gas_reserve(),
        }
    }
}

impl LiquidationConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, LiquidationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LiquidationError::ConfigError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| LiquidationError::ConfigError(format!("{}: {}", path.display(), e)))
    }
}

/// A coin object held by the liquidator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletCoin {
    pub object_id: String,
    pub coin_type: CoinType,
    /// Token units
    pub balance: Decimal,
}

/// One step of the liquidation transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiquidationStep {
    /// Split the repay amount off a SUI coin, leaving the gas reserve behind
    SplitGas { coin_id: String, amount: Decimal },
    /// Repay debt and seize collateral
    Liquidate {
        obligation_id: String,
        repay_coin_type: CoinType,
        withdraw_coin_type: CoinType,
        repay_amount: Decimal,
    },
    /// Send seized collateral to the liquidator
    TransferWithdrawn {
        coin_type: CoinType,
        recipient: String,
    },
    /// Return the unused remainder of the split SUI coin
    TransferLeftoverGas { recipient: String },
}

/// Informational sizing of a liquidation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationEstimate {
    /// Repay amount after capping at the borrow position
    pub repay_amount: Decimal,
    pub repay_amount_usd: Decimal,
    /// Liquidator bonus as a fraction
    pub bonus: Decimal,
    /// Protocol fee as a fraction
    pub protocol_fee: Decimal,
    /// Collateral seized, capped at the deposit position
    pub withdraw_amount: Decimal,
    pub withdraw_amount_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationPlan {
    pub obligation_id: String,
    pub repay_coin: WalletCoin,
    /// Amount offered for repayment (token units)
    pub repay_amount: Decimal,
    pub steps: Vec<LiquidationStep>,
    pub estimate: LiquidationEstimate,
}

/// Liquidation planner
#[derive(Debug)]
pub struct LiquidationPlanner {
    config: LiquidationConfig,
}

impl Default for LiquidationPlanner {
    fn default() -> Self {
        Self::new(LiquidationConfig::default())
    }
}

impl LiquidationPlanner {
    /// Create a new liquidation planner
    pub fn new(config: LiquidationConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &LiquidationConfig {
        &self.config
    }

    /// Plan a liquidation of `obligation`, repaying `repay_symbol` and
    /// seizing `withdraw_symbol`.
    pub fn plan(
        &self,
        obligation: &ParsedObligation,
        reserves: &ReserveMap,
        repay_symbol: &str,
        withdraw_symbol: &str,
        wallet_coins: &[WalletCoin],
        liquidator: &str,
    ) -> Result<LiquidationPlan, LiquidationError> {
        if !obligation.passed_liquidation_threshold() {
            return Err(LiquidationError::NotLiquidatable(obligation.id.clone()));
        }
        let borrow = obligation
            .borrow_by_symbol(repay_symbol)
            .ok_or_else(|| LiquidationError::RepayAssetNotBorrowed(repay_symbol.to_string()))?;
        let deposit = obligation.deposit_by_symbol(withdraw_symbol).ok_or_else(|| {
            LiquidationError::WithdrawAssetNotDeposited(withdraw_symbol.to_string())
        })?;
        let repay_reserve = find_by_symbol(reserves, repay_symbol)
            .ok_or_else(|| LiquidationError::ReserveNotFound(repay_symbol.to_string()))?;
        let withdraw_reserve = find_by_symbol(reserves, withdraw_symbol)
            .ok_or_else(|| LiquidationError::ReserveNotFound(withdraw_symbol.to_string()))?;

        let repay_coin = largest_coin(wallet_coins, &borrow.coin_type)
            .ok_or_else(|| LiquidationError::NoRepayCoin(repay_symbol.to_string()))?;
        let gas_reserve = self.config.native_gas_reserve;

        let mut steps = Vec::with_capacity(4);
        let repay_amount = if borrow.coin_type.is_sui() {
            if repay_coin.balance <= gas_reserve {
                return Err(LiquidationError::InsufficientGas {
                    required: gas_reserve,
                    available: repay_coin.balance,
                });
            }
            let amount = repay_coin.balance - gas_reserve;
            steps.push(LiquidationStep::SplitGas {
                coin_id: repay_coin.object_id.clone(),
                amount,
            });
            amount
        } else {
            if deposit.coin_type.is_sui() {
                let gas = largest_coin(wallet_coins, &CoinType::sui())
                    .map(|c| c.balance)
                    .unwrap_or_default();
                if gas < gas_reserve {
                    return Err(LiquidationError::InsufficientGas {
                        required: gas_reserve,
                        available: gas,
                    });
                }
            }
            repay_coin.balance
        };

        steps.push(LiquidationStep::Liquidate {
            obligation_id: obligation.id.clone(),
            repay_coin_type: borrow.coin_type.clone(),
            withdraw_coin_type: deposit.coin_type.clone(),
            repay_amount,
        });
        steps.push(LiquidationStep::TransferWithdrawn {
            coin_type: deposit.coin_type.clone(),
            recipient: liquidator.to_string(),
        });
        if borrow.coin_type.is_sui() {
            steps.push(LiquidationStep::TransferLeftoverGas {
                recipient: liquidator.to_string(),
            });
        }

        let estimate = estimate(
            obligation,
            repay_reserve,
            withdraw_reserve,
            repay_amount.min(borrow.borrowed_amount),
            deposit.deposited_amount,
        );

        tracing::info!(
            obligation = %obligation.id,
            repay = %repay_symbol,
            withdraw = %withdraw_symbol,
            repay_amount = %repay_amount,
            steps = steps.len(),
            "planned liquidation"
        );

        Ok(LiquidationPlan {
            obligation_id: obligation.id.clone(),
            repay_coin: repay_coin.clone(),
            repay_amount,
            steps,
            estimate,
        })
    }
}

fn largest_coin<'a>(coins: &'a [WalletCoin], coin_type: &CoinType) -> Option<&'a WalletCoin> {
    coins
        .iter()
        .filter(|c| &c.coin_type == coin_type)
        .max_by(|a, b| a.balance.cmp(&b.balance))
}

/// Bonus scales from the base to the max bonus as weighted borrows move
/// from the unhealthy value to the super-unhealthy value.
fn liquidation_bonus(obligation: &ParsedObligation, withdraw_reserve: &ParsedReserve) -> Decimal {
    let base = from_bps(withdraw_reserve.config.liquidation_bonus_bps);
    let max = from_bps(withdraw_reserve.config.max_liquidation_bonus_bps);

    let progress = safe_div(
        obligation.weighted_borrows_usd - obligation.unhealthy_borrow_value_usd,
        obligation.super_unhealthy_borrow_value_usd - obligation.unhealthy_borrow_value_usd,
    )
    .unwrap_or(Decimal::ONE)
    .clamp(Decimal::ZERO, Decimal::ONE);

    base + (max - base).max(Decimal::ZERO) * progress
}

fn estimate(
    obligation: &ParsedObligation,
    repay_reserve: &ParsedReserve,
    withdraw_reserve: &ParsedReserve,
    repay_amount: Decimal,
    deposited_amount: Decimal,
) -> LiquidationEstimate {
    let bonus = liquidation_bonus(obligation, withdraw_reserve);
    let protocol_fee = from_bps(withdraw_reserve.config.protocol_liquidation_fee_bps);

    let repay_amount_usd = repay_amount * repay_reserve.price;
    let seized_usd = repay_amount_usd * (Decimal::ONE + bonus + protocol_fee);
    let withdraw_amount = safe_div(seized_usd, withdraw_reserve.price)
        .unwrap_or(Decimal::ZERO)
        .min(deposited_amount);

    LiquidationEstimate {
        repay_amount,
        repay_amount_usd,
        bonus,
        protocol_fee,
        withdraw_amount,
        withdraw_amount_usd: withdraw_amount * withdraw_reserve.price,
    }
}
