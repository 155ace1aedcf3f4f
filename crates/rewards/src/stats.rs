//! Per-reward display rates
//!
//! A reward whose coin is itself a priced reserve is shown as an APR on
//! the USD value of its side. Any other reward (points, unlisted tokens) is
//! shown as tokens per underlying unit per day.

use lendguard_core::decimal::{raw_amount, safe_div, DAYS_PER_YEAR, HUNDRED, MS_PER_YEAR};
use lendguard_core::{CoinMetadata, CoinType};
use lendguard_risk::{ParsedReserve, PoolReward, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Annualized percent of the side's USD value
    Apr,
    /// Reward tokens per underlying token per day
    PerDay,
}

/// Display statistics of one pool reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardStats {
    pub pool_reward_id: String,
    /// Position of the reward in its manager
    pub reward_index: usize,
    /// Reserve the reward is attached to
    pub reserve_coin_type: CoinType,
    pub reward_coin_type: CoinType,
    pub reward_symbol: String,
    pub mint_decimals: u8,
    pub side: Side,
    pub kind: RewardKind,
    /// Price of the reward coin, present only for APR rewards
    pub price: Option<Decimal>,
    /// Total rewards in token units
    pub total_rewards: Decimal,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub is_active: bool,
    /// `None` when the rate is undefined (no shares, no value, empty window)
    pub apr_percent: Option<Decimal>,
    /// `None` when the rate is undefined (no shares, no amount, empty window)
    pub per_day: Option<Decimal>,
}

impl RewardStats {
    /// The rate matching this reward's kind
    pub fn rate(&self) -> Option<Decimal> {
        match self.kind {
            RewardKind::Apr => self.apr_percent,
            RewardKind::PerDay => self.per_day,
        }
    }
}

/// Rewards distributed per year at the reward's current pace.
/// `None` for an empty window or when the result overflows.
fn annualized(total_rewards: Decimal, window_ms: u64) -> Option<Decimal> {
    safe_div(MS_PER_YEAR, Decimal::from(window_ms))?.checked_mul(total_rewards)
}

/// `total x price x (msPerYear / window) / sideUsd x 100`
pub fn apr_percent(
    total_rewards: Decimal,
    reward_price: Decimal,
    window_ms: u64,
    side_amount_usd: Decimal,
) -> Option<Decimal> {
    let yearly_usd = annualized(total_rewards, window_ms)?.checked_mul(reward_price)?;
    safe_div(yearly_usd, side_amount_usd)?.checked_mul(HUNDRED)
}

/// `total x (msPerYear / window) / 365 / sideAmount`
pub fn per_day(total_rewards: Decimal, window_ms: u64, side_amount: Decimal) -> Option<Decimal> {
    let yearly = annualized(total_rewards, window_ms)?;
    safe_div(yearly / DAYS_PER_YEAR, side_amount)
}

/// Compute display statistics for one pool reward.
///
/// `reward_reserve` is the reserve of the reward coin, if one exists; its
/// presence selects the APR flavour.
pub fn reward_stats(
    reserve: &ParsedReserve,
    side: Side,
    reward_index: usize,
    reward: &PoolReward,
    metadata: &CoinMetadata,
    reward_reserve: Option<&ParsedReserve>,
    now_ms: u64,
) -> RewardStats {
    let total_rewards = raw_amount(reward.total_rewards, metadata.decimals);
    let window_ms = reward.duration_ms();
    let has_shares = reserve.pool_reward_manager(side).total_shares > 0;

    let (kind, price, apr_percent, per_day) = match reward_reserve {
        Some(reward_reserve) => {
            let apr = has_shares
                .then(|| {
                    apr_percent(
                        total_rewards,
                        reward_reserve.price,
                        window_ms,
                        reserve.side_amount_usd(side),
                    )
                })
                .flatten();
            (RewardKind::Apr, Some(reward_reserve.price), apr, None)
        }
        None => {
            let rate = has_shares
                .then(|| per_day(total_rewards, window_ms, reserve.side_amount(side)))
                .flatten();
            (RewardKind::PerDay, None, None, rate)
        }
    };

    RewardStats {
        pool_reward_id: reward.id.clone(),
        reward_index,
        reserve_coin_type: reserve.coin_type.clone(),
        reward_coin_type: reward.coin_type.clone(),
        reward_symbol: metadata.symbol.clone(),
        mint_decimals: metadata.decimals,
        side,
        kind,
        price,
        total_rewards,
        start_time_ms: reward.start_time_ms,
        end_time_ms: reward.end_time_ms,
        is_active: reward.is_active(now_ms),
        apr_percent,
        per_day,
    }
}
