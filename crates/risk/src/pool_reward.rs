//! Liquidity-mining bookkeeping mirrored from chain
//!
//! A reserve owns two pool reward managers (deposit side and borrow side).
//! An obligation owns one user reward manager per pool reward manager it
//! participates in. Accrual happens on chain; these types only carry the
//! authoritative counters.

use lendguard_core::{CoinType, Wad};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of a reserve a reward manager tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Deposit,
    Borrow,
}

impl Side {
    /// Sign applied when a reward rate is combined into a net APR.
    /// Deposit rewards add yield; borrow rewards offset borrow cost.
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Deposit => Decimal::ONE,
            Side::Borrow => Decimal::NEGATIVE_ONE,
        }
    }
}

/// A single incentive program on one side of a reserve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReward {
    pub id: String,
    pub coin_type: CoinType,
    /// Total rewards to distribute, raw mint units
    pub total_rewards: u64,
    #[serde(default)]
    pub allocated_rewards: Wad,
    #[serde(default)]
    pub cumulative_rewards_per_share: Wad,
    #[serde(default)]
    pub num_user_reward_managers: u64,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
}

impl PoolReward {
    /// Active iff `start <= now < end`
    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms >= self.start_time_ms && now_ms < self.end_time_ms
    }

    /// Length of the distribution window
    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }
}

/// Reward programs of one reserve side and the shares outstanding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRewardManager {
    pub id: String,
    pub total_shares: u64,
    /// Slots are positional: a reward's index is its position here.
    /// Closed programs leave an empty slot.
    #[serde(default)]
    pub pool_rewards: Vec<Option<PoolReward>>,
    #[serde(default)]
    pub last_update_time_ms: u64,
}

impl PoolRewardManager {
    /// Occupied slots with their reward index
    pub fn rewards(&self) -> impl Iterator<Item = (usize, &PoolReward)> {
        self.pool_rewards
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|reward| (index, reward)))
    }
}

/// Per-user accrual counter for one pool reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReward {
    pub pool_reward_id: String,
    /// Earned but unclaimed rewards, WAD-scaled raw mint units
    pub earned_rewards: Wad,
    #[serde(default)]
    pub cumulative_rewards_per_share: Wad,
}

/// An obligation's stake in one pool reward manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRewardManager {
    pub pool_reward_manager_id: String,
    pub share: u64,
    /// Parallel to `PoolRewardManager::pool_rewards`
    #[serde(default)]
    pub rewards: Vec<Option<UserReward>>,
    #[serde(default)]
    pub last_update_time_ms: u64,
}

impl UserRewardManager {
    pub fn reward(&self, reward_index: usize) -> Option<&UserReward> {
        self.rewards.get(reward_index).and_then(Option::as_ref)
    }
}
