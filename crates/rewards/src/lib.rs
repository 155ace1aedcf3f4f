//! Lendguard Rewards
//!
//! Liquidity-mining reward aggregation over a valued market:
//! - [`stats`] - APR and per-day display rates for one pool reward
//! - [`format`] - the per-reserve, per-side reward map with obligation claims
//! - [`aggregate`] - same-coin de-duplication, total/net APR, claimable sums

pub mod aggregate;
pub mod format;
pub mod stats;

pub use aggregate::{
    claimable_rewards, dedup_apr_rewards, dedup_per_day_rewards, net_apr_percent,
    total_apr_percent, AggregatedReward,
};
pub use format::{
    format_rewards, CoinMetadataMap, ObligationClaim, RewardMap, RewardSummary, SideRewards,
};
pub use stats::{RewardKind, RewardStats};
