//! Reward map construction
//!
//! Walks every reserve's deposit-side and borrow-side reward managers and
//! produces display statistics plus each obligation's unclaimed balance.
//! Accrual is never simulated: claims come straight from the chain's
//! `earned_rewards` counters.

use lendguard_core::decimal::{dust_threshold, pow10};
use lendguard_core::{CoinMetadata, CoinType};
use lendguard_risk::{ParsedObligation, ParsedReserve, PoolReward, ReserveMap, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::stats::{reward_stats, RewardStats};

/// Coin metadata keyed by coin type
pub type CoinMetadataMap = BTreeMap<CoinType, CoinMetadata>;

/// An obligation's unclaimed balance of one reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationClaim {
    /// Token units
    pub claimable_amount: Decimal,
    pub reserve_array_index: u64,
}

/// One pool reward with per-obligation claims keyed by obligation id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    pub stats: RewardStats,
    pub obligation_claims: BTreeMap<String, ObligationClaim>,
}

impl RewardSummary {
    /// True when `obligation_id` has more than dust to claim
    pub fn has_claimable(&self, obligation_id: &str) -> bool {
        let dust = dust_threshold(self.stats.mint_decimals);
        self.obligation_claims
            .get(obligation_id)
            .is_some_and(|claim| claim.claimable_amount >= dust)
    }
}

/// Reward summaries of one reserve, by side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideRewards {
    pub deposit: Vec<RewardSummary>,
    pub borrow: Vec<RewardSummary>,
}

impl SideRewards {
    pub fn side(&self, side: Side) -> &[RewardSummary] {
        match side {
            Side::Deposit => &self.deposit,
            Side::Borrow => &self.borrow,
        }
    }
}

/// Reward summaries keyed by reserve coin type
pub type RewardMap = BTreeMap<CoinType, SideRewards>;

/// Build the reward map for every reserve.
///
/// Rewards whose coin has no metadata cannot be scaled and are skipped.
pub fn format_rewards(
    reserves: &ReserveMap,
    coin_metadata: &CoinMetadataMap,
    obligations: &[ParsedObligation],
    now_ms: u64,
) -> RewardMap {
    reserves
        .iter()
        .map(|(coin_type, reserve)| {
            let summaries = |side| {
                side_rewards(reserve, side, reserves, coin_metadata, obligations, now_ms)
            };
            let rewards = SideRewards {
                deposit: summaries(Side::Deposit),
                borrow: summaries(Side::Borrow),
            };
            (coin_type.clone(), rewards)
        })
        .collect()
}

fn side_rewards(
    reserve: &ParsedReserve,
    side: Side,
    reserves: &ReserveMap,
    coin_metadata: &CoinMetadataMap,
    obligations: &[ParsedObligation],
    now_ms: u64,
) -> Vec<RewardSummary> {
    reserve
        .pool_reward_manager(side)
        .rewards()
        .filter_map(|(index, reward)| {
            let Some(metadata) = coin_metadata.get(&reward.coin_type) else {
                tracing::debug!(
                    reserve = %reserve.symbol,
                    reward = %reward.coin_type,
                    "skipping reward without coin metadata"
                );
                return None;
            };

            // A reward coin that is itself a listed reserve is priced as APR
            let reward_reserve = reserves.get(&reward.coin_type);
            if reward_reserve.is_none() {
                tracing::debug!(
                    reserve = %reserve.symbol,
                    reward = %metadata.symbol,
                    "unpriced reward shown per day"
                );
            }

            let stats =
                reward_stats(reserve, side, index, reward, metadata, reward_reserve, now_ms);
            let obligation_claims = obligations
                .iter()
                .filter_map(|obligation| {
                    claim(obligation, reserve, side, index, reward, metadata.decimals)
                        .map(|claim| (obligation.id.clone(), claim))
                })
                .collect();

            Some(RewardSummary {
                stats,
                obligation_claims,
            })
        })
        .collect()
}

/// Unclaimed balance of `obligation` for the reward at `index`.
///
/// `None` when the obligation has no position on this side, no user
/// reward manager for it, or no slot for this reward.
fn claim(
    obligation: &ParsedObligation,
    reserve: &ParsedReserve,
    side: Side,
    index: usize,
    reward: &PoolReward,
    mint_decimals: u8,
) -> Option<ObligationClaim> {
    let manager_index = match side {
        Side::Deposit => obligation.deposit(&reserve.coin_type)?.user_reward_manager_index,
        Side::Borrow => obligation.borrow(&reserve.coin_type)?.user_reward_manager_index,
    };
    let user_manager = obligation.user_reward_manager(manager_index)?;
    if user_manager.pool_reward_manager_id != reserve.pool_reward_manager(side).id {
        return None;
    }
    let user_reward = user_manager.reward(index)?;
    if user_reward.pool_reward_id != reward.id {
        return None;
    }

    // earned_rewards is WAD-scaled raw units; decoding removes the WAD
    let earned = user_reward.earned_rewards.to_decimal().ok()?;
    Some(ObligationClaim {
        claimable_amount: earned / pow10(mint_decimals),
        reserve_array_index: reserve.array_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendguard_risk::testutils::{pool_reward, ObligationBuilder, ReserveBuilder};
    use lendguard_risk::{refresh_obligation, refresh_reserves, PoolRewardManager, RiskConfig};
    use rust_decimal_macros::dec;

    const YEAR_MS: u64 = 31_536_000_000;

    fn metadata(symbol: &str, decimals: u8) -> CoinMetadata {
        CoinMetadata {
            decimals,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            icon_url: None,
        }
    }

    struct Fixture {
        reserves: ReserveMap,
        metadata: CoinMetadataMap,
        obligation: ParsedObligation,
    }

    /// USDC reserve ($10_000 deposited) paying SUI (priced) and POINTS
    /// (unpriced) to depositors over one year
    fn fixture() -> Fixture {
        let points = lendguard_risk::testutils::coin_type_for("POINTS");
        let manager = PoolRewardManager {
            id: "usdc-deposits".to_string(),
            total_shares: 10_000_000_000,
            pool_rewards: vec![
                Some(pool_reward("sui-reward", CoinType::sui(), 500_000_000_000, 0, YEAR_MS)),
                None,
                Some(pool_reward("points", points.clone(), 3_650_000, 0, YEAR_MS)),
            ],
            last_update_time_ms: 0,
        };
        let usdc = ReserveBuilder::new("USDC", 6)
            .available(dec!(10_000))
            .deposits_pool_reward_manager(manager)
            .build();
        let sui = ReserveBuilder::sui().array_index(1).price(dec!(2)).build();
        let reserves = refresh_reserves([&usdc, &sui]).unwrap();

        let obligation = ObligationBuilder::new("alice")
            .deposit(&usdc, dec!(1000))
            .earned("usdc-deposits", 0, "sui-reward", dec!(2_500_000_000))
            .earned("usdc-deposits", 2, "points", dec!(0.5))
            .build();
        let obligation =
            refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

        let metadata = CoinMetadataMap::from([
            (CoinType::sui(), metadata("SUI", 9)),
            (points, metadata("POINTS", 3)),
        ]);
        Fixture {
            reserves,
            metadata,
            obligation,
        }
    }

    #[test]
    fn test_apr_and_per_day_flavours() {
        let f = fixture();
        let map = format_rewards(&f.reserves, &f.metadata, &[f.obligation], 1_000);
        let usdc = &map[&lendguard_risk::testutils::coin_type_for("USDC")];

        assert_eq!(usdc.deposit.len(), 2);
        assert!(usdc.borrow.is_empty());

        // 500 SUI x $2 over a year on $10_000 -> 10%
        let sui = &usdc.deposit[0].stats;
        assert_eq!(sui.kind, crate::RewardKind::Apr);
        assert_eq!(sui.apr_percent, Some(dec!(10)));
        assert!(sui.is_active);

        // 3650 points over a year on 10_000 USDC -> 0.001 per USDC per day
        let points = &usdc.deposit[1].stats;
        assert_eq!(points.kind, crate::RewardKind::PerDay);
        assert_eq!(points.reward_index, 2);
        assert_eq!(points.per_day, Some(dec!(0.001)));
    }

    #[test]
    fn test_claims_scale_and_suppress_dust() {
        let f = fixture();
        let map = format_rewards(&f.reserves, &f.metadata, &[f.obligation], 1_000);
        let usdc = &map[&lendguard_risk::testutils::coin_type_for("USDC")];

        let sui = &usdc.deposit[0];
        assert_eq!(sui.obligation_claims["alice"].claimable_amount, dec!(2.5));
        assert!(sui.has_claimable("alice"));
        assert!(!sui.has_claimable("bob"));

        // 0.5 raw units of a 3-decimal coin is below 0.001
        let points = &usdc.deposit[1];
        assert_eq!(points.obligation_claims["alice"].claimable_amount, dec!(0.0005));
        assert!(!points.has_claimable("alice"));
    }

    #[test]
    fn test_missing_metadata_is_skipped() {
        let mut f = fixture();
        f.metadata.remove(&CoinType::sui());
        let map = format_rewards(&f.reserves, &f.metadata, &[], 1_000);
        let usdc = &map[&lendguard_risk::testutils::coin_type_for("USDC")];
        assert_eq!(usdc.deposit.len(), 1);
        assert_eq!(usdc.deposit[0].stats.reward_symbol, "POINTS");
    }

    #[test]
    fn test_inactive_after_end() {
        let f = fixture();
        let map = format_rewards(&f.reserves, &f.metadata, &[], YEAR_MS);
        let usdc = &map[&lendguard_risk::testutils::coin_type_for("USDC")];
        assert!(usdc.deposit.iter().all(|r| !r.stats.is_active));
    }
}
