//! Reward aggregation
//!
//! Several active rewards may pay the same coin. They are combined into a
//! single entry by folding into a map keyed by reward coin type, preserving
//! first-seen order. The side sign is applied only when rates are combined
//! into a total or net APR.

use lendguard_core::decimal::safe_div;
use lendguard_core::CoinType;
use lendguard_risk::{ParsedObligation, ReserveMap, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::format::{RewardMap, RewardSummary};
use crate::stats::RewardKind;

/// Rates of every active reward paying one coin, summed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedReward {
    pub coin_type: CoinType,
    pub symbol: String,
    pub kind: RewardKind,
    pub rate: Decimal,
}

fn dedup(rewards: &[RewardSummary], kind: RewardKind) -> Vec<AggregatedReward> {
    let folded = rewards
        .iter()
        .filter(|r| r.stats.is_active && r.stats.kind == kind)
        .filter_map(|r| r.stats.rate().map(|rate| (&r.stats, rate)))
        .fold(
            BTreeMap::<CoinType, (usize, AggregatedReward)>::new(),
            |mut acc, (stats, rate)| {
                let order = acc.len();
                acc.entry(stats.reward_coin_type.clone())
                    .and_modify(|(_, entry)| entry.rate += rate)
                    .or_insert_with(|| {
                        (
                            order,
                            AggregatedReward {
                                coin_type: stats.reward_coin_type.clone(),
                                symbol: stats.reward_symbol.clone(),
                                kind,
                                rate,
                            },
                        )
                    });
                acc
            },
        );

    let mut ordered: Vec<(usize, AggregatedReward)> = folded.into_values().collect();
    ordered.sort_by_key(|(order, _)| *order);
    ordered.into_iter().map(|(_, reward)| reward).collect()
}

/// Active APR rewards combined per reward coin
pub fn dedup_apr_rewards(rewards: &[RewardSummary]) -> Vec<AggregatedReward> {
    dedup(rewards, RewardKind::Apr)
}

/// Active per-day rewards combined per reward coin
pub fn dedup_per_day_rewards(rewards: &[RewardSummary]) -> Vec<AggregatedReward> {
    dedup(rewards, RewardKind::PerDay)
}

/// Base APR plus (deposit) or minus (borrow) every active reward APR
pub fn total_apr_percent(
    side: Side,
    base_apr_percent: Decimal,
    rewards: &[RewardSummary],
) -> Decimal {
    let reward_apr: Decimal = dedup_apr_rewards(rewards).iter().map(|r| r.rate).sum();
    base_apr_percent + side.sign() * reward_apr
}

fn rewards_for<'a>(
    reward_map: &'a RewardMap,
    coin_type: &CoinType,
    side: Side,
) -> &'a [RewardSummary] {
    reward_map
        .get(coin_type)
        .map(|rewards| rewards.side(side))
        .unwrap_or_default()
}

/// Net APR of an obligation including rewards.
///
/// `(Σ deposit total APR x USD - Σ borrow total APR x USD) / net value`,
/// zero when the net value is zero. Positions whose reserve is missing from
/// the snapshot are left out.
pub fn net_apr_percent(
    obligation: &ParsedObligation,
    reserves: &ReserveMap,
    reward_map: &RewardMap,
) -> Decimal {
    let deposit_yield: Decimal = obligation
        .deposits
        .iter()
        .filter_map(|deposit| {
            let Some(reserve) = reserves.get(&deposit.coin_type) else {
                tracing::debug!(
                    coin_type = %deposit.coin_type,
                    "deposit reserve missing from snapshot"
                );
                return None;
            };
            let apr = total_apr_percent(
                Side::Deposit,
                reserve.deposit_apr_percent,
                rewards_for(reward_map, &deposit.coin_type, Side::Deposit),
            );
            Some(apr * deposit.deposited_amount_usd)
        })
        .sum();

    let borrow_cost: Decimal = obligation
        .borrows
        .iter()
        .filter_map(|borrow| {
            let Some(reserve) = reserves.get(&borrow.coin_type) else {
                tracing::debug!(
                    coin_type = %borrow.coin_type,
                    "borrow reserve missing from snapshot"
                );
                return None;
            };
            let apr = total_apr_percent(
                Side::Borrow,
                reserve.borrow_apr_percent,
                rewards_for(reward_map, &borrow.coin_type, Side::Borrow),
            );
            Some(apr * borrow.borrowed_amount_usd)
        })
        .sum();

    safe_div(deposit_yield - borrow_cost, obligation.net_value_usd).unwrap_or(Decimal::ZERO)
}

/// Claimable amounts of `obligation_id` summed per reward coin across all
/// reserves and sides. Dust is left out.
pub fn claimable_rewards(
    reward_map: &RewardMap,
    obligation_id: &str,
) -> BTreeMap<CoinType, Decimal> {
    reward_map
        .values()
        .flat_map(|rewards| rewards.deposit.iter().chain(rewards.borrow.iter()))
        .filter(|summary| summary.has_claimable(obligation_id))
        .filter_map(|summary| {
            summary
                .obligation_claims
                .get(obligation_id)
                .map(|claim| (summary.stats.reward_coin_type.clone(), claim.claimable_amount))
        })
        .fold(BTreeMap::new(), |mut acc, (coin_type, amount)| {
            *acc.entry(coin_type).or_insert(Decimal::ZERO) += amount;
            acc
        })
}
