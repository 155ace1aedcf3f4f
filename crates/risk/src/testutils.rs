//! Builders for reserves and obligations in token units.
//!
//! Amounts passed to the builders are whole tokens; the builders scale them
//! to the raw integer and WAD encodings the chain uses.

use lendguard_core::decimal::pow10;
use lendguard_core::{CoinType, Wad};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::interest::{CurvePoint, InterestRateCurve};
use crate::obligation::{Borrow, Deposit, Obligation};
use crate::pool_reward::{PoolReward, PoolRewardManager, UserReward, UserRewardManager};
use crate::reserve::{Reserve, ReserveConfig};

/// Deterministic coin type for a test symbol. `SUI` maps to the native coin.
pub fn coin_type_for(symbol: &str) -> CoinType {
    if symbol.eq_ignore_ascii_case("SUI") {
        return CoinType::sui();
    }
    let address: String = symbol.bytes().map(|b| format!("{:02x}", b)).collect();
    format!("0x{}::{}::{}", address, symbol.to_lowercase(), symbol)
        .parse()
        .expect("test symbol produces a valid coin type")
}

fn to_raw(amount: Decimal, decimals: u8) -> u64 {
    (amount * pow10(decimals))
        .trunc()
        .to_u64()
        .expect("test amount fits in u64")
}

fn to_wad(value: Decimal) -> Wad {
    Wad::from_decimal(value).expect("test value fits in WAD")
}

pub struct ReserveBuilder {
    reserve: Reserve,
    available: Decimal,
    borrowed: Decimal,
    ctoken_supply: Option<Decimal>,
    smoothed_price: Option<Decimal>,
    price: Decimal,
}

impl ReserveBuilder {
    pub fn new(symbol: &str, mint_decimals: u8) -> Self {
        let reserve = Reserve {
            array_index: 0,
            coin_type: coin_type_for(symbol),
            symbol: symbol.to_string(),
            mint_decimals,
            config: ReserveConfig {
                open_ltv_pct: 80,
                close_ltv_pct: 85,
                max_close_ltv_pct: 90,
                borrow_weight_bps: 10_000,
                deposit_limit: u64::MAX,
                borrow_limit: u64::MAX,
                deposit_limit_usd: 1_000_000_000,
                borrow_limit_usd: 1_000_000_000,
                liquidation_bonus_bps: 500,
                max_liquidation_bonus_bps: 1_000,
                borrow_fee_bps: 0,
                spread_fee_bps: 0,
                protocol_liquidation_fee_bps: 0,
                isolated: false,
                open_attributed_borrow_limit_usd: 0,
                close_attributed_borrow_limit_usd: 0,
                interest_rate: InterestRateCurve::new([
                    CurvePoint::new(Decimal::ZERO, Decimal::ZERO),
                    CurvePoint::new(Decimal::ONE_HUNDRED, Decimal::from(20)),
                ]),
            },
            price: Wad::ZERO,
            smoothed_price: Wad::ZERO,
            price_last_update_timestamp_s: 0,
            available_amount: 0,
            ctoken_supply: 0,
            borrowed_amount: Wad::ZERO,
            cumulative_borrow_rate: to_wad(Decimal::ONE),
            unclaimed_spread_fees: Wad::ZERO,
            deposits_pool_reward_manager: PoolRewardManager {
                id: format!("{}-deposits", symbol),
                ..Default::default()
            },
            borrows_pool_reward_manager: PoolRewardManager {
                id: format!("{}-borrows", symbol),
                ..Default::default()
            },
        };
        Self {
            reserve,
            available: Decimal::ZERO,
            borrowed: Decimal::ZERO,
            ctoken_supply: None,
            smoothed_price: None,
            price: Decimal::ONE,
        }
    }

    /// Native SUI reserve (9 decimals)
    pub fn sui() -> Self {
        Self::new("SUI", 9)
    }

    pub fn array_index(mut self, index: u64) -> Self {
        self.reserve.array_index = index;
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    pub fn smoothed_price(mut self, price: Decimal) -> Self {
        self.smoothed_price = Some(price);
        self
    }

    pub fn available(mut self, amount: Decimal) -> Self {
        self.available = amount;
        self
    }

    pub fn borrowed(mut self, amount: Decimal) -> Self {
        self.borrowed = amount;
        self
    }

    /// C-token supply in token units. Defaults to the deposited amount.
    pub fn ctoken_supply(mut self, amount: Decimal) -> Self {
        self.ctoken_supply = Some(amount);
        self
    }

    pub fn cumulative_borrow_rate(mut self, rate: Decimal) -> Self {
        self.reserve.cumulative_borrow_rate = to_wad(rate);
        self
    }

    pub fn ltv(mut self, open_pct: u8, close_pct: u8) -> Self {
        self.reserve.config.open_ltv_pct = open_pct;
        self.reserve.config.close_ltv_pct = close_pct;
        self
    }

    pub fn max_close_ltv(mut self, pct: u8) -> Self {
        self.reserve.config.max_close_ltv_pct = pct;
        self
    }

    pub fn borrow_weight_bps(mut self, bps: u64) -> Self {
        self.reserve.config.borrow_weight_bps = bps;
        self
    }

    pub fn borrow_fee_bps(mut self, bps: u64) -> Self {
        self.reserve.config.borrow_fee_bps = bps;
        self
    }

    pub fn spread_fee_bps(mut self, bps: u64) -> Self {
        self.reserve.config.spread_fee_bps = bps;
        self
    }

    pub fn liquidation_bonus_bps(mut self, bonus: u64, max_bonus: u64) -> Self {
        self.reserve.config.liquidation_bonus_bps = bonus;
        self.reserve.config.max_liquidation_bonus_bps = max_bonus;
        self
    }

    pub fn protocol_liquidation_fee_bps(mut self, bps: u64) -> Self {
        self.reserve.config.protocol_liquidation_fee_bps = bps;
        self
    }

    /// Token-unit deposit limit
    pub fn deposit_limit(mut self, amount: Decimal) -> Self {
        self.reserve.config.deposit_limit = to_raw(amount, self.reserve.mint_decimals);
        self
    }

    /// Token-unit borrow limit
    pub fn borrow_limit(mut self, amount: Decimal) -> Self {
        self.reserve.config.borrow_limit = to_raw(amount, self.reserve.mint_decimals);
        self
    }

    pub fn deposit_limit_usd(mut self, usd: u64) -> Self {
        self.reserve.config.deposit_limit_usd = usd;
        self
    }

    pub fn borrow_limit_usd(mut self, usd: u64) -> Self {
        self.reserve.config.borrow_limit_usd = usd;
        self
    }

    pub fn isolated(mut self) -> Self {
        self.reserve.config.isolated = true;
        self
    }

    pub fn interest_rate(mut self, curve: InterestRateCurve) -> Self {
        self.reserve.config.interest_rate = curve;
        self
    }

    pub fn deposits_pool_reward_manager(mut self, manager: PoolRewardManager) -> Self {
        self.reserve.deposits_pool_reward_manager = manager;
        self
    }

    pub fn borrows_pool_reward_manager(mut self, manager: PoolRewardManager) -> Self {
        self.reserve.borrows_pool_reward_manager = manager;
        self
    }

    pub fn build(self) -> Reserve {
        let decimals = self.reserve.mint_decimals;
        let deposited = self.available + self.borrowed;
        Reserve {
            price: to_wad(self.price),
            smoothed_price: to_wad(self.smoothed_price.unwrap_or(self.price)),
            available_amount: to_raw(self.available, decimals),
            borrowed_amount: to_wad(self.borrowed * pow10(decimals)),
            ctoken_supply: to_raw(self.ctoken_supply.unwrap_or(deposited), decimals),
            ..self.reserve
        }
    }
}

pub struct ObligationBuilder {
    obligation: Obligation,
}

impl ObligationBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            obligation: Obligation {
                id: id.to_string(),
                owner: String::new(),
                deposits: Vec::new(),
                borrows: Vec::new(),
                user_reward_managers: Vec::new(),
            },
        }
    }

    /// Deposit `amount` tokens, converted to c-tokens at the reserve's rate
    pub fn deposit(mut self, reserve: &Reserve, amount: Decimal) -> Self {
        let decimals = reserve.mint_decimals;
        let deposited = Decimal::from(reserve.available_amount)
            + reserve.borrowed_amount.to_decimal().unwrap_or_default();
        let supply = Decimal::from(reserve.ctoken_supply);
        let rate = if supply.is_zero() || deposited.is_zero() {
            Decimal::ONE
        } else {
            deposited / supply
        };
        let ctokens = (amount * pow10(decimals) / rate)
            .trunc()
            .to_u64()
            .expect("test amount fits in u64");

        let index = self.push_user_reward_manager(&reserve.deposits_pool_reward_manager, ctokens);
        self.obligation.deposits.push(Deposit {
            coin_type: reserve.coin_type.clone(),
            reserve_array_index: reserve.array_index,
            deposited_ctoken_amount: ctokens,
            user_reward_manager_index: index,
        });
        self
    }

    /// Borrow `amount` tokens at the reserve's current cumulative rate
    pub fn borrow(mut self, reserve: &Reserve, amount: Decimal) -> Self {
        let raw = amount * pow10(reserve.mint_decimals);
        let share = raw.trunc().to_u64().expect("test amount fits in u64");

        let index = self.push_user_reward_manager(&reserve.borrows_pool_reward_manager, share);
        self.obligation.borrows.push(Borrow {
            coin_type: reserve.coin_type.clone(),
            reserve_array_index: reserve.array_index,
            borrowed_amount: to_wad(raw),
            cumulative_borrow_rate: reserve.cumulative_borrow_rate,
            user_reward_manager_index: index,
        });
        self
    }

    /// Set earned rewards on the user reward manager tracking `manager_id`
    pub fn earned(
        mut self,
        manager_id: &str,
        reward_index: usize,
        pool_reward_id: &str,
        earned: Decimal,
    ) -> Self {
        if let Some(manager) = self
            .obligation
            .user_reward_managers
            .iter_mut()
            .find(|m| m.pool_reward_manager_id == manager_id)
        {
            if manager.rewards.len() <= reward_index {
                manager.rewards.resize(reward_index + 1, None);
            }
            manager.rewards[reward_index] = Some(UserReward {
                pool_reward_id: pool_reward_id.to_string(),
                earned_rewards: to_wad(earned),
                cumulative_rewards_per_share: Wad::ZERO,
            });
        }
        self
    }

    fn push_user_reward_manager(&mut self, manager: &PoolRewardManager, share: u64) -> u64 {
        self.obligation.user_reward_managers.push(UserRewardManager {
            pool_reward_manager_id: manager.id.clone(),
            share,
            rewards: Vec::new(),
            last_update_time_ms: 0,
        });
        (self.obligation.user_reward_managers.len() - 1) as u64
    }

    pub fn build(self) -> Obligation {
        self.obligation
    }
}

/// Pool reward paying `total_rewards` raw units over `[start_ms, end_ms)`
pub fn pool_reward(
    id: &str,
    coin_type: CoinType,
    total_rewards: u64,
    start_ms: u64,
    end_ms: u64,
) -> PoolReward {
    PoolReward {
        id: id.to_string(),
        coin_type,
        total_rewards,
        allocated_rewards: Wad::ZERO,
        cumulative_rewards_per_share: Wad::ZERO,
        num_user_reward_managers: 0,
        start_time_ms: start_ms,
        end_time_ms: end_ms,
    }
}
