//! Named ceilings on an action's amount
//!
//! Each action has an ordered list of ceilings. The list order decides
//! which reason the user sees first when several are exceeded, so it is
//! part of the contract. A ceiling that does not apply is `Unbounded`.

use lendguard_core::decimal::{dust_threshold, safe_div};
use lendguard_risk::OutflowSide;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::action::Action;
use crate::context::ActionContext;

/// Why an amount is capped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    #[strum(to_string = "Insufficient balance")]
    InsufficientBalance,
    #[strum(to_string = "Insufficient balance after keeping SUI for gas")]
    InsufficientGas,
    #[strum(to_string = "Exceeds reserve deposit limit")]
    ReserveDepositLimit,
    #[strum(to_string = "Exceeds reserve USD deposit limit")]
    ReserveDepositLimitUsd,
    #[strum(to_string = "Insufficient liquidity")]
    InsufficientLiquidity,
    #[strum(to_string = "Exceeds reserve borrow limit")]
    ReserveBorrowLimit,
    #[strum(to_string = "Exceeds reserve USD borrow limit")]
    ReserveBorrowLimitUsd,
    #[strum(to_string = "Exceeds pool outflow rate limit")]
    OutflowRateLimit,
    #[strum(to_string = "Exceeds borrow limit")]
    BorrowLimit,
    #[strum(to_string = "Withdraw exceeds deposits")]
    WithdrawExceedsDeposits,
    #[strum(to_string = "Withdraw is unhealthy")]
    WithdrawUnhealthy,
    #[strum(to_string = "Repay exceeds borrows")]
    RepayExceedsBorrows,
}

impl Reason {
    /// Ceilings derived from the obligation's borrow limit.
    ///
    /// An obligation is healthy only while weighted borrows stay strictly
    /// below the limit, so an amount landing exactly on one of these
    /// ceilings already exceeds it.
    pub fn is_strict(&self) -> bool {
        matches!(self, Reason::BorrowLimit | Reason::WithdrawUnhealthy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CeilingValue {
    Bounded(Decimal),
    Unbounded,
}

impl CeilingValue {
    /// Bounded by `numerator / denominator`, unbounded when the divisor is zero
    fn ratio(numerator: Decimal, denominator: Decimal) -> Self {
        safe_div(numerator, denominator)
            .map(CeilingValue::Bounded)
            .unwrap_or(CeilingValue::Unbounded)
    }

    pub fn bound(&self) -> Option<Decimal> {
        match self {
            CeilingValue::Bounded(value) => Some(*value),
            CeilingValue::Unbounded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ceiling {
    pub reason: Reason,
    pub value: CeilingValue,
}

impl Ceiling {
    fn bounded(reason: Reason, value: Decimal) -> Self {
        Self {
            reason,
            value: CeilingValue::Bounded(value),
        }
    }

    /// Returns true if `amount` is above this ceiling, or on it for a
    /// strict ceiling
    pub fn is_exceeded_by(&self, amount: Decimal) -> bool {
        self.value.bound().is_some_and(|bound| {
            if self.reason.is_strict() {
                amount >= bound
            } else {
                amount > bound
            }
        })
    }

    /// Largest amount in whole mint units that does not exceed this
    /// ceiling, `None` when unbounded. May be negative.
    pub fn max_amount(&self, mint_decimals: u8) -> Option<Decimal> {
        let bound = self.value.bound()?;
        let truncated =
            bound.round_dp_with_strategy(u32::from(mint_decimals), RoundingStrategy::ToZero);
        if self.reason.is_strict() && truncated >= bound {
            Some(truncated - dust_threshold(mint_decimals))
        } else {
            Some(truncated)
        }
    }
}

/// Ordered ceilings for `action`
pub fn ceilings(action: Action, ctx: &ActionContext<'_>) -> Vec<Ceiling> {
    match action {
        Action::Deposit => deposit_ceilings(ctx),
        Action::Borrow => borrow_ceilings(ctx),
        Action::Withdraw => withdraw_ceilings(ctx),
        Action::Repay => repay_ceilings(ctx),
    }
}

fn balance_ceiling(ctx: &ActionContext<'_>) -> Ceiling {
    let reason = if ctx.reserve.is_native_gas() {
        Reason::InsufficientGas
    } else {
        Reason::InsufficientBalance
    };
    Ceiling::bounded(reason, ctx.spendable_balance())
}

fn deposit_ceilings(ctx: &ActionContext<'_>) -> Vec<Ceiling> {
    let reserve = ctx.reserve;
    let usd_headroom =
        reserve.config.deposit_limit_usd - reserve.deposited_amount_usd_upper_bound();
    vec![
        balance_ceiling(ctx),
        Ceiling::bounded(
            Reason::ReserveDepositLimit,
            reserve.config.deposit_limit - reserve.deposited_amount,
        ),
        Ceiling {
            reason: Reason::ReserveDepositLimitUsd,
            value: CeilingValue::ratio(usd_headroom, reserve.max_price),
        },
    ]
}

fn borrow_ceilings(ctx: &ActionContext<'_>) -> Vec<Ceiling> {
    let reserve = ctx.reserve;
    // The fee is added on top of the borrowed amount
    let with_fee = Decimal::ONE + reserve.config.borrow_fee();
    let net_of_fee = |value: CeilingValue| match value {
        CeilingValue::Bounded(v) => CeilingValue::Bounded(v / with_fee),
        CeilingValue::Unbounded => CeilingValue::Unbounded,
    };

    let usd_headroom =
        reserve.config.borrow_limit_usd - reserve.borrowed_amount_usd_upper_bound();
    let candidates = [
        (
            Reason::InsufficientLiquidity,
            CeilingValue::Bounded(reserve.available_amount),
        ),
        (
            Reason::ReserveBorrowLimit,
            CeilingValue::Bounded(reserve.config.borrow_limit - reserve.borrowed_amount),
        ),
        (
            Reason::ReserveBorrowLimitUsd,
            CeilingValue::ratio(usd_headroom, reserve.max_price),
        ),
        (
            Reason::OutflowRateLimit,
            CeilingValue::Bounded(
                ctx.rate_limiter
                    .remaining_outflow_for(reserve, OutflowSide::Borrow),
            ),
        ),
        (
            Reason::BorrowLimit,
            CeilingValue::ratio(
                ctx.borrow_limit_headroom_usd(),
                reserve.max_price * reserve.config.borrow_weight,
            ),
        ),
    ];

    candidates
        .into_iter()
        .map(|(reason, value)| Ceiling {
            reason,
            value: net_of_fee(value),
        })
        .collect()
}

fn withdraw_ceilings(ctx: &ActionContext<'_>) -> Vec<Ceiling> {
    let reserve = ctx.reserve;
    let has_borrows = ctx.obligation.is_some_and(|o| !o.borrows.is_empty());
    let open_ltv = reserve.config.open_ltv();

    // Withdrawing lowers the borrow limit by amount x minPrice x openLtv
    let unhealthy = if !has_borrows || open_ltv.is_zero() {
        CeilingValue::Unbounded
    } else {
        CeilingValue::ratio(ctx.borrow_limit_headroom_usd(), reserve.min_price * open_ltv)
    };

    vec![
        Ceiling::bounded(Reason::WithdrawExceedsDeposits, ctx.deposited_amount()),
        Ceiling::bounded(Reason::InsufficientLiquidity, reserve.available_amount),
        Ceiling::bounded(
            Reason::OutflowRateLimit,
            ctx.rate_limiter
                .remaining_outflow_for(reserve, OutflowSide::Withdraw),
        ),
        Ceiling {
            reason: Reason::WithdrawUnhealthy,
            value: unhealthy,
        },
    ]
}

fn repay_ceilings(ctx: &ActionContext<'_>) -> Vec<Ceiling> {
    vec![
        balance_ceiling(ctx),
        Ceiling::bounded(Reason::RepayExceedsBorrows, ctx.borrowed_amount()),
    ]
}
