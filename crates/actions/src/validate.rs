//! Max amounts and submit-button state
//!
//! Structural checks run first and block an action regardless of amount.
//! Then an amount must be entered, then the amount is walked through the
//! action's ceilings in order and the first one exceeded is reported.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::ceiling::ceilings;
use crate::context::ActionContext;

/// Why the submit button is disabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitButtonState {
    pub is_disabled: bool,
    pub reason: String,
}

impl SubmitButtonState {
    fn disabled(reason: impl Into<String>) -> Self {
        Self {
            is_disabled: true,
            reason: reason.into(),
        }
    }
}

/// Largest amount the user may submit.
///
/// `max(0, min(bounded ceilings))` in whole mint units. Ceilings tied to the
/// borrow limit stop one mint unit short so the obligation stays healthy.
/// Zero while a structural check blocks the action.
pub fn get_max_value(action: Action, ctx: &ActionContext<'_>) -> Decimal {
    if structural_block(action, ctx).is_some() {
        return Decimal::ZERO;
    }
    ceilings(action, ctx)
        .iter()
        .filter_map(|ceiling| ceiling.max_amount(ctx.reserve.mint_decimals))
        .min()
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO)
}

/// Submit-button state for `value`, `None` when the action may be submitted
pub fn get_submit_button_state(
    action: Action,
    ctx: &ActionContext<'_>,
    value: Decimal,
) -> Option<SubmitButtonState> {
    if let Some(reason) = structural_block(action, ctx) {
        tracing::debug!(%action, reserve = %ctx.reserve.symbol, %reason, "action blocked");
        return Some(SubmitButtonState::disabled(reason));
    }

    if value <= Decimal::ZERO {
        return Some(SubmitButtonState::disabled("Enter an amount"));
    }

    ceilings(action, ctx)
        .into_iter()
        .find(|ceiling| ceiling.is_exceeded_by(value))
        .map(|ceiling| {
            tracing::debug!(
                %action,
                reserve = %ctx.reserve.symbol,
                %value,
                reason = %ceiling.reason,
                "amount exceeds ceiling"
            );
            SubmitButtonState::disabled(ceiling.reason.to_string())
        })
}

/// Checks that block an action whatever the amount
fn structural_block(action: Action, ctx: &ActionContext<'_>) -> Option<String> {
    match action {
        Action::Deposit => deposit_block(ctx),
        Action::Borrow => borrow_block(ctx),
        Action::Withdraw | Action::Repay => None,
    }
}

fn deposit_block(ctx: &ActionContext<'_>) -> Option<String> {
    let reserve = ctx.reserve;
    if reserve.deposit_limit_reached() {
        return Some("Reserve deposit limit reached".to_string());
    }
    if reserve.deposit_limit_usd_reached() {
        return Some("Reserve USD deposit limit reached".to_string());
    }

    let obligation = ctx.obligation?;
    let max = ctx.config.max_deposit_positions;
    let is_new_position = obligation.deposit(&reserve.coin_type).is_none();
    if is_new_position && obligation.deposit_position_count() >= max {
        return Some(format!("Max {} deposit positions", max));
    }

    let looping = obligation
        .borrow(&reserve.coin_type)
        .is_some_and(|b| b.borrowed_amount_usd > ctx.config.looping_threshold_usd);
    if looping {
        return Some(format!("Repay {} borrows before depositing", reserve.symbol));
    }
    None
}

fn borrow_block(ctx: &ActionContext<'_>) -> Option<String> {
    let reserve = ctx.reserve;
    if reserve.borrow_limit_reached() {
        return Some("Reserve borrow limit reached".to_string());
    }
    if reserve.borrow_limit_usd_reached() {
        return Some("Reserve USD borrow limit reached".to_string());
    }

    let obligation = ctx.obligation?;
    let max = ctx.config.max_borrow_positions;
    let is_new_position = obligation.borrow(&reserve.coin_type).is_none();
    if is_new_position && obligation.borrow_position_count() >= max {
        return Some(format!("Max {} borrow positions", max));
    }

    let mut others = obligation
        .borrows
        .iter()
        .filter(|b| b.coin_type != reserve.coin_type);
    if reserve.config.isolated {
        if others.next().is_some() {
            return Some(format!(
                "{} is isolated and cannot be borrowed alongside other assets",
                reserve.symbol
            ));
        }
    } else if let Some(isolated) = others.find(|b| b.isolated) {
        return Some(format!(
            "Cannot borrow other assets while borrowing isolated {}",
            isolated.symbol
        ));
    }

    let looping = obligation
        .deposit(&reserve.coin_type)
        .is_some_and(|d| d.deposited_amount_usd > ctx.config.looping_threshold_usd);
    if looping {
        return Some(format!("Withdraw {} deposits before borrowing", reserve.symbol));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActionConfig;
    use crate::Reason;
    use lendguard_risk::testutils::{ObligationBuilder, ReserveBuilder};
    use lendguard_risk::{
        refresh_obligation, refresh_reserve, refresh_reserves, Obligation, ParsedObligation,
        RateLimiter, RateLimiterConfig, Reserve, ReserveMap, RiskConfig,
    };
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn limiter(remaining: Decimal) -> RateLimiter {
        RateLimiter::new(
            RateLimiterConfig {
                window_duration_s: 86_400,
                max_outflow: dec!(1_000_000),
            },
            remaining,
        )
    }

    struct Market {
        usdc: Reserve,
        iso: Reserve,
        deep: Reserve,
        sui: Reserve,
        reserves: ReserveMap,
    }

    fn market() -> Market {
        let usdc = ReserveBuilder::new("USDC", 6).available(dec!(100_000)).build();
        let iso = ReserveBuilder::new("ISO", 6)
            .array_index(1)
            .available(dec!(10_000))
            .isolated()
            .build();
        let deep = ReserveBuilder::new("DEEP", 6)
            .array_index(2)
            .available(dec!(10_000))
            .build();
        let sui = ReserveBuilder::sui()
            .array_index(3)
            .price(dec!(2))
            .available(dec!(10_000))
            .build();
        let reserves = refresh_reserves([&usdc, &iso, &deep, &sui]).unwrap();
        Market {
            usdc,
            iso,
            deep,
            sui,
            reserves,
        }
    }

    fn parse(market: &Market, obligation: Obligation) -> ParsedObligation {
        refresh_obligation(&obligation, &market.reserves, &RiskConfig::default()).unwrap()
    }

    fn state(
        market: &Market,
        reserve: &Reserve,
        obligation: &ParsedObligation,
        action: Action,
        value: Decimal,
    ) -> Option<SubmitButtonState> {
        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let ctx = ActionContext::new(&market.reserves[&reserve.coin_type], &limiter, &config)
            .with_obligation(obligation);
        get_submit_button_state(action, &ctx, value)
    }

    #[test]
    fn test_isolated_blocks_when_other_borrows_exist() {
        let m = market();
        let obligation = parse(
            &m,
            ObligationBuilder::new("alice")
                .deposit(&m.usdc, dec!(1000))
                .borrow(&m.deep, dec!(10))
                .build(),
        );

        let blocked = state(&m, &m.iso, &obligation, Action::Borrow, dec!(1)).unwrap();
        assert!(blocked.is_disabled);
        assert!(blocked.reason.contains("ISO is isolated"));

        // borrowing more of the non-isolated asset is fine
        assert_eq!(state(&m, &m.deep, &obligation, Action::Borrow, dec!(1)), None);
    }

    #[test]
    fn test_isolated_borrow_blocks_other_assets() {
        let m = market();
        let obligation = parse(
            &m,
            ObligationBuilder::new("alice")
                .deposit(&m.usdc, dec!(1000))
                .borrow(&m.iso, dec!(10))
                .build(),
        );

        let blocked = state(&m, &m.deep, &obligation, Action::Borrow, dec!(1)).unwrap();
        assert!(blocked.reason.contains("isolated ISO"));

        // topping up the isolated borrow itself is allowed
        assert_eq!(state(&m, &m.iso, &obligation, Action::Borrow, dec!(1)), None);
    }

    #[test]
    fn test_outflow_limit_binds_before_borrow_limit() {
        let m = market();
        // $800 borrow limit, $100 of outflow left in the window
        let obligation = parse(
            &m,
            ObligationBuilder::new("alice")
                .deposit(&m.usdc, dec!(1000))
                .build(),
        );
        let limiter = limiter(dec!(100));
        let config = ActionConfig::default();
        let ctx = ActionContext::new(&m.reserves[&m.deep.coin_type], &limiter, &config)
            .with_obligation(&obligation);

        assert_eq!(get_max_value(Action::Borrow, &ctx), dec!(100));

        let state = get_submit_button_state(Action::Borrow, &ctx, dec!(900)).unwrap();
        assert_eq!(state.reason, Reason::OutflowRateLimit.to_string());
        assert_eq!(get_submit_button_state(Action::Borrow, &ctx, dec!(100)), None);
    }

    #[test]
    fn test_native_repay_keeps_gas() {
        let m = market();
        let obligation = parse(
            &m,
            ObligationBuilder::new("alice")
                .deposit(&m.usdc, dec!(1000))
                .borrow(&m.sui, dec!(20))
                .build(),
        );
        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let ctx = ActionContext::new(&m.reserves[&m.sui.coin_type], &limiter, &config)
            .with_obligation(&obligation)
            .with_balance(dec!(10));

        assert_eq!(get_max_value(Action::Repay, &ctx), dec!(9));
        let state = get_submit_button_state(Action::Repay, &ctx, dec!(9.5)).unwrap();
        assert_eq!(state.reason, Reason::InsufficientGas.to_string());
        assert_eq!(get_submit_button_state(Action::Repay, &ctx, dec!(9)), None);
    }

    #[test]
    fn test_repay_capped_by_borrows() {
        let m = market();
        let obligation = parse(
            &m,
            ObligationBuilder::new("alice")
                .deposit(&m.usdc, dec!(1000))
                .borrow(&m.deep, dec!(20))
                .build(),
        );
        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let ctx = ActionContext::new(&m.reserves[&m.deep.coin_type], &limiter, &config)
            .with_obligation(&obligation)
            .with_balance(dec!(500));

        assert_eq!(get_max_value(Action::Repay, &ctx), dec!(20));
        let state = get_submit_button_state(Action::Repay, &ctx, dec!(21)).unwrap();
        assert_eq!(state.reason, Reason::RepayExceedsBorrows.to_string());
    }

    #[test]
    fn test_enter_an_amount() {
        let m = market();
        let obligation = parse(&m, ObligationBuilder::new("alice").build());
        let state = state(&m, &m.usdc, &obligation, Action::Deposit, dec!(0)).unwrap();
        assert_eq!(state.reason, "Enter an amount");
    }

    #[test]
    fn test_max_deposit_positions() {
        let symbols = ["A", "B", "C", "D", "E", "F"];
        let raw: Vec<Reserve> = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| {
                ReserveBuilder::new(s, 6)
                    .array_index(i as u64)
                    .available(dec!(1000))
                    .build()
            })
            .collect();
        let reserves = refresh_reserves(raw.iter()).unwrap();
        let obligation = raw[..5]
            .iter()
            .fold(ObligationBuilder::new("alice"), |b, r| b.deposit(r, dec!(1)))
            .build();
        let obligation =
            refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let sixth = ActionContext::new(&reserves[&raw[5].coin_type], &limiter, &config)
            .with_obligation(&obligation)
            .with_balance(dec!(10));
        let state = get_submit_button_state(Action::Deposit, &sixth, dec!(1)).unwrap();
        assert_eq!(state.reason, "Max 5 deposit positions");

        // an existing position can still grow
        let first = ActionContext::new(&reserves[&raw[0].coin_type], &limiter, &config)
            .with_obligation(&obligation)
            .with_balance(dec!(10));
        assert_eq!(get_submit_button_state(Action::Deposit, &first, dec!(1)), None);
    }

    #[test]
    fn test_max_borrow_positions() {
        let symbols = ["COL", "A", "B", "C", "D", "E", "F"];
        let raw: Vec<Reserve> = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| {
                ReserveBuilder::new(s, 6)
                    .array_index(i as u64)
                    .available(dec!(1000))
                    .build()
            })
            .collect();
        let reserves = refresh_reserves(raw.iter()).unwrap();
        let obligation = raw[1..6]
            .iter()
            .fold(
                ObligationBuilder::new("alice").deposit(&raw[0], dec!(10_000)),
                |b, r| b.borrow(r, dec!(1)),
            )
            .build();
        let obligation =
            refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let sixth = ActionContext::new(&reserves[&raw[6].coin_type], &limiter, &config)
            .with_obligation(&obligation);
        let state = get_submit_button_state(Action::Borrow, &sixth, dec!(1)).unwrap();
        assert_eq!(state.reason, "Max 5 borrow positions");
        assert_eq!(get_max_value(Action::Borrow, &sixth), dec!(0));

        let first = ActionContext::new(&reserves[&raw[1].coin_type], &limiter, &config)
            .with_obligation(&obligation);
        assert_eq!(get_submit_button_state(Action::Borrow, &first, dec!(1)), None);
        assert_eq!(get_max_value(Action::Borrow, &first), dec!(1000));
    }

    #[test]
    fn test_deposit_usd_limit_binds() {
        // 10 WETH valued at the $2500 upper price against a $30_000 cap
        let weth = ReserveBuilder::new("WETH", 8)
            .price(dec!(2000))
            .smoothed_price(dec!(2500))
            .available(dec!(10))
            .deposit_limit_usd(30_000)
            .build();
        let reserve = refresh_reserve(&weth).unwrap();
        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let ctx = ActionContext::new(&reserve, &limiter, &config).with_balance(dec!(5));

        // $5000 of headroom / $2500
        assert_eq!(get_max_value(Action::Deposit, &ctx), dec!(2));
        assert_eq!(get_submit_button_state(Action::Deposit, &ctx, dec!(2)), None);
        let state = get_submit_button_state(Action::Deposit, &ctx, dec!(2.5)).unwrap();
        assert_eq!(state.reason, Reason::ReserveDepositLimitUsd.to_string());
    }

    #[test]
    fn test_borrow_usd_limit_binds() {
        let usdc = ReserveBuilder::new("USDC", 6).available(dec!(100_000)).build();
        // 4 WETH borrowed at the $2500 upper price against a $15_000 cap
        let weth = ReserveBuilder::new("WETH", 8)
            .array_index(1)
            .price(dec!(2000))
            .smoothed_price(dec!(2500))
            .available(dec!(10))
            .borrowed(dec!(4))
            .borrow_limit_usd(15_000)
            .build();
        let reserves = refresh_reserves([&usdc, &weth]).unwrap();
        let obligation = ObligationBuilder::new("alice")
            .deposit(&usdc, dec!(100_000))
            .build();
        let obligation =
            refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let ctx = ActionContext::new(&reserves[&weth.coin_type], &limiter, &config)
            .with_obligation(&obligation);

        // $5000 of headroom / $2500, below liquidity (10) and the borrow limit (32)
        assert_eq!(get_max_value(Action::Borrow, &ctx), dec!(2));
        assert_eq!(get_submit_button_state(Action::Borrow, &ctx, dec!(2)), None);
        let state = get_submit_button_state(Action::Borrow, &ctx, dec!(2.5)).unwrap();
        assert_eq!(state.reason, Reason::ReserveBorrowLimitUsd.to_string());
    }

    #[test]
    fn test_blocked_action_has_zero_max() {
        let m = market();
        let obligation = parse(
            &m,
            ObligationBuilder::new("alice")
                .deposit(&m.usdc, dec!(1000))
                .borrow(&m.deep, dec!(10))
                .build(),
        );
        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let iso = ActionContext::new(&m.reserves[&m.iso.coin_type], &limiter, &config)
            .with_obligation(&obligation);
        assert!(get_submit_button_state(Action::Borrow, &iso, dec!(1)).is_some());
        assert_eq!(get_max_value(Action::Borrow, &iso), dec!(0));

        let deep = ActionContext::new(&m.reserves[&m.deep.coin_type], &limiter, &config)
            .with_obligation(&obligation)
            .with_balance(dec!(50));
        assert_eq!(get_max_value(Action::Deposit, &deep), dec!(0));
    }

    #[test]
    fn test_looping_blocks_same_asset() {
        let m = market();
        let obligation = parse(
            &m,
            ObligationBuilder::new("alice")
                .deposit(&m.usdc, dec!(1000))
                .borrow(&m.deep, dec!(10))
                .build(),
        );

        let deposit = state(&m, &m.deep, &obligation, Action::Deposit, dec!(1)).unwrap();
        assert_eq!(deposit.reason, "Repay DEEP borrows before depositing");

        let borrow = state(&m, &m.usdc, &obligation, Action::Borrow, dec!(1)).unwrap();
        assert_eq!(borrow.reason, "Withdraw USDC deposits before borrowing");
    }

    #[test]
    fn test_deposit_limit_reached() {
        let usdc = ReserveBuilder::new("USDC", 6)
            .available(dec!(1000))
            .deposit_limit(dec!(1000))
            .build();
        let reserve = refresh_reserve(&usdc).unwrap();
        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let ctx = ActionContext::new(&reserve, &limiter, &config).with_balance(dec!(10));

        let state = get_submit_button_state(Action::Deposit, &ctx, dec!(1)).unwrap();
        assert_eq!(state.reason, "Reserve deposit limit reached");
        assert_eq!(get_max_value(Action::Deposit, &ctx), dec!(0));
    }

    #[test]
    fn test_max_value_truncates_to_mint_decimals() {
        let usdc = ReserveBuilder::new("USDC", 6).available(dec!(1000)).build();
        let reserve = refresh_reserve(&usdc).unwrap();
        let limiter = limiter(dec!(1_000_000));
        let config = ActionConfig::default();
        let ctx = ActionContext::new(&reserve, &limiter, &config).with_balance(dec!(1.23456789));
        assert_eq!(get_max_value(Action::Deposit, &ctx), dec!(1.234567));
    }

    proptest! {
        #[test]
        fn prop_max_value_is_within_every_ceiling(
            balance in 0u64..10_000_000,
            available in 0u64..10_000_000,
            remaining in 0u64..10_000_000,
            deposit in 0u64..1_000_000,
            action_index in 0usize..4,
        ) {
            let usdc = ReserveBuilder::new("USDC", 6)
                .available(Decimal::new(available as i64, 2))
                .build();
            let deep = ReserveBuilder::new("DEEP", 6)
                .array_index(1)
                .available(Decimal::new(available as i64, 2))
                .build();
            let reserves = refresh_reserves([&usdc, &deep]).unwrap();
            let obligation = ObligationBuilder::new("alice")
                .deposit(&usdc, Decimal::new(deposit as i64, 2))
                .build();
            let obligation =
                refresh_obligation(&obligation, &reserves, &RiskConfig::default()).unwrap();

            let limiter = limiter(Decimal::new(remaining as i64, 2));
            let config = ActionConfig::default();
            let action = [Action::Deposit, Action::Borrow, Action::Withdraw, Action::Repay]
                [action_index];
            let ctx = ActionContext::new(&reserves[&deep.coin_type], &limiter, &config)
                .with_obligation(&obligation)
                .with_balance(Decimal::new(balance as i64, 2));

            let max = get_max_value(action, &ctx);
            prop_assert!(max >= Decimal::ZERO);
            for ceiling in ceilings(action, &ctx) {
                if let Some(bound) = ceiling.value.bound() {
                    prop_assert!(max <= bound.max(Decimal::ZERO));
                }
            }
            if max > Decimal::ZERO {
                prop_assert_eq!(get_submit_button_state(action, &ctx, max), None);
            }
        }
    }
}
