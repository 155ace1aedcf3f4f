//! CLI commands

use lendguard_actions::{
    get_max_value, get_submit_button_state, get_submit_warning_messages, Action,
};
use lendguard_rewards::{
    claimable_rewards, dedup_per_day_rewards, net_apr_percent, total_apr_percent,
};
use lendguard_risk::{utilization_segments, LiquidationPlanner, Side, WalletCoin};
use rust_decimal::Decimal;
use std::path::Path;

use crate::context::AppContext;

/// List every reserve with rates including rewards
pub async fn reserves(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let rewards = ctx.reward_map()?;

    println!(
        "{:<10} {:>14} {:>18} {:>18} {:>8} {:>10} {:>10}",
        "SYMBOL", "PRICE", "DEPOSITED", "BORROWED", "UTIL%", "DEP APR%", "BOR APR%"
    );
    for reserve in ctx.market.reserves.values() {
        let side_rewards = rewards.get(&reserve.coin_type);
        let deposit_apr = total_apr_percent(
            Side::Deposit,
            reserve.deposit_apr_percent,
            side_rewards.map(|r| r.deposit.as_slice()).unwrap_or_default(),
        );
        let borrow_apr = total_apr_percent(
            Side::Borrow,
            reserve.borrow_apr_percent,
            side_rewards.map(|r| r.borrow.as_slice()).unwrap_or_default(),
        );
        println!(
            "{:<10} {:>14} {:>18} {:>18} {:>8} {:>10} {:>10}",
            reserve.symbol,
            reserve.price.round_dp(6),
            reserve.deposited_amount.round_dp(2),
            reserve.borrowed_amount.round_dp(2),
            reserve.utilization_percent.round_dp(2),
            deposit_apr.round_dp(2),
            borrow_apr.round_dp(2),
        );

        for reward in side_rewards
            .map(|r| dedup_per_day_rewards(&r.deposit))
            .unwrap_or_default()
        {
            println!("           + {} {} per day per token", reward.rate.round_dp(6), reward.symbol);
        }
    }

    println!();
    println!("TVL: ${}", ctx.market.tvl_usd().round_dp(2));
    println!("Outflow window used: {}%", ctx.market.rate_limiter.used_percent().round_dp(2));
    Ok(())
}

/// Show an obligation's health
pub async fn health(ctx: &AppContext, obligation_id: &str) -> Result<(), anyhow::Error> {
    let obligation = ctx.obligation(obligation_id)?;
    let rewards = ctx.reward_map()?;

    println!("Obligation {}", obligation.id);
    for deposit in &obligation.deposits {
        println!(
            "  deposit  {:>18} {:<8} ${}",
            deposit.deposited_amount.round_dp(6),
            deposit.symbol,
            deposit.deposited_amount_usd.round_dp(2)
        );
    }
    for borrow in &obligation.borrows {
        println!(
            "  borrow   {:>18} {:<8} ${}",
            borrow.borrowed_amount.round_dp(6),
            borrow.symbol,
            borrow.borrowed_amount_usd.round_dp(2)
        );
    }
    println!("Deposited:          ${}", obligation.deposited_amount_usd.round_dp(2));
    println!("Borrowed:           ${}", obligation.borrowed_amount_usd.round_dp(2));
    println!(
        "Weighted borrows:   ${}",
        obligation.display_weighted_borrows_usd().round_dp(2)
    );
    println!("Borrow limit:       ${}", obligation.borrow_limit_usd.round_dp(2));
    println!(
        "Liq. threshold:     ${}",
        obligation.unhealthy_borrow_value_usd.round_dp(2)
    );
    println!(
        "Limit used:         {}%",
        obligation.borrow_limit_used_percent().round_dp(2)
    );
    println!(
        "Net APR:            {}%",
        net_apr_percent(&obligation, &ctx.market.reserves, &rewards).round_dp(2)
    );
    println!("Status:             {}", obligation.health_status());

    if let Some(segments) = utilization_segments(&obligation) {
        let bar: Vec<String> = segments
            .iter()
            .map(|s| format!("{:?} {}%", s.kind, s.width_percent.round_dp(2)))
            .collect();
        println!("Utilization:        {}", bar.join(" | "));
    }
    Ok(())
}

/// Print the maximum amount for an action
pub async fn max(
    ctx: &AppContext,
    action: Action,
    symbol: &str,
    obligation_id: Option<&str>,
    balance: Decimal,
) -> Result<(), anyhow::Error> {
    let reserve = ctx.reserve(symbol)?;
    let obligation = obligation_id.map(|id| ctx.obligation(id)).transpose()?;
    let action_ctx = ctx.action_context(reserve, obligation.as_ref(), balance);

    let value = get_max_value(action, &action_ctx);
    println!("Max {} {}: {}", action, reserve.symbol, value);
    Ok(())
}

/// Validate an amount as the submit button would
pub async fn check(
    ctx: &AppContext,
    action: Action,
    symbol: &str,
    amount: Decimal,
    obligation_id: Option<&str>,
    balance: Decimal,
) -> Result<(), anyhow::Error> {
    let reserve = ctx.reserve(symbol)?;
    let obligation = obligation_id.map(|id| ctx.obligation(id)).transpose()?;
    let action_ctx = ctx.action_context(reserve, obligation.as_ref(), balance);

    match get_submit_button_state(action, &action_ctx, amount) {
        Some(state) => println!("❌ {} {} {}: {}", action, amount, reserve.symbol, state.reason),
        None => println!("✅ {} {} {} can be submitted", action, amount, reserve.symbol),
    }
    for warning in get_submit_warning_messages(action, &action_ctx) {
        println!("⚠️  {}", warning);
    }
    Ok(())
}

/// Show an obligation's claimable rewards
pub async fn rewards(ctx: &AppContext, obligation_id: &str) -> Result<(), anyhow::Error> {
    // fails early on an unknown obligation
    ctx.obligation(obligation_id)?;
    let claims = claimable_rewards(&ctx.reward_map()?, obligation_id);

    if claims.is_empty() {
        println!("No claimable rewards for {}", obligation_id);
        return Ok(());
    }
    println!("Claimable rewards for {}:", obligation_id);
    for (coin_type, amount) in claims {
        let symbol = ctx
            .snapshot
            .coin_metadata
            .get(&coin_type)
            .map(|m| m.symbol.clone())
            .unwrap_or_else(|| coin_type.name().to_string());
        println!("  {} {}", amount, symbol);
    }
    Ok(())
}

/// Plan the liquidation of an obligation and print it as JSON
pub async fn liquidate(
    ctx: &AppContext,
    obligation_id: &str,
    repay_symbol: &str,
    withdraw_symbol: &str,
    wallet_path: &Path,
    liquidator: &str,
) -> Result<(), anyhow::Error> {
    let obligation = ctx.obligation(obligation_id)?;
    let content = tokio::fs::read_to_string(wallet_path).await?;
    let wallet: Vec<WalletCoin> = serde_json::from_str(&content)?;

    let planner = LiquidationPlanner::new(ctx.liquidation_config.clone());
    let plan = planner.plan(
        &obligation,
        &ctx.market.reserves,
        repay_symbol,
        withdraw_symbol,
        &wallet,
        liquidator,
    )?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
