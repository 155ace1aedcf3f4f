//! Looping warnings
//!
//! Holding the same asset on both sides is blocked outright. Holding two
//! different members of a price-correlated family (two stablecoins, SUI and
//! a SUI liquid staking token) is allowed but warned about.

use lendguard_core::{AssetGroup, CoinType};

use crate::action::Action;
use crate::context::ActionContext;

/// Non-blocking warnings for `action`, empty when there are none
pub fn get_submit_warning_messages(action: Action, ctx: &ActionContext<'_>) -> Vec<String> {
    let Some(obligation) = ctx.obligation else {
        return Vec::new();
    };
    let reserve = ctx.reserve;
    let group = AssetGroup::for_symbol(&reserve.symbol);
    if !group.is_correlated() {
        return Vec::new();
    }

    let threshold = ctx.config.looping_threshold_usd;
    let correlated = |coin_type: &CoinType, symbol: &str| {
        *coin_type != reserve.coin_type && AssetGroup::for_symbol(symbol) == group
    };

    match action {
        Action::Deposit => obligation
            .borrows
            .iter()
            .filter(|b| correlated(&b.coin_type, &b.symbol))
            .filter(|b| b.borrowed_amount_usd > threshold)
            .map(|b| {
                format!(
                    "Depositing {} while borrowing {} is looping and may not earn rewards",
                    reserve.symbol, b.symbol
                )
            })
            .collect(),
        Action::Borrow => obligation
            .deposits
            .iter()
            .filter(|d| correlated(&d.coin_type, &d.symbol))
            .filter(|d| d.deposited_amount_usd > threshold)
            .map(|d| {
                format!(
                    "Borrowing {} while depositing {} is looping and may not earn rewards",
                    reserve.symbol, d.symbol
                )
            })
            .collect(),
        Action::Withdraw | Action::Repay => Vec::new(),
    }
}
