//! Inputs shared by every action validator

use lendguard_core::Amount;
use lendguard_risk::{ParsedObligation, ParsedReserve, RateLimiter};
use rust_decimal::Decimal;

use crate::config::ActionConfig;

/// Everything an action validator reads.
///
/// Built against one reserve; the wallet balance and obligation are
/// optional and added with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct ActionContext<'a> {
    /// Reserve the action targets
    pub reserve: &'a ParsedReserve,

    /// Market-wide outflow limiter snapshot
    pub rate_limiter: &'a RateLimiter,

    /// The user's obligation, absent before their first deposit
    pub obligation: Option<&'a ParsedObligation>,

    /// Wallet balance of the reserve's coin (token units)
    pub balance: Amount,

    pub config: &'a ActionConfig,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        reserve: &'a ParsedReserve,
        rate_limiter: &'a RateLimiter,
        config: &'a ActionConfig,
    ) -> Self {
        Self {
            reserve,
            rate_limiter,
            obligation: None,
            balance: Amount::ZERO,
            config,
        }
    }

    /// Set wallet balance; negative input is floored at zero
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Amount::saturating(balance);
        self
    }

    /// Set obligation
    pub fn with_obligation(mut self, obligation: &'a ParsedObligation) -> Self {
        self.obligation = Some(obligation);
        self
    }

    /// Amount of the reserve's coin deposited by the obligation
    pub fn deposited_amount(&self) -> Decimal {
        self.obligation
            .map(|o| o.deposited_amount(&self.reserve.coin_type))
            .unwrap_or_default()
    }

    /// Amount of the reserve's coin borrowed by the obligation
    pub fn borrowed_amount(&self) -> Decimal {
        self.obligation
            .map(|o| o.borrowed_amount(&self.reserve.coin_type))
            .unwrap_or_default()
    }

    /// Wallet balance usable for the action, net of the gas reserve for SUI
    pub fn spendable_balance(&self) -> Decimal {
        if self.reserve.is_native_gas() {
            let gas = Amount::saturating(self.config.native_gas_reserve);
            self.balance.saturating_sub(&gas).value()
        } else {
            self.balance.value()
        }
    }

    /// Headroom left under the obligation's borrow limit (USD).
    ///
    /// Measured against max-price weighted borrows, zero without an
    /// obligation.
    pub fn borrow_limit_headroom_usd(&self) -> Decimal {
        self.obligation
            .map(|o| o.borrow_limit_usd - o.max_price_weighted_borrows_usd)
            .unwrap_or_default()
    }
}
