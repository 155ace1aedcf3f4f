//! Application context - loads a snapshot and values it once

use lendguard_actions::{ActionConfig, ActionContext};
use lendguard_feed::{refresh, JsonFileSource, MarketSnapshot, SnapshotCell};
use lendguard_rewards::{format_rewards, RewardMap};
use lendguard_risk::{
    refresh_market, refresh_obligation, LiquidationConfig, ParsedMarket, ParsedObligation,
    ParsedReserve, RiskConfig,
};
use std::path::Path;

/// Application context - a valued market plus the configuration every
/// command reads
pub struct AppContext {
    pub snapshot: MarketSnapshot,
    pub market: ParsedMarket,
    pub risk_config: RiskConfig,
    pub action_config: ActionConfig,
    pub liquidation_config: LiquidationConfig,
}

impl AppContext {
    /// Load a snapshot file and an optional action config file
    pub async fn load(
        snapshot_path: impl AsRef<Path>,
        action_config_path: Option<&Path>,
    ) -> Result<Self, anyhow::Error> {
        let source = JsonFileSource::new(snapshot_path);
        let cell = SnapshotCell::new();
        refresh(&source, &cell).await?;
        let snapshot = cell
            .latest()
            .ok_or_else(|| anyhow::anyhow!("no snapshot loaded from {}", source.path().display()))?;

        let action_config = match action_config_path {
            Some(path) => ActionConfig::from_file(path)?,
            None => ActionConfig::default(),
        };
        let liquidation_config = LiquidationConfig {
            native_gas_reserve: action_config.native_gas_reserve,
        };

        Self::from_snapshot(snapshot, action_config).map(|ctx| Self {
            liquidation_config,
            ..ctx
        })
    }

    /// Value an in-memory snapshot
    pub fn from_snapshot(
        snapshot: MarketSnapshot,
        action_config: ActionConfig,
    ) -> Result<Self, anyhow::Error> {
        let market = refresh_market(&snapshot.market)?;
        tracing::info!(
            market = %market.id,
            reserves = market.reserves.len(),
            obligations = snapshot.obligations.len(),
            "market valued"
        );
        Ok(Self {
            snapshot,
            market,
            risk_config: RiskConfig::default(),
            action_config,
            liquidation_config: LiquidationConfig::default(),
        })
    }

    /// Chain clock of the snapshot (ms)
    pub fn now_ms(&self) -> u64 {
        self.snapshot.timestamp_ms
    }

    pub fn reserve(&self, symbol: &str) -> Result<&ParsedReserve, anyhow::Error> {
        Ok(self.market.reserve_by_symbol(symbol)?)
    }

    /// Value one obligation of the snapshot
    pub fn obligation(&self, id: &str) -> Result<ParsedObligation, anyhow::Error> {
        let obligation = self
            .snapshot
            .obligation(id)
            .ok_or_else(|| anyhow::anyhow!("obligation not found: {}", id))?;
        Ok(refresh_obligation(
            obligation,
            &self.market.reserves,
            &self.risk_config,
        )?)
    }

    /// Value every obligation of the snapshot
    pub fn obligations(&self) -> Result<Vec<ParsedObligation>, anyhow::Error> {
        self.snapshot
            .obligations
            .iter()
            .map(|o| Ok(refresh_obligation(o, &self.market.reserves, &self.risk_config)?))
            .collect()
    }

    /// Reward map with claims for every obligation of the snapshot
    pub fn reward_map(&self) -> Result<RewardMap, anyhow::Error> {
        let obligations = self.obligations()?;
        Ok(format_rewards(
            &self.market.reserves,
            &self.snapshot.coin_metadata,
            &obligations,
            self.now_ms(),
        ))
    }

    /// Validator inputs for an action on `reserve`
    pub fn action_context<'a>(
        &'a self,
        reserve: &'a ParsedReserve,
        obligation: Option<&'a ParsedObligation>,
        balance: rust_decimal::Decimal,
    ) -> ActionContext<'a> {
        let ctx = ActionContext::new(reserve, &self.market.rate_limiter, &self.action_config)
            .with_balance(balance);
        match obligation {
            Some(obligation) => ctx.with_obligation(obligation),
            None => ctx,
        }
    }
}
