//! Lendguard Risk Engine
//!
//! Pure functions from mirrored chain state to risk figures:
//! - [`interest`] - piecewise-linear utilization -> APR curve
//! - [`reserve`] - per-asset valuation with min/max price bounds
//! - [`obligation`] - cross-collateral health aggregation
//! - [`utilization`] - utilization-bar segmentation
//! - [`rate_limiter`] - outflow rate limiter mirror
//! - [`liquidation`] - liquidation transaction planning
//!
//! Every refresh builds a brand-new immutable snapshot; nothing here holds
//! shared mutable state.

pub mod config;
pub mod error;
pub mod interest;
pub mod liquidation;
pub mod market;
pub mod obligation;
pub mod pool_reward;
pub mod rate_limiter;
pub mod reserve;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;
pub mod utilization;

pub use config::RiskConfig;
pub use error::RiskError;
pub use interest::{CurvePoint, InterestRateCurve};
pub use liquidation::{
    LiquidationConfig, LiquidationError, LiquidationEstimate, LiquidationPlan, LiquidationPlanner,
    LiquidationStep, WalletCoin,
};
pub use market::{refresh_market, LendingMarket, ParsedMarket};
pub use obligation::{
    refresh_obligation, Borrow, Deposit, HealthStatus, Obligation, ParsedBorrow, ParsedDeposit,
    ParsedObligation,
};
pub use pool_reward::{PoolReward, PoolRewardManager, Side, UserReward, UserRewardManager};
pub use rate_limiter::{OutflowSide, RateLimiter, RateLimiterConfig};
pub use reserve::{
    refresh_reserve, refresh_reserves, ParsedReserve, ParsedReserveConfig, Reserve, ReserveConfig,
    ReserveMap,
};
pub use utilization::{utilization_segments, Segment, SegmentKind};
