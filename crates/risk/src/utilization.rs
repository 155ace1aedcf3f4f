//! Utilization-bar segmentation
//!
//! Partitions an obligation's deposited USD into labelled segments for a
//! single horizontal bar. Each health branch yields a different partition;
//! all of them cover exactly 100 percent.

use lendguard_core::decimal::{percent_of, HUNDRED};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::obligation::{HealthStatus, ParsedObligation};

const PERCENT_DP: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Weighted borrows within the borrow limit
    WeightedBorrows,
    /// Headroom between weighted borrows and the borrow limit
    AvailableToBorrow,
    /// Weighted borrows beyond the borrow limit
    OverBorrowLimit,
    /// Gap between the current position and the liquidation threshold
    LiquidationBuffer,
    /// Weighted borrows beyond the liquidation threshold
    OverLiquidationThreshold,
    /// Deposits above the liquidation threshold
    Remaining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Percent of deposited USD
    pub width_percent: Decimal,
}

/// Segment the utilization bar of an obligation.
///
/// Returns `None` when nothing is deposited. Otherwise returns four
/// segments whose widths sum to exactly 100.
pub fn utilization_segments(obligation: &ParsedObligation) -> Option<Vec<Segment>> {
    let deposited = obligation.deposited_amount_usd;
    if deposited <= Decimal::ZERO {
        return None;
    }

    let limit = obligation.borrow_limit_usd.min(deposited);
    let weighted = obligation.display_weighted_borrows_usd();
    let unhealthy = obligation.unhealthy_borrow_value_usd;

    use SegmentKind::*;
    let (kinds, boundaries) = match obligation.health_status() {
        HealthStatus::Healthy => (
            [WeightedBorrows, AvailableToBorrow, LiquidationBuffer, Remaining],
            [weighted.min(limit), limit, unhealthy],
        ),
        HealthStatus::AtRisk => (
            [WeightedBorrows, OverBorrowLimit, LiquidationBuffer, Remaining],
            [limit, weighted, unhealthy],
        ),
        HealthStatus::Liquidatable => (
            [WeightedBorrows, OverBorrowLimit, OverLiquidationThreshold, Remaining],
            [limit, unhealthy, weighted],
        ),
    };

    // Boundaries are clamped into [previous, deposited] so the cumulative
    // percents are monotone and end at exactly 100. Rounding keeps every
    // difference exact in 96-bit decimal arithmetic.
    let mut cumulative = Vec::with_capacity(5);
    cumulative.push(Decimal::ZERO);
    let mut previous = Decimal::ZERO;
    for boundary in boundaries {
        let clamped = boundary.max(previous).min(deposited);
        cumulative.push(percent_of(clamped, deposited).round_dp(PERCENT_DP));
        previous = clamped;
    }
    cumulative.push(HUNDRED);

    Some(
        kinds
            .into_iter()
            .zip(cumulative.windows(2))
            .map(|(kind, w)| Segment {
                kind,
                width_percent: (w[1] - w[0]).max(Decimal::ZERO),
            })
            .collect(),
    )
}
