//! Interest Rate Model
//!
//! Each reserve carries a piecewise-linear curve mapping utilization percent
//! to borrow APR percent. Depositors receive the borrow yield scaled by
//! utilization, minus the protocol spread.

use lendguard_core::decimal::{from_bps, percent_of, HUNDRED};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One `{utilization%, APR%}` breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub util_percent: Decimal,
    pub apr_percent: Decimal,
}

impl CurvePoint {
    pub fn new(util_percent: Decimal, apr_percent: Decimal) -> Self {
        Self {
            util_percent,
            apr_percent,
        }
    }
}

/// Utilization -> borrow APR curve.
///
/// # Invariant
/// Points are sorted ascending by utilization with no duplicate
/// utilization values. The constructor enforces this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct InterestRateCurve {
    points: Vec<CurvePoint>,
}

impl InterestRateCurve {
    /// Build a curve, sorting by utilization and keeping the first point
    /// seen for each utilization value.
    pub fn new(points: impl IntoIterator<Item = CurvePoint>) -> Self {
        let mut points: Vec<CurvePoint> = points.into_iter().collect();
        points.sort_by(|a, b| a.util_percent.cmp(&b.util_percent));
        points.dedup_by(|later, kept| later.util_percent == kept.util_percent);
        Self { points }
    }

    /// Build a curve from admin-entered string pairs, dropping entries whose
    /// utilization or APR is empty or not a number.
    pub fn from_strs(pairs: &[(&str, &str)]) -> Self {
        Self::new(pairs.iter().filter_map(|(util, apr)| {
            let util = Decimal::from_str(util.trim()).ok()?;
            let apr = Decimal::from_str(apr.trim()).ok()?;
            Some(CurvePoint::new(util, apr))
        }))
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Borrow APR percent at the given utilization percent.
    ///
    /// Interpolates linearly between the bracketing breakpoints and clamps to
    /// the first/last breakpoint outside the curve. An empty curve yields 0.
    pub fn borrow_apr_percent(&self, utilization_percent: Decimal) -> Decimal {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Decimal::ZERO,
        };

        if utilization_percent <= first.util_percent {
            return first.apr_percent;
        }
        if utilization_percent >= last.util_percent {
            return last.apr_percent;
        }

        for window in self.points.windows(2) {
            let (lo, hi) = (window[0], window[1]);
            if utilization_percent == hi.util_percent {
                return hi.apr_percent;
            }
            if utilization_percent > lo.util_percent && utilization_percent < hi.util_percent {
                // span is non-zero: utilization values are unique
                let weight =
                    (utilization_percent - lo.util_percent) / (hi.util_percent - lo.util_percent);
                return lo.apr_percent + weight * (hi.apr_percent - lo.apr_percent);
            }
        }

        last.apr_percent
    }
}

impl From<Vec<CurvePoint>> for InterestRateCurve {
    fn from(points: Vec<CurvePoint>) -> Self {
        Self::new(points)
    }
}

impl From<InterestRateCurve> for Vec<CurvePoint> {
    fn from(curve: InterestRateCurve) -> Self {
        curve.points
    }
}

/// Utilization percent (`borrowed / deposited x 100`), zero for an empty pool
pub fn utilization_percent(borrowed_amount: Decimal, deposited_amount: Decimal) -> Decimal {
    percent_of(borrowed_amount, deposited_amount)
}

/// Deposit APR percent after the protocol spread is deducted
pub fn deposit_apr_percent(
    utilization_percent: Decimal,
    borrow_apr_percent: Decimal,
    spread_fee_bps: u64,
) -> Decimal {
    utilization_percent * borrow_apr_percent * (Decimal::ONE - from_bps(spread_fee_bps)) / HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn standard_curve() -> InterestRateCurve {
        InterestRateCurve::new([
            CurvePoint::new(dec!(0), dec!(0)),
            CurvePoint::new(dec!(80), dec!(10)),
            CurvePoint::new(dec!(100), dec!(150)),
        ])
    }

    #[test]
    fn test_exact_at_breakpoints() {
        let curve = standard_curve();
        assert_eq!(curve.borrow_apr_percent(dec!(0)), dec!(0));
        assert_eq!(curve.borrow_apr_percent(dec!(80)), dec!(10));
        assert_eq!(curve.borrow_apr_percent(dec!(100)), dec!(150));
    }

    #[test]
    fn test_interpolates_between_breakpoints() {
        let curve = standard_curve();
        assert_eq!(curve.borrow_apr_percent(dec!(40)), dec!(5));
        assert_eq!(curve.borrow_apr_percent(dec!(90)), dec!(80));
    }

    #[test]
    fn test_clamps_outside_curve() {
        let curve = InterestRateCurve::new([
            CurvePoint::new(dec!(10), dec!(2)),
            CurvePoint::new(dec!(90), dec!(50)),
        ]);
        assert_eq!(curve.borrow_apr_percent(dec!(0)), dec!(2));
        assert_eq!(curve.borrow_apr_percent(dec!(100)), dec!(50));
    }

    #[test]
    fn test_empty_curve_is_zero() {
        let curve = InterestRateCurve::default();
        assert_eq!(curve.borrow_apr_percent(dec!(50)), dec!(0));
    }

    #[test]
    fn test_sorts_and_dedups() {
        let curve = InterestRateCurve::new([
            CurvePoint::new(dec!(100), dec!(150)),
            CurvePoint::new(dec!(0), dec!(0)),
            CurvePoint::new(dec!(80), dec!(10)),
            CurvePoint::new(dec!(80), dec!(99)),
        ]);
        let utils: Vec<Decimal> = curve.points().iter().map(|p| p.util_percent).collect();
        assert_eq!(utils, vec![dec!(0), dec!(80), dec!(100)]);
        assert_eq!(curve.borrow_apr_percent(dec!(80)), dec!(10));
    }

    #[test]
    fn test_from_strs_drops_empty_entries() {
        let curve = InterestRateCurve::from_strs(&[
            ("0", "1"),
            ("", "5"),
            ("50", ""),
            ("100", "20"),
            ("abc", "3"),
        ]);
        assert_eq!(curve.points().len(), 2);
        assert_eq!(curve.borrow_apr_percent(dec!(50)), dec!(10.5));
    }

    #[test]
    fn test_serde_normalizes_order() {
        let json = r#"[{"util_percent":"100","apr_percent":"20"},{"util_percent":"0","apr_percent":"0"}]"#;
        let curve: InterestRateCurve = serde_json::from_str(json).unwrap();
        assert_eq!(curve.points()[0].util_percent, dec!(0));
    }

    #[test]
    fn test_utilization_percent() {
        assert_eq!(utilization_percent(dec!(25), dec!(100)), dec!(25));
        assert_eq!(utilization_percent(dec!(0), dec!(0)), dec!(0));
    }

    #[test]
    fn test_deposit_apr_deducts_spread() {
        // 50% utilization, 10% borrow APR, 20% spread -> 4%
        assert_eq!(deposit_apr_percent(dec!(50), dec!(10), 2_000), dec!(4));
        assert_eq!(deposit_apr_percent(dec!(0), dec!(10), 2_000), dec!(0));
    }

    fn monotone_curve() -> impl Strategy<Value = InterestRateCurve> {
        prop::collection::vec((1u32..=20, 0u32..=50), 1..6).prop_map(|steps| {
            let mut util = 0u32;
            let mut apr = 0u32;
            let points = steps.into_iter().map(|(du, da)| {
                util += du;
                apr += da;
                CurvePoint::new(Decimal::from(util), Decimal::from(apr))
            });
            InterestRateCurve::new(points.collect::<Vec<_>>())
        })
    }

    proptest! {
        #[test]
        fn prop_borrow_apr_is_non_decreasing(
            curve in monotone_curve(),
            a in 0u32..=12_000,
            b in 0u32..=12_000,
        ) {
            let (lo, hi) = (a.min(b), a.max(b));
            let lo = Decimal::new(i64::from(lo), 2);
            let hi = Decimal::new(i64::from(hi), 2);
            prop_assert!(curve.borrow_apr_percent(lo) <= curve.borrow_apr_percent(hi));
        }

        #[test]
        fn prop_exact_at_every_breakpoint(curve in monotone_curve()) {
            for point in curve.points() {
                prop_assert_eq!(curve.borrow_apr_percent(point.util_percent), point.apr_percent);
            }
        }
    }
}
