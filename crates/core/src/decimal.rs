//! Decimal helpers
//!
//! All money and percentage math runs on `rust_decimal::Decimal`. Binary
//! floating point never touches an on-chain-equivalent value.

use rust_decimal::Decimal;

/// Milliseconds in a 365-day year
pub const MS_PER_YEAR: Decimal = Decimal::from_parts(1_471_228_928, 7, 0, false, 0); // 31_536_000_000

/// Days per year used for per-day reward rates
pub const DAYS_PER_YEAR: Decimal = Decimal::from_parts(365, 0, 0, false, 0);

/// Basis points per unit
pub const BPS_DENOMINATOR: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Hundred, for percent conversions
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

const MAX_SCALE: u8 = 28;

/// Convert basis points to a fraction (`250` -> `0.025`)
pub fn from_bps(bps: u64) -> Decimal {
    Decimal::from(bps) / BPS_DENOMINATOR
}

/// Convert a percent to a fraction (`80` -> `0.8`)
pub fn from_percent(percent: Decimal) -> Decimal {
    percent / HUNDRED
}

/// `10^decimals`
pub fn pow10(decimals: u8) -> Decimal {
    Decimal::from_i128_with_scale(10i128.pow(u32::from(decimals.min(MAX_SCALE))), 0)
}

/// Convert an on-chain integer amount to whole token units.
///
/// Exact: the raw integer becomes the mantissa and the mint decimals the scale.
pub fn raw_amount(raw: u64, mint_decimals: u8) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(raw), u32::from(mint_decimals.min(MAX_SCALE)))
}

/// Smallest representable token unit (`10^-decimals`)
pub fn dust_threshold(mint_decimals: u8) -> Decimal {
    Decimal::new(1, u32::from(mint_decimals.min(MAX_SCALE)))
}

/// Division that yields `None` instead of panicking on a zero divisor
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}

/// Percent of `part` relative to `whole`, zero when `whole` is zero
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    safe_div(part, whole)
        .map(|ratio| ratio * HUNDRED)
        .unwrap_or(Decimal::ZERO)
}
