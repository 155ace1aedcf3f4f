//! WAD - 10^18 fixed-point decimals as stored on chain
//!
//! Raw WAD values are 128-bit integers and routinely exceed the 96-bit
//! mantissa of `Decimal` (a 1M-token borrow in 9-decimal units is ~10^33).
//! Conversion therefore splits the integer and fractional parts before
//! building a `Decimal`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point scale of on-chain decimals
pub const WAD: u128 = 1_000_000_000_000_000_000;

const WAD_SCALE: u32 = 18;

const WAD_DECIMAL: Decimal = Decimal::from_parts(2_808_348_672, 232_830_643, 0, false, 0);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WadError {
    #[error("Invalid WAD value: {0}")]
    InvalidFormat(String),

    #[error("WAD value out of decimal range: {0}")]
    OutOfRange(String),
}

/// A raw WAD-scaled on-chain decimal.
///
/// Serialized as a decimal-integer string, the way chain RPCs encode `u128`.
///
/// # Example
/// ```
/// use lendguard_core::Wad;
/// use rust_decimal::Decimal;
///
/// let wad: Wad = "1500000000000000000".parse().unwrap();
/// assert_eq!(wad.to_decimal().unwrap(), Decimal::new(15, 1));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Wad(u128);

impl Wad {
    pub const ZERO: Self = Self(0);

    /// Wrap a raw WAD integer
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// The raw WAD integer
    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Encode a decimal as WAD, truncating digits beyond 18 decimal places.
    pub fn from_decimal(value: Decimal) -> Result<Self, WadError> {
        if value < Decimal::ZERO {
            return Err(WadError::OutOfRange(value.to_string()));
        }
        let whole = value.trunc();
        let fraction = ((value - whole) * WAD_DECIMAL).trunc();

        let whole = whole
            .to_u128()
            .and_then(|w| w.checked_mul(WAD))
            .ok_or_else(|| WadError::OutOfRange(value.to_string()))?;
        let fraction = fraction
            .to_u128()
            .ok_or_else(|| WadError::OutOfRange(value.to_string()))?;

        whole
            .checked_add(fraction)
            .map(Self)
            .ok_or_else(|| WadError::OutOfRange(value.to_string()))
    }

    /// Decode into a `Decimal` without intermediate overflow.
    pub fn to_decimal(&self) -> Result<Decimal, WadError> {
        let whole = Decimal::from_u128(self.0 / WAD)
            .ok_or_else(|| WadError::OutOfRange(self.0.to_string()))?;
        let fraction = Decimal::from_i128_with_scale((self.0 % WAD) as i128, WAD_SCALE);

        whole
            .checked_add(fraction)
            .map(|d| d.normalize())
            .ok_or_else(|| WadError::OutOfRange(self.0.to_string()))
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Wad {
    type Err = WadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u128>()
            .map(Self)
            .map_err(|_| WadError::InvalidFormat(s.to_string()))
    }
}

impl TryFrom<String> for Wad {
    type Error = WadError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Wad> for String {
    fn from(w: Wad) -> Self {
        w.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wad_decimal_constant() {
        assert_eq!(WAD_DECIMAL, Decimal::from_u128(WAD).unwrap());
    }

    #[test]
    fn test_to_decimal_simple() {
        assert_eq!(Wad::from_raw(WAD).to_decimal().unwrap(), dec!(1));
        assert_eq!(Wad::from_raw(WAD / 4).to_decimal().unwrap(), dec!(0.25));
        assert_eq!(Wad::ZERO.to_decimal().unwrap(), dec!(0));
    }

    #[test]
    fn test_to_decimal_beyond_mantissa() {
        // 1,000,000 tokens of a 9-decimal coin, WAD scaled: 10^33
        let raw = 1_000_000u128 * 1_000_000_000 * WAD;
        let decimal = Wad::from_raw(raw).to_decimal().unwrap();
        assert_eq!(decimal, dec!(1_000_000_000_000_000));
    }

    #[test]
    fn test_to_decimal_keeps_fraction() {
        let raw = 123 * WAD + 456_000_000_000_000_000;
        assert_eq!(Wad::from_raw(raw).to_decimal().unwrap(), dec!(123.456));
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Wad::from_decimal(dec!(1.5)).unwrap().raw(), 1_500_000_000_000_000_000);
        assert_eq!(Wad::from_decimal(dec!(0)).unwrap(), Wad::ZERO);
        assert!(Wad::from_decimal(dec!(-1)).is_err());
    }

    #[test]
    fn test_parse_string() {
        let wad: Wad = "2000000000000000000".parse().unwrap();
        assert_eq!(wad.to_decimal().unwrap(), dec!(2));
        assert!(matches!("abc".parse::<Wad>(), Err(WadError::InvalidFormat(_))));
        assert!(matches!("-1".parse::<Wad>(), Err(WadError::InvalidFormat(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let wad = Wad::from_raw(42);
        let json = serde_json::to_string(&wad).unwrap();
        assert_eq!(json, "\"42\"");
        let parsed: Wad = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, wad);
    }
}
