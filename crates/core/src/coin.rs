//! Coin types - fully-qualified on-chain type tags
//!
//! A coin type is `<address>::<module>::<name>`. Addresses are normalized to
//! 64 lowercase hex digits so that `0x2::sui::SUI` and its long form compare
//! equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ADDRESS_HEX_LEN: usize = 64;

/// Errors that can occur when parsing coin types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoinTypeError {
    #[error("Empty coin type")]
    EmptyCoinType,

    #[error("Invalid coin type format (expected address::module::name): {0}")]
    InvalidFormat(String),

    #[error("Invalid coin type address: {0}")]
    InvalidAddress(String),
}

/// Fully-qualified coin type
///
/// # Examples
/// ```
/// use lendguard_core::CoinType;
///
/// let sui: CoinType = "0x2::sui::SUI".parse().unwrap();
/// assert!(sui.is_sui());
/// assert_eq!(sui.name(), "SUI");
///
/// let long: CoinType =
///     "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"
///         .parse()
///         .unwrap();
/// assert_eq!(sui, long);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoinType {
    address: String,
    module: String,
    name: String,
}

impl CoinType {
    /// The native gas coin
    pub fn sui() -> Self {
        Self {
            address: normalize_address("2"),
            module: "sui".to_string(),
            name: "SUI".to_string(),
        }
    }

    /// Normalized address without the `0x` prefix
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Struct name of the coin (usually the ticker)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this is the network's native gas token
    pub fn is_sui(&self) -> bool {
        *self == Self::sui()
    }
}

fn normalize_address(hex: &str) -> String {
    format!("{:0>width$}", hex.to_lowercase(), width = ADDRESS_HEX_LEN)
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}::{}::{}", self.address, self.module, self.name)
    }
}

impl FromStr for CoinType {
    type Err = CoinTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoinTypeError::EmptyCoinType);
        }

        let parts: Vec<&str> = s.splitn(3, "::").collect();
        let [address, module, name] = parts.as_slice() else {
            return Err(CoinTypeError::InvalidFormat(s.to_string()));
        };
        if module.is_empty() || name.is_empty() {
            return Err(CoinTypeError::InvalidFormat(s.to_string()));
        }

        let hex = address
            .strip_prefix("0x")
            .ok_or_else(|| CoinTypeError::InvalidAddress(address.to_string()))?;
        if hex.is_empty()
            || hex.len() > ADDRESS_HEX_LEN
            || !hex.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(CoinTypeError::InvalidAddress(address.to_string()));
        }

        Ok(Self {
            address: normalize_address(hex),
            module: module.to_string(),
            name: name.to_string(),
        })
    }
}

impl TryFrom<String> for CoinType {
    type Error = CoinTypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CoinType> for String {
    fn from(c: CoinType) -> Self {
        c.to_string()
    }
}

/// Display metadata for a coin (from the chain's `CoinMetadata` object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMetadata {
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Price-correlated asset families
///
/// Depositing one member of a family while borrowing another amplifies
/// reward farming without adding real risk exposure ("looping").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetGroup {
    /// USD-pegged stablecoins
    Stablecoin,
    /// SUI and its liquid staking tokens
    Sui,
    /// Everything else
    Other,
}

const STABLECOIN_SYMBOLS: &[&str] = &[
    "USDC", "WUSDC", "USDT", "WUSDT", "SUIUSDT", "AUSD", "FDUSD", "USDY", "BUCK", "SUIUSDE",
];

const SUI_SYMBOLS: &[&str] = &[
    "SUI", "SSUI", "AFSUI", "HASUI", "VSUI", "MSUI", "STSUI", "KSUI", "TRESUI",
];

impl AssetGroup {
    /// Classify an asset by its display symbol (case-insensitive)
    pub fn for_symbol(symbol: &str) -> Self {
        let symbol = symbol.trim().to_uppercase();
        if STABLECOIN_SYMBOLS.contains(&symbol.as_str()) {
            AssetGroup::Stablecoin
        } else if SUI_SYMBOLS.contains(&symbol.as_str()) {
            AssetGroup::Sui
        } else {
            AssetGroup::Other
        }
    }

    /// Returns true if two assets of this group move together in price
    pub fn is_correlated(&self) -> bool {
        !matches!(self, AssetGroup::Other)
    }
}
