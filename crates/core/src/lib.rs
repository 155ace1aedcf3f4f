//! Lendguard Core - Domain types
//!
//! This crate contains the fundamental types used across Lendguard:
//! - `Amount`: Non-negative decimal wrapper for token amounts
//! - `CoinType`: Fully-qualified on-chain coin type (`0x2::sui::SUI`)
//! - `Wad`: 10^18 fixed-point value mirrored from chain state
//! - `decimal`: basis-point, mint-decimal and guarded-division helpers

pub mod amount;
pub mod coin;
pub mod decimal;
pub mod wad;

pub use amount::{Amount, AmountError};
pub use coin::{AssetGroup, CoinMetadata, CoinType, CoinTypeError};
pub use wad::{Wad, WadError, WAD};
