//! Lendguard Feed - edges of the engine
//!
//! All math is synchronous. Reading chain state and submitting
//! transactions happen here, behind async traits:
//! - `StateSource`: current market and obligation records
//! - `TxSubmitter`: hands a constructed action to the chain
//! - `SnapshotCell`: keeps only the newest of racing refreshes
//! - `Pager`: explicit cursor contract for paged fetches

mod cell;
mod error;
mod pager;
mod snapshot;
mod source;
mod submit;

pub use cell::SnapshotCell;
pub use error::FeedError;
pub use pager::{collect_all, InMemoryPager, Page, Pager};
pub use snapshot::MarketSnapshot;
pub use source::{refresh, JsonFileSource, MockStateSource, StateSource};
pub use submit::{MockSubmitter, TxKind, TxReceipt, TxRequest, TxSubmitter};
