//! Transaction submission
//!
//! The engine never signs or retries. A submitter receives a constructed
//! action and reports the chain's verdict; retries, if any, are the
//! submitter's business.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lendguard_core::CoinType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::error::FeedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Deposit,
    Borrow,
    Withdraw,
    Repay,
    Liquidate,
    ClaimRewards,
}

/// A constructed action ready for signing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    pub kind: TxKind,
    pub sender: String,
    pub coin_type: CoinType,
    /// Token units
    pub amount: Decimal,
    /// Target obligation, absent for a first deposit
    pub obligation_id: Option<String>,
}

impl TxRequest {
    pub fn new(
        kind: TxKind,
        sender: impl Into<String>,
        coin_type: CoinType,
        amount: Decimal,
    ) -> Self {
        Self {
            kind,
            sender: sender.into(),
            coin_type,
            amount,
            obligation_id: None,
        }
    }

    /// Set target obligation
    pub fn with_obligation(mut self, obligation_id: impl Into<String>) -> Self {
        self.obligation_id = Some(obligation_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction identifier assigned by the chain
    pub digest: String,
    pub kind: TxKind,
    pub submitted_at: DateTime<Utc>,
}

#[async_trait]
pub trait TxSubmitter: Send + Sync {
    /// Submit `request`, failing with [`FeedError::Submission`] when rejected
    async fn submit(&self, request: TxRequest) -> Result<TxReceipt, FeedError>;
}

/// Records submissions and accepts them, or rejects all of them with a
/// configured message
#[derive(Default)]
pub struct MockSubmitter {
    submitted: RwLock<Vec<TxRequest>>,
    failure: RwLock<Option<String>>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every later submission with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    /// Accept submissions again
    pub fn succeed(&self) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Requests received so far, accepted or not
    pub fn submitted(&self) -> Vec<TxRequest> {
        self.submitted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TxSubmitter for MockSubmitter {
    async fn submit(&self, request: TxRequest) -> Result<TxReceipt, FeedError> {
        let kind = request.kind;
        self.submitted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let failure = self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(message) = failure {
            tracing::warn!(%kind, %message, "transaction rejected");
            return Err(FeedError::Submission { message });
        }

        let receipt = TxReceipt {
            digest: Uuid::new_v4().to_string(),
            kind,
            submitted_at: Utc::now(),
        };
        tracing::info!(%kind, digest = %receipt.digest, "transaction submitted");
        Ok(receipt)
    }
}
