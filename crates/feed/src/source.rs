//! Chain state sources

use async_trait::async_trait;
use chrono::Utc;
use lendguard_risk::Obligation;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::cell::SnapshotCell;
use crate::error::FeedError;
use crate::snapshot::MarketSnapshot;

/// Read-only source of reserve and obligation records
#[async_trait]
pub trait StateSource: Send + Sync {
    /// The market as of now
    async fn fetch_market(&self) -> Result<MarketSnapshot, FeedError>;

    /// One obligation as of now
    async fn fetch_obligation(&self, id: &str) -> Result<Obligation, FeedError> {
        self.fetch_market()
            .await?
            .obligation(id)
            .cloned()
            .ok_or_else(|| FeedError::ObligationNotFound(id.to_string()))
    }
}

/// Fetch the market and hand it to `cell`, stamped with the time the
/// request was issued.
///
/// Returns false when a newer refresh finished first and this result was
/// dropped.
pub async fn refresh(
    source: &dyn StateSource,
    cell: &SnapshotCell<MarketSnapshot>,
) -> Result<bool, FeedError> {
    let requested_at = Utc::now();
    let snapshot = source.fetch_market().await?;
    Ok(cell.apply(requested_at, snapshot))
}

/// Reads a [`MarketSnapshot`] from a JSON file on every fetch
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateSource for JsonFileSource {
    async fn fetch_market(&self) -> Result<MarketSnapshot, FeedError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let snapshot: MarketSnapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            reserves = snapshot.market.reserves.len(),
            obligations = snapshot.obligations.len(),
            "loaded market snapshot"
        );
        Ok(snapshot)
    }
}

/// In-memory source for tests
///
/// Serves a fixed snapshot that can be swapped programmatically.
pub struct MockStateSource {
    snapshot: RwLock<MarketSnapshot>,
}

impl MockStateSource {
    pub fn new(snapshot: MarketSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Replace the served snapshot
    pub fn set_snapshot(&self, snapshot: MarketSnapshot) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

#[async_trait]
impl StateSource for MockStateSource {
    async fn fetch_market(&self) -> Result<MarketSnapshot, FeedError> {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Ok(snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendguard_risk::testutils::{ObligationBuilder, ReserveBuilder};
    use lendguard_risk::{LendingMarket, RateLimiter, RateLimiterConfig};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::io::Write;

    fn snapshot(timestamp_ms: u64) -> MarketSnapshot {
        let usdc = ReserveBuilder::new("USDC", 6).available(dec!(1000)).build();
        let obligation = ObligationBuilder::new("alice").deposit(&usdc, dec!(10)).build();
        MarketSnapshot {
            market: LendingMarket {
                id: "main".to_string(),
                rate_limiter: RateLimiter::new(
                    RateLimiterConfig {
                        window_duration_s: 86_400,
                        max_outflow: dec!(1000),
                    },
                    dec!(1000),
                ),
                reserves: vec![usdc],
            },
            obligations: vec![obligation],
            coin_metadata: BTreeMap::new(),
            timestamp_ms,
        }
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&snapshot(42)).unwrap()).unwrap();

        let source = JsonFileSource::new(file.path());
        let fetched = source.fetch_market().await.unwrap();
        assert_eq!(fetched, snapshot(42));

        let obligation = source.fetch_obligation("alice").await.unwrap();
        assert_eq!(obligation.deposits.len(), 1);
        assert!(matches!(
            source.fetch_obligation("bob").await,
            Err(FeedError::ObligationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_json_file_source_errors() {
        let missing = JsonFileSource::new("/nonexistent/market.json");
        assert!(matches!(missing.fetch_market().await, Err(FeedError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        let invalid = JsonFileSource::new(file.path());
        assert!(matches!(
            invalid.fetch_market().await,
            Err(FeedError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_applies_to_cell() {
        let source = MockStateSource::new(snapshot(1));
        let cell = SnapshotCell::new();

        assert!(refresh(&source, &cell).await.unwrap());
        source.set_snapshot(snapshot(2));
        assert!(refresh(&source, &cell).await.unwrap());
        assert_eq!(cell.latest().map(|s| s.timestamp_ms), Some(2));
    }
}
