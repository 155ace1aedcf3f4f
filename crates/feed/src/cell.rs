//! Last-write-wins snapshot holder
//!
//! Refreshes may be in flight concurrently and complete out of order. Each
//! result carries the time its request was issued; a result older than the
//! one already held is dropped.

use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock};

struct Stamped<T> {
    requested_at: DateTime<Utc>,
    value: T,
}

pub struct SnapshotCell<T> {
    inner: RwLock<Option<Stamped<T>>>,
}

impl<T: Clone> SnapshotCell<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Store `value` unless a newer request has already been applied.
    ///
    /// Returns true if the value was stored. A result with the same request
    /// time as the held one replaces it.
    pub fn apply(&self, requested_at: DateTime<Utc>, value: T) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = inner.as_ref() {
            if requested_at < current.requested_at {
                tracing::debug!(
                    %requested_at,
                    current = %current.requested_at,
                    "dropping stale snapshot"
                );
                return false;
            }
        }
        *inner = Some(Stamped {
            requested_at,
            value,
        });
        true
    }

    /// The newest applied value
    pub fn latest(&self) -> Option<T> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.as_ref().map(|stamped| stamped.value.clone())
    }

    /// Request time of the newest applied value
    pub fn requested_at(&self) -> Option<DateTime<Utc>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.as_ref().map(|stamped| stamped.requested_at)
    }
}

impl<T: Clone> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
