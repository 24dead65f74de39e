//! In-process quota store implementation.

use async_trait::async_trait;
use lyceum_core::TierQuota;
use lyceum_error::LyceumResult;
use lyceum_interface::QuotaStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory [`QuotaStore`] for single-node deployments and tests.
///
/// Cloning is cheap; clones share the same record table.
///
/// # Examples
///
/// ```
/// use lyceum_quota::MemoryQuotaStore;
/// use lyceum_interface::QuotaStore;
/// use lyceum_core::{AccessTier, TierQuota};
/// use chrono::Utc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryQuotaStore::new();
/// let quota = TierQuota::fresh(AccessTier::Standard, Utc::now());
/// store.save("alice", &quota).await.unwrap();
/// assert_eq!(store.load("alice").await.unwrap(), Some(quota));
/// assert_eq!(store.load("nobody").await.unwrap(), None);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryQuotaStore {
    records: Arc<RwLock<HashMap<String, TierQuota>>>,
}

impl MemoryQuotaStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callers with a persisted record.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True if no caller has a persisted record.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn load(&self, caller: &str) -> LyceumResult<Option<TierQuota>> {
        Ok(self.records.read().await.get(caller).cloned())
    }

    async fn save(&self, caller: &str, quota: &TierQuota) -> LyceumResult<()> {
        self.records
            .write()
            .await
            .insert(caller.to_string(), quota.clone());
        Ok(())
    }
}
