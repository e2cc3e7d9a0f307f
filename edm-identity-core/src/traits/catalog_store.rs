//! Catalog persistence abstract Trait

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::CatalogSnapshot;

/// Catalog persistence Trait
///
/// The catalog writes a full snapshot after every successful mutation and on
/// flush, always under its write lock, so saves never overlap and arrive in
/// mutation order.
///
/// Implementations:
/// - `InMemoryCatalogStore` (this crate)
/// - `JsonFileCatalogStore` (`edm-identity-app`)
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load the last saved snapshot
    ///
    /// # Returns
    /// * `Some(snapshot)` - a snapshot was saved before
    /// * `None` - nothing stored yet
    async fn load(&self) -> CoreResult<Option<CatalogSnapshot>>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &CatalogSnapshot) -> CoreResult<()>;
}

/// In-memory catalog store
///
/// Keeps the latest snapshot in process memory; nothing survives a restart.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    snapshot: Arc<RwLock<Option<CatalogSnapshot>>>,
}

impl InMemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot (fixtures, imports).
    #[must_use]
    pub fn with_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(snapshot))),
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn load(&self) -> CoreResult<Option<CatalogSnapshot>> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &CatalogSnapshot) -> CoreResult<()> {
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_loads_none() {
        let store = InMemoryCatalogStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_returns_snapshot() {
        let store = InMemoryCatalogStore::new();
        let snapshot = CatalogSnapshot::default();
        store.save(&snapshot).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryCatalogStore::new();
        let other = store.clone();
        store.save(&CatalogSnapshot::default()).await.unwrap();
        assert!(other.load().await.unwrap().is_some());
    }
}
