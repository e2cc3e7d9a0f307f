//! Shared identity catalog: every domain and sender identity behind one lock.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::traits::CatalogStore;
use crate::types::{CatalogSnapshot, Domain, SenderIdentity, SNAPSHOT_VERSION};

/// In-memory tables, both in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CatalogState {
    pub(crate) domains: Vec<Domain>,
    pub(crate) senders: Vec<SenderIdentity>,
}

impl CatalogState {
    /// Rebuild the tables from a stored snapshot.
    ///
    /// Duplicate ids, names or addresses and mis-keyed record sets are
    /// rejected. Sender identities whose domain is gone are dropped.
    fn from_snapshot(snapshot: CatalogSnapshot) -> CoreResult<Self> {
        let corrupt = |what: String| CoreError::StorageError(format!("Corrupt catalog: {what}"));

        let mut domain_ids = HashSet::new();
        let mut domain_names = HashSet::new();
        for domain in &snapshot.domains {
            if !domain_ids.insert(domain.id.as_str()) {
                return Err(corrupt(format!("duplicate domain id {}", domain.id)));
            }
            if !domain_names.insert(domain.name.to_ascii_lowercase()) {
                return Err(corrupt(format!("duplicate domain name {}", domain.name)));
            }
            if !domain.records.keys_consistent() {
                return Err(corrupt(format!("mis-keyed records for {}", domain.name)));
            }
            if !domain.records.is_complete() {
                log::warn!(
                    "Domain {} ({}) has an incomplete record set",
                    domain.id,
                    domain.name
                );
            }
        }

        let mut sender_ids = HashSet::new();
        let mut addresses = HashSet::new();
        let mut senders = Vec::with_capacity(snapshot.sender_identities.len());
        for sender in snapshot.sender_identities {
            if !domain_ids.contains(sender.domain_id.as_str()) {
                log::warn!(
                    "Dropping sender identity {} ({}): domain {} does not exist",
                    sender.id,
                    sender.email_address,
                    sender.domain_id
                );
                continue;
            }
            if !sender_ids.insert(sender.id.clone()) {
                return Err(corrupt(format!("duplicate sender id {}", sender.id)));
            }
            if !addresses.insert(sender.email_address.to_ascii_lowercase()) {
                return Err(corrupt(format!(
                    "duplicate email address {}",
                    sender.email_address
                )));
            }
            senders.push(sender);
        }

        Ok(Self {
            domains: snapshot.domains,
            senders,
        })
    }

    fn to_snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            version: SNAPSHOT_VERSION,
            domains: self.domains.clone(),
            sender_identities: self.senders.clone(),
        }
    }

    pub(crate) fn domain(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub(crate) fn domain_mut(&mut self, id: &str) -> Option<&mut Domain> {
        self.domains.iter_mut().find(|d| d.id == id)
    }

    pub(crate) fn sender_mut(&mut self, id: &str) -> Option<&mut SenderIdentity> {
        self.senders.iter_mut().find(|s| s.id == id)
    }
}

/// The catalog shared by the domain directory and the sender registry.
///
/// Reads share the lock. Each mutation runs against a copy of the tables
/// under the write lock, is persisted, and only then replaces the live
/// tables; a failed save leaves the catalog unchanged.
///
/// The save and the swap run in a spawned task that owns the write guard,
/// so dropping the caller's future cannot separate the two.
pub struct Catalog {
    state: Arc<RwLock<CatalogState>>,
    store: Arc<dyn CatalogStore>,
}

impl Catalog {
    /// Create an empty catalog backed by `store`. Call [`load`](Self::load)
    /// to pick up previously saved data.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState::default())),
            store,
        }
    }

    /// Replace the in-memory tables with the stored snapshot, if any.
    ///
    /// Returns `(domains, sender identities)` loaded.
    pub async fn load(&self) -> CoreResult<(usize, usize)> {
        let Some(snapshot) = self.store.load().await? else {
            log::info!("No stored catalog snapshot, starting empty");
            return Ok((0, 0));
        };
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(CoreError::StorageError(format!(
                "Unsupported catalog snapshot version {} (max {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }

        let state = CatalogState::from_snapshot(snapshot)?;
        let counts = (state.domains.len(), state.senders.len());
        *self.state.write().await = state;
        log::info!(
            "Loaded catalog: {} domains, {} sender identities",
            counts.0,
            counts.1
        );
        Ok(counts)
    }

    /// Write the current tables to the store.
    ///
    /// Holds the write lock so flushes and mutations never save concurrently.
    pub async fn flush(&self) -> CoreResult<()> {
        let state = Arc::clone(&self.state).write_owned().await;
        let store = Arc::clone(&self.store);
        tokio::spawn(async move { store.save(&state.to_snapshot()).await })
            .await
            .map_err(|e| CoreError::StorageError(format!("Task join error: {e}")))?
    }

    /// Consistent copy of the whole catalog.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.to_snapshot()
    }

    /// Run `f` under the shared read lock.
    pub(crate) async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&CatalogState) -> T + Send,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Run `f` as one atomic, persisted mutation.
    ///
    /// If `f` fails nothing changes. If `f` leaves the tables unchanged the
    /// store is not written.
    pub(crate) async fn mutate<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut CatalogState) -> CoreResult<T> + Send,
        T: Send,
    {
        let mut state = Arc::clone(&self.state).write_owned().await;
        let mut next = CatalogState::clone(&state);
        let output = f(&mut next)?;
        if next == *state {
            return Ok(output);
        }

        let store = Arc::clone(&self.store);
        let commit = tokio::spawn(async move {
            store.save(&next.to_snapshot()).await?;
            *state = next;
            Ok::<_, CoreError>(())
        });
        match commit.await {
            Ok(Ok(())) => Ok(output),
            Ok(Err(e)) => {
                log::error!("Failed to persist catalog, change discarded: {e}");
                Err(e)
            }
            Err(e) => Err(CoreError::StorageError(format!("Task join error: {e}"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::test_utils::{FailingCatalogStore, SlowCatalogStore};
    use crate::traits::InMemoryCatalogStore;
    use crate::types::{ProviderProfile, SenderIdentity};

    fn sample_domain(name: &str) -> Domain {
        Domain::new(name.to_string(), &ProviderProfile::default())
    }

    #[tokio::test]
    async fn load_without_snapshot_starts_empty() {
        let catalog = Catalog::new(Arc::new(InMemoryCatalogStore::new()));
        assert_eq!(catalog.load().await.unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn load_restores_snapshot_in_order() {
        let snapshot = CatalogSnapshot {
            domains: vec![sample_domain("b.com"), sample_domain("a.com")],
            ..CatalogSnapshot::default()
        };
        let catalog = Catalog::new(Arc::new(InMemoryCatalogStore::with_snapshot(snapshot)));
        assert_eq!(catalog.load().await.unwrap(), (2, 0));

        let names: Vec<_> = catalog
            .snapshot()
            .await
            .domains
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["b.com", "a.com"]);
    }

    #[tokio::test]
    async fn load_rejects_newer_snapshot_version() {
        let snapshot = CatalogSnapshot {
            version: SNAPSHOT_VERSION + 1,
            ..CatalogSnapshot::default()
        };
        let catalog = Catalog::new(Arc::new(InMemoryCatalogStore::with_snapshot(snapshot)));
        assert!(matches!(
            catalog.load().await,
            Err(CoreError::StorageError(_))
        ));
    }

    #[tokio::test]
    async fn mutate_persists_changes() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let catalog = Catalog::new(store.clone());
        catalog
            .mutate(|s| {
                s.domains.push(sample_domain("example.com"));
                Ok(())
            })
            .await
            .unwrap();

        let saved = store.load().await.unwrap().unwrap();
        assert_eq!(saved.domains.len(), 1);
    }

    #[tokio::test]
    async fn mutate_error_discards_partial_changes() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let catalog = Catalog::new(store.clone());
        let result: CoreResult<()> = catalog
            .mutate(|s| {
                s.domains.push(sample_domain("example.com"));
                Err(CoreError::ValidationError("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(catalog.snapshot().await.domains.is_empty());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unchanged_state_skips_save() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let catalog = Catalog::new(store.clone());
        catalog.mutate(|_| Ok(())).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_save_rolls_back() {
        let catalog = Catalog::new(Arc::new(FailingCatalogStore::new()));
        let result = catalog
            .mutate(|s| {
                s.domains.push(sample_domain("example.com"));
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(CoreError::StorageError(_))));
        assert!(catalog.snapshot().await.domains.is_empty());
    }

    fn snapshot_of(domains: Vec<Domain>, senders: Vec<SenderIdentity>) -> CatalogSnapshot {
        CatalogSnapshot {
            domains,
            sender_identities: senders,
            ..CatalogSnapshot::default()
        }
    }

    async fn load_result(snapshot: CatalogSnapshot) -> CoreResult<(usize, usize)> {
        Catalog::new(Arc::new(InMemoryCatalogStore::with_snapshot(snapshot)))
            .load()
            .await
    }

    #[tokio::test]
    async fn load_drops_orphaned_senders() {
        let kept = sample_domain("kept.com");
        let gone = sample_domain("gone.com");
        let snapshot = snapshot_of(
            vec![kept.clone()],
            vec![SenderIdentity::new(&kept, "news"), SenderIdentity::new(&gone, "news")],
        );
        let catalog = Catalog::new(Arc::new(InMemoryCatalogStore::with_snapshot(snapshot)));

        assert_eq!(catalog.load().await.unwrap(), (1, 1));
        let senders = catalog.snapshot().await.sender_identities;
        assert_eq!(senders[0].email_address, "news@kept.com");
    }

    #[tokio::test]
    async fn load_rejects_duplicate_domains() {
        let a = sample_domain("a.com");
        let mut same_id = sample_domain("b.com");
        same_id.id.clone_from(&a.id);
        assert!(matches!(
            load_result(snapshot_of(vec![a.clone(), same_id], vec![])).await,
            Err(CoreError::StorageError(_))
        ));

        assert!(matches!(
            load_result(snapshot_of(vec![a, sample_domain("A.com")], vec![])).await,
            Err(CoreError::StorageError(_))
        ));
    }

    #[tokio::test]
    async fn load_rejects_duplicate_addresses() {
        let d = sample_domain("a.com");
        let mut shouting = SenderIdentity::new(&d, "news");
        shouting.email_address = "NEWS@a.com".to_string();
        let snapshot = snapshot_of(vec![d.clone()], vec![SenderIdentity::new(&d, "news"), shouting]);

        assert!(matches!(
            load_result(snapshot).await,
            Err(CoreError::StorageError(_))
        ));
    }

    #[tokio::test]
    async fn load_rejects_mis_keyed_records() {
        let mut value = serde_json::to_value(sample_domain("a.com")).unwrap();
        value["records"]["mx"]["recordType"] = serde_json::json!("spf");
        let domain: Domain = serde_json::from_value(value).unwrap();

        assert!(matches!(
            load_result(snapshot_of(vec![domain], vec![])).await,
            Err(CoreError::StorageError(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_flushes_are_serialized() {
        let store = Arc::new(SlowCatalogStore::new(Duration::from_millis(5)));
        let catalog = Catalog::new(store.clone());
        catalog
            .mutate(|s| {
                s.domains.push(sample_domain("example.com"));
                Ok(())
            })
            .await
            .unwrap();

        let (a, b) = tokio::join!(catalog.flush(), catalog.flush());
        a.unwrap();
        b.unwrap();
        assert_eq!(store.inner.load().await.unwrap().unwrap().domains.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_mutation_still_commits_in_memory_and_store() {
        let store = Arc::new(SlowCatalogStore::new(Duration::from_millis(50)));
        let catalog = Catalog::new(store.clone());

        let cancelled = tokio::time::timeout(
            Duration::from_millis(5),
            catalog.mutate(|s| {
                s.domains.push(sample_domain("example.com"));
                Ok(())
            }),
        )
        .await;
        assert!(cancelled.is_err());

        // The next writer waits for the detached commit to finish.
        catalog.mutate(|_| Ok(())).await.unwrap();

        let in_memory = catalog.snapshot().await.domains.len();
        let on_disk = store.inner.load().await.unwrap().unwrap().domains.len();
        assert_eq!((in_memory, on_disk), (1, 1));
    }
}
