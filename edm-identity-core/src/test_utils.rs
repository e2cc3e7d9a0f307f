//! Test helper module
//!
//! Mock collaborators and factories for service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::services::{DomainDirectory, SenderRegistry, ServiceContext, VerificationService};
use crate::traits::{CatalogStore, InMemoryCatalogStore, VerificationChecker};
use crate::types::{
    CatalogSnapshot, CheckResults, Domain, ProviderProfile, RecordStatus, RecordType,
};

// ===== ScriptedChecker =====

enum Script {
    Results(CheckResults),
    Fail(String),
}

/// Checker that replays a fixed answer and counts calls.
pub struct ScriptedChecker {
    script: Mutex<Script>,
    calls: AtomicUsize,
}

impl ScriptedChecker {
    pub fn returning(results: CheckResults) -> Self {
        Self {
            script: Mutex::new(Script::Results(results)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: Mutex::new(Script::Fail(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_results(&self, results: CheckResults) {
        *self.script.lock().unwrap() = Script::Results(results);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VerificationChecker for ScriptedChecker {
    async fn check(&self, _domain: &Domain) -> CoreResult<CheckResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.script.lock().unwrap() {
            Script::Results(results) => Ok(results.clone()),
            Script::Fail(message) => Err(CoreError::CheckerError(message.clone())),
        }
    }
}

// ===== FailingCatalogStore =====

/// Store whose every save fails (for rollback paths).
pub struct FailingCatalogStore;

impl FailingCatalogStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CatalogStore for FailingCatalogStore {
    async fn load(&self) -> CoreResult<Option<CatalogSnapshot>> {
        Ok(None)
    }

    async fn save(&self, _snapshot: &CatalogSnapshot) -> CoreResult<()> {
        Err(CoreError::StorageError("disk full".to_string()))
    }
}

// ===== SlowCatalogStore =====

/// In-memory store whose saves take `delay` to land.
pub struct SlowCatalogStore {
    pub inner: InMemoryCatalogStore,
    delay: Duration,
}

impl SlowCatalogStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryCatalogStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl CatalogStore for SlowCatalogStore {
    async fn load(&self) -> CoreResult<Option<CatalogSnapshot>> {
        self.inner.load().await
    }

    async fn save(&self, snapshot: &CatalogSnapshot) -> CoreResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.save(snapshot).await
    }
}

// ===== Factories =====

pub struct TestServices {
    pub store: Arc<InMemoryCatalogStore>,
    pub directory: DomainDirectory,
    pub registry: SenderRegistry,
    pub verification: VerificationService,
}

/// Services over an in-memory store with a checker that passes every record.
pub fn create_test_services() -> TestServices {
    let all_verified = RecordType::ALL
        .into_iter()
        .map(|t| (t, RecordStatus::Verified))
        .collect();
    create_test_services_with(Arc::new(ScriptedChecker::returning(all_verified)))
}

pub fn create_test_services_with(checker: Arc<dyn VerificationChecker>) -> TestServices {
    let store = Arc::new(InMemoryCatalogStore::new());
    let ctx = Arc::new(ServiceContext::new(
        store.clone(),
        checker,
        ProviderProfile::default(),
    ));
    TestServices {
        store,
        directory: DomainDirectory::new(Arc::clone(&ctx)),
        registry: SenderRegistry::new(Arc::clone(&ctx)),
        verification: VerificationService::new(ctx),
    }
}

/// Create a domain and drive it to `Verified` with passing required records.
pub async fn verified_domain(t: &TestServices, name: &str) -> Domain {
    let domain = t.directory.create(name).await.unwrap();
    let ticket = t.verification.begin_verification(&domain.id).await.unwrap();
    let results: CheckResults = RecordType::ALL
        .into_iter()
        .filter(|rt| rt.is_required())
        .map(|rt| (rt, RecordStatus::Verified))
        .collect();
    t.verification
        .apply_check_results(&domain.id, ticket.attempt, &results)
        .await
        .unwrap()
        .into_domain()
        .unwrap()
}
