//! Application bootstrap for the EDM sender identity manager.
//!
//! Provides `AppState` (service container) and `AppStateBuilder` (adapter
//! injection). A host process builds one `AppState`, calls
//! [`AppState::startup`] before serving requests and [`AppState::shutdown`]
//! on exit.

pub mod adapters;
pub mod config;

use std::sync::Arc;

use edm_identity_checker::DnsVerificationChecker;
use edm_identity_core::error::CoreResult;
use edm_identity_core::services::{
    DomainDirectory, SenderRegistry, ServiceContext, VerificationService,
};
use edm_identity_core::traits::{CatalogStore, InMemoryCatalogStore, VerificationChecker};

use crate::adapters::JsonFileCatalogStore;
pub use crate::config::{AppConfig, StorageConfig};

/// Application state.
///
/// Holds the `ServiceContext` and the three services built on it. All of them
/// share one catalog.
pub struct AppState {
    /// Service context (catalog, checker, provider profile)
    pub ctx: Arc<ServiceContext>,
    pub domain_directory: DomainDirectory,
    pub sender_registry: SenderRegistry,
    pub verification_service: VerificationService,
}

impl AppState {
    /// Load the stored catalog, if any.
    pub async fn startup(&self) -> CoreResult<()> {
        let (domains, senders) = self.ctx.catalog.load().await?;
        log::info!("Startup complete: {domains} domains, {senders} sender identities");
        Ok(())
    }

    /// Write a final snapshot.
    pub async fn shutdown(&self) -> CoreResult<()> {
        self.ctx.catalog.flush().await.inspect_err(|e| {
            log::error!("Failed to flush catalog on shutdown: {e}");
        })?;
        log::info!("Catalog flushed");
        Ok(())
    }
}

/// Builder for constructing `AppState`.
///
/// # Defaults
/// - `store`: `JsonFileCatalogStore` when `storage.path` is configured,
///   otherwise `InMemoryCatalogStore`
/// - `checker`: `DnsVerificationChecker` built from the `[checker]` section
pub struct AppStateBuilder {
    config: AppConfig,
    store: Option<Arc<dyn CatalogStore>>,
    checker: Option<Arc<dyn VerificationChecker>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
            checker: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn CatalogStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn checker(mut self, checker: Arc<dyn VerificationChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Build the `AppState`.
    #[must_use]
    pub fn build(self) -> AppState {
        let AppConfig {
            storage,
            provider,
            checker: checker_config,
        } = self.config;

        let store: Arc<dyn CatalogStore> = match (self.store, storage.path) {
            (Some(store), _) => store,
            (None, Some(path)) => {
                log::info!("Using catalog file {}", path.display());
                Arc::new(JsonFileCatalogStore::new(path))
            }
            (None, None) => {
                log::info!("No storage path configured, catalog is kept in memory");
                Arc::new(InMemoryCatalogStore::new())
            }
        };
        let checker: Arc<dyn VerificationChecker> = match self.checker {
            Some(checker) => checker,
            None => Arc::new(DnsVerificationChecker::new(&checker_config)),
        };

        let ctx = Arc::new(ServiceContext::new(store, checker, provider));

        AppState {
            domain_directory: DomainDirectory::new(Arc::clone(&ctx)),
            sender_registry: SenderRegistry::new(Arc::clone(&ctx)),
            verification_service: VerificationService::new(Arc::clone(&ctx)),
            ctx,
        }
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
