//! Business logic service layer

mod catalog;
mod domain_directory;
mod sender_registry;
mod verification_service;

pub use catalog::Catalog;
pub use domain_directory::DomainDirectory;
pub use sender_registry::SenderRegistry;
pub use verification_service::VerificationService;

use std::sync::Arc;

use crate::traits::{CatalogStore, VerificationChecker};
use crate::types::ProviderProfile;

/// Service context - holds all dependencies
///
/// The host process builds one context at startup and shares it with every
/// service; there is no global state.
pub struct ServiceContext {
    /// Domains and sender identities
    pub catalog: Arc<Catalog>,
    /// External DNS checker
    pub checker: Arc<dyn VerificationChecker>,
    /// Values used when generating DNS records
    pub profile: ProviderProfile,
}

impl ServiceContext {
    /// Create service context
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        checker: Arc<dyn VerificationChecker>,
        profile: ProviderProfile,
    ) -> Self {
        Self {
            catalog: Arc::new(Catalog::new(store)),
            checker,
            profile,
        }
    }
}
