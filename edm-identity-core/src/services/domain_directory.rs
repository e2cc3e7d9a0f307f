//! Domain directory

use std::sync::Arc;

use super::sender_registry::{senders_of, SenderRegistry};
use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{Domain, DomainOverview};
use crate::utils::validation::normalize_domain_name;

/// Domain directory
///
/// Owns every domain and its embedded DNS records.
pub struct DomainDirectory {
    ctx: Arc<ServiceContext>,
}

impl DomainDirectory {
    /// Create a domain directory instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Register a new domain in `Pending` state with a fresh record set.
    pub async fn create(&self, name: &str) -> CoreResult<Domain> {
        let name = normalize_domain_name(name)?;
        let profile = &self.ctx.profile;

        let domain = self
            .ctx
            .catalog
            .mutate(|state| {
                if state.domains.iter().any(|d| d.name == name) {
                    return Err(CoreError::DomainAlreadyExists(name.clone()));
                }
                let domain = Domain::new(name.clone(), profile);
                state.domains.push(domain.clone());
                Ok(domain)
            })
            .await?;

        log::info!("Created domain {} ({})", domain.name, domain.id);
        Ok(domain)
    }

    /// Get domain details
    pub async fn get(&self, id: &str) -> CoreResult<Domain> {
        self.ctx
            .catalog
            .read(|state| state.domain(id).cloned())
            .await
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Look a domain up by hostname (normalized before comparing).
    pub async fn find_by_name(&self, name: &str) -> Option<Domain> {
        let name = name.trim().to_ascii_lowercase();
        self.ctx
            .catalog
            .read(|state| state.domains.iter().find(|d| d.name == name).cloned())
            .await
    }

    /// All domains, in creation order
    pub async fn list(&self) -> Vec<Domain> {
        self.ctx.catalog.read(|state| state.domains.clone()).await
    }

    /// A domain together with its sender identities, read in one lock.
    pub async fn overview(&self, id: &str) -> CoreResult<DomainOverview> {
        self.ctx
            .catalog
            .read(|state| {
                state.domain(id).map(|domain| DomainOverview {
                    domain: domain.clone(),
                    sender_identities: senders_of(state, id),
                })
            })
            .await
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Delete a domain and, in the same critical section, every sender
    /// identity that references it.
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        let (domain, removed_senders) = self
            .ctx
            .catalog
            .mutate(|state| {
                let index = state
                    .domains
                    .iter()
                    .position(|d| d.id == id)
                    .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
                let removed = SenderRegistry::cascade_within(state, id);
                let domain = state.domains.remove(index);
                Ok((domain, removed))
            })
            .await?;

        log::info!(
            "Deleted domain {} ({id}) and {removed_senders} sender identities",
            domain.name
        );
        Ok(())
    }
}
