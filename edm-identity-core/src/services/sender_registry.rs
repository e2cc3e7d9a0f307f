//! Sender identity registry

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::catalog::CatalogState;
use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{email_address, SenderIdentity, SenderStatus};
use crate::utils::validation::validate_prefix;

/// Sender identity registry
///
/// Owns every sender identity. Registration checks the parent domain and
/// address uniqueness under the same write lock that domain deletion uses,
/// so a sender can never outlive its domain.
pub struct SenderRegistry {
    ctx: Arc<ServiceContext>,
}

impl SenderRegistry {
    /// Create a sender registry instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Register `prefix@<domain>` as an active sender.
    ///
    /// Checks run in order: domain exists, domain verified, prefix valid,
    /// address unique across all domains.
    pub async fn register(&self, domain_id: &str, prefix: &str) -> CoreResult<SenderIdentity> {
        let prefix = prefix.trim();
        let result = self
            .ctx
            .catalog
            .mutate(|state| {
                let domain = state
                    .domain(domain_id)
                    .ok_or_else(|| CoreError::DomainNotFound(domain_id.to_string()))?;
                if !domain.is_verified() {
                    return Err(CoreError::DomainNotVerified(domain.name.clone()));
                }
                validate_prefix(prefix)?;

                let address = email_address(prefix, &domain.name);
                if state.senders.iter().any(|s| s.has_address(&address)) {
                    return Err(CoreError::DuplicateEmailAddress(address));
                }

                let sender = SenderIdentity::new(domain, prefix);
                state.senders.push(sender.clone());
                Ok(sender)
            })
            .await;

        match &result {
            Ok(sender) => log::info!(
                "Registered sender {} ({}) for domain {domain_id}",
                sender.email_address,
                sender.id
            ),
            Err(e) if e.is_expected() => log::warn!("Sender registration rejected: {e}"),
            Err(e) => log::error!("Sender registration failed: {e}"),
        }
        result
    }

    /// Get a sender identity by ID
    pub async fn get(&self, id: &str) -> CoreResult<SenderIdentity> {
        self.ctx
            .catalog
            .read(|state| state.senders.iter().find(|s| s.id == id).cloned())
            .await
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Look up a sender by its full address (case-insensitive).
    pub async fn find_by_address(&self, address: &str) -> Option<SenderIdentity> {
        let address = address.trim();
        self.ctx
            .catalog
            .read(|state| state.senders.iter().find(|s| s.has_address(address)).cloned())
            .await
    }

    /// All sender identities, in registration order
    pub async fn list(&self) -> Vec<SenderIdentity> {
        self.ctx.catalog.read(|state| state.senders.clone()).await
    }

    /// Sender identities of one domain, in registration order
    pub async fn list_by_domain(&self, domain_id: &str) -> Vec<SenderIdentity> {
        self.ctx
            .catalog
            .read(|state| senders_of(state, domain_id))
            .await
    }

    /// Delete a sender identity
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        self.ctx
            .catalog
            .mutate(|state| {
                let index = state
                    .senders
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
                state.senders.remove(index);
                Ok(())
            })
            .await?;
        log::info!("Deleted sender identity {id}");
        Ok(())
    }

    /// Remove every sender identity of `domain_id`.
    ///
    /// A no-op when none match; only a storage failure can surface as an
    /// error. Returns the number removed.
    pub async fn cascade_delete_by_domain(&self, domain_id: &str) -> CoreResult<usize> {
        let removed = self
            .ctx
            .catalog
            .mutate(|state| Ok(Self::cascade_within(state, domain_id)))
            .await?;
        if removed > 0 {
            log::info!("Removed {removed} sender identities of domain {domain_id}");
        }
        Ok(removed)
    }

    /// Cascade step run inside an already-held catalog mutation.
    pub(crate) fn cascade_within(state: &mut CatalogState, domain_id: &str) -> usize {
        let before = state.senders.len();
        state.senders.retain(|s| s.domain_id != domain_id);
        before - state.senders.len()
    }

    /// Activate or deactivate a sender identity
    pub async fn set_status(&self, id: &str, status: SenderStatus) -> CoreResult<SenderIdentity> {
        let sender = self
            .ctx
            .catalog
            .mutate(|state| {
                let sender = state
                    .sender_mut(id)
                    .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
                sender.status = status;
                Ok(sender.clone())
            })
            .await?;
        log::info!("Sender {} is now {status:?}", sender.email_address);
        Ok(sender)
    }

    /// Record that the dispatch path sent mail from this identity at `at`.
    ///
    /// Timestamps never move backwards.
    pub async fn mark_used(&self, id: &str, at: DateTime<Utc>) -> CoreResult<SenderIdentity> {
        self.ctx
            .catalog
            .mutate(|state| {
                let sender = state
                    .sender_mut(id)
                    .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
                if sender.last_used_at.is_none_or(|prev| prev < at) {
                    sender.last_used_at = Some(at);
                }
                Ok(sender.clone())
            })
            .await
    }
}

pub(crate) fn senders_of(state: &CatalogState, domain_id: &str) -> Vec<SenderIdentity> {
    state
        .senders
        .iter()
        .filter(|s| s.domain_id == domain_id)
        .cloned()
        .collect()
}
