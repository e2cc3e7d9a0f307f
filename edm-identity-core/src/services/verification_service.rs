//! Domain verification service
//!
//! Splits verification into two short critical sections around the
//! (potentially slow) checker call:
//!
//! 1. `begin_verification` moves the domain to `Verifying` and hands out a
//!    ticket carrying a fresh attempt number.
//! 2. The checker runs without any lock held.
//! 3. `apply_check_results` folds the results in, but only if the ticket's
//!    attempt is still the domain's current one. Results of a superseded
//!    attempt are dropped.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{ApplyOutcome, CheckResults, VerificationTicket};

/// Domain verification service
pub struct VerificationService {
    ctx: Arc<ServiceContext>,
}

impl VerificationService {
    /// Create a verification service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Start (or restart) verification of a domain.
    ///
    /// Fails with `AlreadyVerified` for a verified domain. Calling it again
    /// while `Verifying` supersedes the attempt in flight.
    pub async fn begin_verification(&self, domain_id: &str) -> CoreResult<VerificationTicket> {
        let ticket = self
            .ctx
            .catalog
            .mutate(|state| {
                let domain = state
                    .domain_mut(domain_id)
                    .ok_or_else(|| CoreError::NotFound(domain_id.to_string()))?;
                let attempt = domain.begin_verification()?;
                Ok(VerificationTicket {
                    domain_id: domain.id.clone(),
                    attempt,
                })
            })
            .await?;

        log::info!(
            "Verification attempt {} started for domain {domain_id}",
            ticket.attempt
        );
        Ok(ticket)
    }

    /// Apply checker results reported for `attempt`.
    ///
    /// Returns `ApplyOutcome::Stale` without touching the domain when
    /// `attempt` is not the domain's current attempt.
    pub async fn apply_check_results(
        &self,
        domain_id: &str,
        attempt: u64,
        results: &CheckResults,
    ) -> CoreResult<ApplyOutcome> {
        let outcome = self
            .ctx
            .catalog
            .mutate(|state| {
                let domain = state
                    .domain_mut(domain_id)
                    .ok_or_else(|| CoreError::NotFound(domain_id.to_string()))?;
                if attempt == 0 || attempt != domain.verification_attempt {
                    return Ok(ApplyOutcome::Stale {
                        current_attempt: domain.verification_attempt,
                    });
                }
                domain.apply_check_results(results)?;
                Ok(ApplyOutcome::Applied(domain.clone()))
            })
            .await?;

        match &outcome {
            ApplyOutcome::Applied(domain) => log::info!(
                "Domain {} is {:?} after attempt {attempt}",
                domain.name,
                domain.status
            ),
            ApplyOutcome::Stale { current_attempt } => log::warn!(
                "Ignored stale results for domain {domain_id}: attempt {attempt}, current {current_attempt}"
            ),
        }
        Ok(outcome)
    }

    /// Run a full verification round with the configured checker.
    ///
    /// If the checker fails the domain stays `Verifying` and a later call
    /// may retry.
    pub async fn verify(&self, domain_id: &str) -> CoreResult<ApplyOutcome> {
        let ticket = self.begin_verification(domain_id).await?;
        // Snapshot for the checker; the lock is released while it runs.
        let domain = self
            .ctx
            .catalog
            .read(|state| state.domain(domain_id).cloned())
            .await
            .ok_or_else(|| CoreError::NotFound(domain_id.to_string()))?;

        let results = match self.ctx.checker.check(&domain).await {
            Ok(results) => results,
            Err(e) => {
                log::error!("Checker failed for domain {}: {e}", domain.name);
                return Err(e);
            }
        };

        self.apply_check_results(domain_id, ticket.attempt, &results)
            .await
    }
}
