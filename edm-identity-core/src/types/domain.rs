//! Sending domain and its verification state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CheckResults, DnsRecordSet, ProviderProfile, SenderIdentity};
use crate::error::{CoreError, CoreResult};

/// Aggregate verification status of a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Pending,
    Verifying,
    Verified,
    Failed,
}

/// A sending domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Domain ID (UUID)
    pub id: String,
    /// Normalized hostname
    pub name: String,
    pub status: DomainStatus,
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
    /// Set once, on the first transition into `Verified`
    #[serde(
        default,
        with = "crate::utils::datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub verified_at: Option<DateTime<Utc>>,
    /// Counter bumped by every `begin_verification`; 0 means never started
    #[serde(default)]
    pub verification_attempt: u64,
    pub records: DnsRecordSet,
}

impl Domain {
    /// Create a `Pending` domain with a freshly generated record set.
    ///
    /// `name` must already be normalized.
    #[must_use]
    pub fn new(name: String, profile: &ProviderProfile) -> Self {
        let records = DnsRecordSet::generate(&name, profile);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            status: DomainStatus::Pending,
            created_at: Utc::now(),
            verified_at: None,
            verification_attempt: 0,
            records,
        }
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.status == DomainStatus::Verified
    }

    /// Move into `Verifying` and open a new attempt, superseding any
    /// attempt still in flight.
    ///
    /// Returns the new attempt number.
    pub fn begin_verification(&mut self) -> CoreResult<u64> {
        if self.is_verified() {
            return Err(CoreError::AlreadyVerified(self.id.clone()));
        }
        self.verification_attempt += 1;
        self.status = DomainStatus::Verifying;
        Ok(self.verification_attempt)
    }

    /// Fold checker results into the record set and recompute the aggregate
    /// status.
    ///
    /// Record types absent from `results` keep their previous status.
    /// The domain becomes `Verified` when every required record is verified,
    /// otherwise `Failed`. A verified domain is never demoted: its required
    /// records stay verified and only recommended records are updated.
    pub fn apply_check_results(&mut self, results: &CheckResults) -> CoreResult<()> {
        // Reject the whole batch before touching anything.
        if let Some(missing) = results.keys().find(|t| self.records.get(**t).is_none()) {
            return Err(CoreError::InvalidRecordType(missing.to_string()));
        }

        let pinned = self.is_verified();
        for (record_type, status) in results {
            if pinned && record_type.is_required() {
                continue;
            }
            self.records.update_status(*record_type, *status)?;
        }

        if pinned || self.records.all_required_verified() {
            self.status = DomainStatus::Verified;
            if self.verified_at.is_none() {
                self.verified_at = Some(Utc::now());
            }
        } else {
            self.status = DomainStatus::Failed;
        }
        Ok(())
    }
}

/// A domain together with its sender identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOverview {
    pub domain: Domain,
    pub sender_identities: Vec<SenderIdentity>,
}
