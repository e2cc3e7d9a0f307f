//! DNS verification checker abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{CheckResults, Domain};

/// Performs the actual DNS lookups for a domain's records.
///
/// Called outside every catalog lock. Implementations may return partial
/// results; record types left out keep their previous status.
///
/// Implementations:
/// - `DnsVerificationChecker` (`edm-identity-checker`, hickory resolver)
#[async_trait]
pub trait VerificationChecker: Send + Sync {
    /// Check every published record of `domain`
    async fn check(&self, domain: &Domain) -> CoreResult<CheckResults>;
}
