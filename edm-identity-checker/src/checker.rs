//! DNS-backed verification checker

use async_trait::async_trait;
use futures::future::join_all;

use edm_identity_core::error::CoreResult;
use edm_identity_core::traits::VerificationChecker;
use edm_identity_core::types::{CheckResults, DnsRecord, Domain, RecordStatus, RecordType};

use crate::config::CheckerConfig;
use crate::lookup::{HickoryLookup, RecordLookup};
use crate::rules;

/// Checks every record of a domain concurrently against live DNS.
pub struct DnsVerificationChecker<L = HickoryLookup> {
    lookup: L,
}

impl DnsVerificationChecker<HickoryLookup> {
    #[must_use]
    pub fn new(config: &CheckerConfig) -> Self {
        Self::with_lookup(HickoryLookup::new(config))
    }
}

impl<L: RecordLookup> DnsVerificationChecker<L> {
    pub fn with_lookup(lookup: L) -> Self {
        Self { lookup }
    }

    async fn check_record(&self, domain_name: &str, record: &DnsRecord) -> (RecordType, RecordStatus) {
        let name = record.fqdn(domain_name);
        let answers = match record.record_type {
            RecordType::Mx => self.lookup.mx(&name).await,
            _ => self.lookup.txt(&name).await,
        };
        let status = match answers {
            Ok(answers) => rules::evaluate(record, &answers),
            Err(e) => {
                log::debug!("{} lookup for {name} failed: {e}", record.record_type.dns_type());
                RecordStatus::Failed
            }
        };
        log::debug!("{} record of {domain_name}: {status:?}", record.record_type);
        (record.record_type, status)
    }
}

#[async_trait]
impl<L: RecordLookup> VerificationChecker for DnsVerificationChecker<L> {
    async fn check(&self, domain: &Domain) -> CoreResult<CheckResults> {
        let checks = domain
            .records
            .iter()
            .map(|record| self.check_record(&domain.name, record));
        let results: CheckResults = join_all(checks).await.into_iter().collect();

        let passed = results
            .values()
            .filter(|s| **s == RecordStatus::Verified)
            .count();
        log::info!(
            "Checked {} records of {}: {passed} verified",
            results.len(),
            domain.name
        );
        Ok(results)
    }
}
