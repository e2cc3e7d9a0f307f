//! DNS record set published for a sending domain.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};

use super::ProviderProfile;
use crate::error::{CoreError, CoreResult};

const OWNERSHIP_TOKEN_LEN: usize = 32;
const DKIM_KEY_LEN: usize = 64;

/// Host label denoting the domain apex.
pub const APEX_HOST: &str = "@";

/// The five record kinds every sending domain publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Ownership,
    Spf,
    Dkim,
    Dmarc,
    Mx,
}

impl RecordType {
    /// All record types, in display order.
    pub const ALL: [Self; 5] = [Self::Ownership, Self::Spf, Self::Dkim, Self::Dmarc, Self::Mx];

    /// Required records gate domain verification; the others are advisory.
    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, Self::Ownership | Self::Spf | Self::Mx)
    }

    /// Wire record type the user publishes.
    #[must_use]
    pub fn dns_type(self) -> &'static str {
        match self {
            Self::Mx => "MX",
            Self::Ownership | Self::Spf | Self::Dkim | Self::Dmarc => "TXT",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ownership => "ownership",
            Self::Spf => "spf",
            Self::Dkim => "dkim",
            Self::Dmarc => "dmarc",
            Self::Mx => "mx",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ownership" => Ok(Self::Ownership),
            "spf" => Ok(Self::Spf),
            "dkim" => Ok(Self::Dkim),
            "dmarc" => Ok(Self::Dmarc),
            "mx" => Ok(Self::Mx),
            _ => Err(CoreError::InvalidRecordType(s.to_string())),
        }
    }
}

/// Per-record verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Verified,
    Failed,
}

/// One record the user must publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    pub record_type: RecordType,
    /// Host relative to the domain; `@` is the apex
    pub host_label: String,
    pub expected_value: String,
    pub status: RecordStatus,
}

impl DnsRecord {
    fn pending(record_type: RecordType, host_label: String, expected_value: String) -> Self {
        Self {
            record_type,
            host_label,
            expected_value,
            status: RecordStatus::Pending,
        }
    }

    /// Fully-qualified owner name of this record under `domain_name`.
    #[must_use]
    pub fn fqdn(&self, domain_name: &str) -> String {
        if self.host_label == APEX_HOST {
            domain_name.to_string()
        } else {
            format!("{}.{domain_name}", self.host_label)
        }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.record_type.is_required()
    }
}

/// The full record set of a domain, keyed by record type.
///
/// Expected values are fixed at generation time; only statuses change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DnsRecordSet(BTreeMap<RecordType, DnsRecord>);

impl DnsRecordSet {
    /// Generate the canonical five records for `domain_name`, all `Pending`.
    ///
    /// Ownership and DKIM values carry a random token; the rest come from
    /// the provider profile.
    #[must_use]
    pub fn generate(domain_name: &str, profile: &ProviderProfile) -> Self {
        let mut rng = rand::rng();
        let ownership_token = Alphanumeric
            .sample_string(&mut rng, OWNERSHIP_TOKEN_LEN)
            .to_ascii_lowercase();
        let dkim_key = Alphanumeric.sample_string(&mut rng, DKIM_KEY_LEN);

        let records = [
            DnsRecord::pending(
                RecordType::Ownership,
                profile.ownership_host.clone(),
                format!("{}={ownership_token}", profile.ownership_prefix),
            ),
            DnsRecord::pending(
                RecordType::Spf,
                APEX_HOST.to_string(),
                format!("v=spf1 {} ~all", profile.spf_mechanism()),
            ),
            DnsRecord::pending(
                RecordType::Dkim,
                format!("{}._domainkey", profile.dkim_selector),
                format!("v=DKIM1; k=rsa; p={dkim_key}"),
            ),
            DnsRecord::pending(
                RecordType::Dmarc,
                "_dmarc".to_string(),
                format!(
                    "v=DMARC1; p={}; rua=mailto:dmarc@{domain_name}",
                    profile.dmarc_policy
                ),
            ),
            DnsRecord::pending(
                RecordType::Mx,
                APEX_HOST.to_string(),
                profile.mx_host.clone(),
            ),
        ];

        Self(records.into_iter().map(|r| (r.record_type, r)).collect())
    }

    #[must_use]
    pub fn get(&self, record_type: RecordType) -> Option<&DnsRecord> {
        self.0.get(&record_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DnsRecord> {
        self.0.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set the status of one record.
    ///
    /// Fails with `InvalidRecordType` when the set has no entry for the type,
    /// which only happens for a malformed persisted set.
    pub fn update_status(&mut self, record_type: RecordType, status: RecordStatus) -> CoreResult<()> {
        let record = self
            .0
            .get_mut(&record_type)
            .ok_or_else(|| CoreError::InvalidRecordType(record_type.to_string()))?;
        record.status = status;
        Ok(())
    }

    /// String-keyed variant of [`update_status`](Self::update_status).
    pub fn update_status_by_name(&mut self, record_type: &str, status: RecordStatus) -> CoreResult<()> {
        self.update_status(record_type.parse()?, status)
    }

    /// Whether the set holds exactly one entry per known record type.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        RecordType::ALL.iter().all(|t| self.0.contains_key(t))
    }

    /// Whether every entry is keyed by its own record type.
    #[must_use]
    pub fn keys_consistent(&self) -> bool {
        self.0.iter().all(|(key, record)| *key == record.record_type)
    }

    /// Whether every required record is present and `Verified`.
    #[must_use]
    pub fn all_required_verified(&self) -> bool {
        RecordType::ALL
            .iter()
            .filter(|t| t.is_required())
            .all(|t| matches!(self.get(*t), Some(r) if r.status == RecordStatus::Verified))
    }
}
